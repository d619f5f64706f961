//! Property tests for the card-list notation.

use deckhand_foundation::{MAX_AMOUNT, NewCard};
use deckhand_parser::{Bracket, parse_new_cards, render_new_card};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn bracket() -> impl Strategy<Value = Bracket> {
    prop::sample::select(Bracket::ALL.to_vec())
}

/// Names mix ordinary text with every character that needs escaping.
fn name() -> impl Strategy<Value = String> {
    "[a-z0-9愚者塔罗#「」『』【】\\\\]{1,8}"
}

/// Descriptions may hold inner spaces and newlines but are stored trimmed.
fn description() -> impl Strategy<Value = String> {
    "[a-z 愚者\n#「」『』【】\\\\]{0,12}".prop_map(|s| s.trim().to_string())
}

fn new_card() -> impl Strategy<Value = NewCard> {
    (name(), prop::option::of(0..=MAX_AMOUNT), description())
        .prop_map(|(name, amount, description)| NewCard::new(name, amount, description))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn rendered_cards_parse_back(
        cards in prop::collection::vec((new_card(), bracket()), 1..6),
        separator in prop_oneof![Just(""), Just(" "), Just("\n"), Just("\t \n")],
    ) {
        let text: Vec<String> = cards
            .iter()
            .map(|(card, bracket)| render_new_card(card, *bracket))
            .collect();
        let text = text.join(separator);

        let parsed = parse_new_cards(&text).unwrap();

        let expected: Vec<NewCard> = cards.into_iter().map(|(card, _)| card).collect();
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn repeated_brackets_nest_to_any_depth(
        depth in 1usize..8,
        bracket in bracket(),
        description in "[a-z愚者]{0,10}",
    ) {
        let open = bracket.open().to_string().repeat(depth);
        let close = bracket.close().to_string().repeat(depth);
        let text = format!("卡{open}{description}{close}");

        let parsed = parse_new_cards(&text).unwrap();

        prop_assert_eq!(parsed, vec![NewCard::new("卡", None, description)]);
    }

    #[test]
    fn unbalanced_closing_runs_are_rejected(
        depth in 2usize..6,
        bracket in bracket(),
    ) {
        let open = bracket.open().to_string().repeat(depth);
        let close = bracket.close().to_string().repeat(depth - 1);
        let text = format!("卡{open}x{close}");

        prop_assert!(parse_new_cards(&text).is_err());
    }

    #[test]
    fn arbitrary_text_never_panics(text in "\\PC{0,40}") {
        let _ = parse_new_cards(&text);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn a_typical_deck_listing() {
    let text = "\
        3#愚者「流浪者」
        魔术师『
            一手指天
            一手指地
        』
        2#倒吊人【【被倒挂的人【不是这个】】】";
    let cards = parse_new_cards(text);
    assert!(cards.is_err(), "unescaped bracket inside a description: {cards:?}");

    let text = "3#愚者「流浪者」\n魔术师『\n一手指天\n一手指地\n』\n2#倒吊人【【被倒挂的人\\【不是这个\\】】】";
    assert_eq!(
        parse_new_cards(text).unwrap(),
        vec![
            NewCard::new("愚者", Some(3), "流浪者"),
            NewCard::new("魔术师", None, "一手指天\n一手指地"),
            NewCard::new("倒吊人", Some(2), "被倒挂的人【不是这个】"),
        ]
    );
}

#[test]
fn errors_name_the_card_being_parsed() {
    let err = parse_new_cards("愚者「」 魔 术师「」").unwrap_err();
    assert_eq!(
        err,
        "于解析第 2 张卡牌 “魔” 途中：期待包围描述前侧的符号，实际遇到“术”"
    );
}
