//! Tests for whole chat commands.

use deckhand_foundation::{Amount, CardSpecifier, DeckName, NewCard, Placement};
use deckhand_parser::{
    Command, DeckCommand, DeckDiscardPileCommand, DeckExistenceCommand, ParseOptions,
    ParseResult, PluginCommand, ReplyDestination, help_text, parse_command, parse_deck_command,
};
use proptest::prelude::*;

fn parse(input: &str) -> ParseResult {
    parse_command(input, &ParseOptions::default())
}

fn deck(input: &str) -> (DeckName, DeckCommand) {
    match parse(input) {
        ParseResult::Ok(Command::Deck { deck, command }) => (deck, command),
        other => panic!("{input:?} gave {other:?}"),
    }
}

fn error(input: &str) -> String {
    match parse(input) {
        ParseResult::Error(err) => err.message,
        other => panic!("{input:?} gave {other:?}"),
    }
}

// =============================================================================
// Plugin Level
// =============================================================================

#[test]
fn plugin_commands_take_no_separator() {
    assert_eq!(parse("列表"), ParseResult::Ok(Command::Plugin(PluginCommand::List)));
    assert_eq!(parse(""), ParseResult::Ok(Command::Plugin(PluginCommand::Overview)));
    assert_eq!(parse("织物"), ParseResult::Ignore);
}

#[test]
fn help_lists_every_family() {
    let text = help_text("卡组", None).unwrap();
    for head in ["卡组列表", "卡组：<卡组名> 抽卡", "卡组：<卡组名> 创建"] {
        assert!(text.contains(head), "missing {head} in:\n{text}");
    }
    let unknown = help_text("卡组", Some(&["卡组::飞行".to_string()])).unwrap_err();
    assert_eq!(unknown, vec!["卡组::飞行".to_string()]);
}

// =============================================================================
// Deck Level
// =============================================================================

#[test]
fn full_width_and_ascii_colons_are_equivalent() {
    assert_eq!(deck("：塔罗 抽卡"), deck(":塔罗 抽卡"));
}

#[test]
fn a_session_of_deck_commands() {
    let (name, cmd) = deck("：塔罗 添加于底部\n2#愚者「流浪」\n魔术师「」");
    assert_eq!(name.as_str(), "塔罗");
    assert_eq!(
        cmd,
        DeckCommand::Add {
            at: Some(Placement::Bottom),
            cards: vec![
                NewCard::new("愚者", Some(2), "流浪"),
                NewCard::new("魔术师", None, ""),
            ],
        }
    );

    let (_, cmd) = deck("：塔罗 删除 全部#愚者 魔术师");
    assert_eq!(
        cmd,
        DeckCommand::Delete {
            cards: vec![
                CardSpecifier::new("愚者", Amount::All),
                CardSpecifier::new("魔术师", Amount::Default),
            ],
        }
    );

    let (_, cmd) = deck("：塔罗 抽卡至私聊 2");
    assert_eq!(
        cmd,
        DeckCommand::Draw {
            to: ReplyDestination::SenderPrivate,
            amount: Some(2),
        }
    );
}

#[test]
fn discard_pile_commands() {
    match parse("：塔罗 弃牌堆 回收于顶部 2#愚者") {
        ParseResult::Ok(Command::DeckDiscardPile { command, .. }) => assert_eq!(
            command,
            DeckDiscardPileCommand::Recycle {
                at: Some(Placement::Top),
                cards: vec![CardSpecifier::new("愚者", Amount::Exactly(2))],
            }
        ),
        other => panic!("gave {other:?}"),
    }
}

#[test]
fn create_with_flags_attributes_and_cards() {
    match parse("：塔罗 创建 +不放回\n描述 大阿卡纳\n---\n愚者「」") {
        ParseResult::Ok(Command::DeckExistence {
            command:
                DeckExistenceCommand::Create {
                    flag_setters,
                    attribute_setters,
                    cards,
                    ..
                },
            ..
        }) => {
            assert_eq!(flag_setters.as_slice(), ["+不放回".to_string()]);
            assert_eq!(attribute_setters.get("描述"), Some(Some("大阿卡纳")));
            assert_eq!(cards, vec![NewCard::new("愚者", None, "")]);
        }
        other => panic!("gave {other:?}"),
    }
}

#[test]
fn errors_point_at_usage() {
    let message = error("：塔罗 抽卡 很多");
    assert!(message.contains("数量需为非负整数"), "{message}");
    assert!(message.ends_with("（发送 “卡组帮助 卡组::抽卡” 查询该命令的用法。）"), "{message}");
}

#[test]
fn default_deck_commands_reuse_the_deck_grammar() {
    let direct = parse_deck_command("抽卡 3", DeckName::from("塔罗"), &ParseOptions::default());
    assert_eq!(
        direct.unwrap(),
        Command::Deck {
            deck: DeckName::from("塔罗"),
            command: DeckCommand::Draw {
                to: ReplyDestination::CurrentPlace,
                amount: Some(3),
            },
        }
    );
}

proptest! {
    #[test]
    fn any_message_parses_without_panicking(text in "\\PC{0,40}") {
        let _ = parse(&text);
        let _ = parse(&format!("：{text}"));
    }
}
