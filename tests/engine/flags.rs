//! Tests for flag reconciliation.

use deckhand_engine::{DeckFlag, PutBackMode, extract_put_back_mode, update_deck_flags};
use proptest::prelude::*;

fn setters(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn setter() -> impl Strategy<Value = String> {
    let names = prop_oneof![
        Just("放回"),
        Just("不放回"),
        Just("放回不重复"),
        Just("放回不独立"),
        Just("弃牌堆"),
        Just("领域默认"),
    ];
    (prop::bool::ANY, names).prop_map(|(on, name)| format!("{}{name}", if on { '+' } else { '-' }))
}

fn starting_flags() -> impl Strategy<Value = Vec<DeckFlag>> {
    prop_oneof![
        Just(vec![DeckFlag::WithReplacement]),
        Just(vec![DeckFlag::WithoutReplacement, DeckFlag::Discard]),
        Just(vec![DeckFlag::WithoutReplacement]),
        Just(vec![DeckFlag::WithReplacementBatch, DeckFlag::ScopeDefault]),
        Just(vec![DeckFlag::WithReplacementNoImmediateRepeat]),
    ]
}

proptest! {
    #[test]
    fn applying_setters_twice_changes_nothing(
        old in starting_flags(),
        list in prop::collection::vec(setter(), 0..5),
    ) {
        if let Ok(once) = update_deck_flags(&old, &list) {
            let twice = update_deck_flags(&once, &list).unwrap();
            prop_assert_eq!(twice, once);
        }
    }

    #[test]
    fn result_has_exactly_one_mode(
        old in starting_flags(),
        list in prop::collection::vec(setter(), 0..5),
    ) {
        if let Ok(flags) = update_deck_flags(&old, &list) {
            let modes = flags.iter().filter(|f| f.put_back_mode().is_some()).count();
            prop_assert_eq!(modes, 1);
            if flags.contains(&DeckFlag::Discard) {
                prop_assert_eq!(extract_put_back_mode(&flags), PutBackMode::WithoutReplacement);
            }
        }
    }
}

#[test]
fn switching_to_without_replacement_enables_discard_pile() {
    let flags = update_deck_flags(&[DeckFlag::WithReplacement], &setters(&["+不放回"])).unwrap();
    assert_eq!(flags, vec![DeckFlag::WithoutReplacement, DeckFlag::Discard]);

    let flags = update_deck_flags(
        &[DeckFlag::WithReplacement],
        &setters(&["+不放回", "-弃牌堆"]),
    )
    .unwrap();
    assert_eq!(flags, vec![DeckFlag::WithoutReplacement]);
}

#[test]
fn conflicting_and_missing_modes_are_rejected() {
    assert!(update_deck_flags(&[], &setters(&["+放回", "+不放回"])).is_err());
    assert!(update_deck_flags(&[DeckFlag::WithReplacement], &setters(&["-放回"])).is_err());
    assert!(update_deck_flags(&[DeckFlag::WithReplacement], &setters(&["+弃牌堆"])).is_err());
    assert!(update_deck_flags(&[], &setters(&["+洗牌"])).is_err());
    assert!(update_deck_flags(&[], &setters(&["放回"])).is_err());
}
