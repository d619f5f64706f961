//! Property tests for pile bookkeeping.
//!
//! Whatever the put-back mode, every instance stays accounted for: it is in
//! the draw pile, in the discard pile, or deleted together with its count.

use std::collections::BTreeMap;

use deckhand_engine::{Deck, DeckData, DeckRng, ScopePolicy};
use deckhand_foundation::{CardName, ErrorKind, NewCard, UserId};
use proptest::prelude::*;

// =============================================================================
// Helpers
// =============================================================================

const NAMES: [&str; 4] = ["愚者", "魔术师", "女祭司", "皇后"];

fn policy() -> ScopePolicy {
    ScopePolicy {
        scope: "测试".into(),
        max_cards_per_deck: 1000,
    }
}

fn build(amounts: &[u64], flags: &[&str], rng: &mut DeckRng) -> Deck {
    let owner = UserId::from("owner");
    let cards: Vec<NewCard> = NAMES
        .iter()
        .zip(amounts)
        .map(|(name, n)| NewCard::new(*name, Some(*n), ""))
        .collect();
    let mut deck = Deck::new("塔罗".into(), DeckData::new(owner.clone()));
    deck.add_cards(&cards, None, &owner, &policy(), rng).unwrap();
    let setters: Vec<String> = flags.iter().map(|s| (*s).to_string()).collect();
    deck.update_flags(&setters, false, rng).unwrap();
    deck
}

fn counts(pile: &[CardName]) -> BTreeMap<CardName, usize> {
    let mut map = BTreeMap::new();
    for name in pile {
        *map.entry(name.clone()).or_default() += 1;
    }
    map
}

fn amounts() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..6, NAMES.len()).prop_filter("deck must not be empty", |v| {
        v.iter().sum::<u64>() > 0
    })
}

// =============================================================================
// Put-back Modes
// =============================================================================

proptest! {
    #[test]
    fn with_replacement_keeps_the_draw_pile(amounts in amounts(), n in 1u64..20, seed: u64) {
        let mut rng = DeckRng::seeded(seed);
        let mut deck = build(&amounts, &["+放回"], &mut rng);
        let before = counts(&deck.data().draw_pile);

        let drawn = deck.draw(n, &mut rng).unwrap();

        prop_assert_eq!(drawn.len() as u64, n);
        prop_assert_eq!(counts(&deck.data().draw_pile), before);
        prop_assert!(deck.data().validate().is_ok());
    }

    #[test]
    fn batch_draws_distinct_instances(amounts in amounts(), n in 1u64..30, seed: u64) {
        let mut rng = DeckRng::seeded(seed);
        let mut deck = build(&amounts, &["+放回不独立"], &mut rng);
        let size = deck.total_cards();
        let before = counts(&deck.data().draw_pile);

        match deck.draw(n, &mut rng) {
            Ok(drawn) => {
                prop_assert!(n <= size);
                let mut per_name: BTreeMap<CardName, usize> = BTreeMap::new();
                for card in &drawn {
                    *per_name.entry(card.name.clone()).or_default() += 1;
                }
                for (name, k) in per_name {
                    prop_assert!(k <= before[&name]);
                }
            }
            Err(err) => {
                prop_assert!(n > size);
                let too_small = matches!(err.kind, ErrorKind::DrawPileTooSmall { .. });
                prop_assert!(too_small);
            }
        }
        prop_assert_eq!(counts(&deck.data().draw_pile), before);
    }

    #[test]
    fn no_immediate_repeat_draws_distinct_names(amounts in amounts(), n in 1u64..6, seed: u64) {
        let mut rng = DeckRng::seeded(seed);
        let mut deck = build(&amounts, &["+放回不重复"], &mut rng);
        let before = counts(&deck.data().draw_pile);
        let distinct = before.len() as u64;

        match deck.draw(n, &mut rng) {
            Ok(drawn) => {
                let mut names: Vec<CardName> = drawn.into_iter().map(|c| c.name).collect();
                names.sort();
                names.dedup();
                prop_assert_eq!(names.len() as u64, n);
            }
            Err(err) => {
                prop_assert!(n > distinct);
                let not_enough = matches!(err.kind, ErrorKind::NotEnoughDistinctCards { .. });
                prop_assert!(not_enough);
            }
        }
        prop_assert_eq!(counts(&deck.data().draw_pile), before);
    }

    #[test]
    fn without_replacement_moves_to_discard_pile(amounts in amounts(), n in 1u64..30, seed: u64) {
        let mut rng = DeckRng::seeded(seed);
        let mut deck = build(&amounts, &["+不放回"], &mut rng);
        let size = deck.total_cards();

        if let Ok(drawn) = deck.draw(n, &mut rng) {
            prop_assert_eq!(drawn.len() as u64, n);
            prop_assert_eq!(deck.data().draw_pile.len() as u64, size - n);
            prop_assert_eq!(deck.data().discard_pile.len() as u64, n);
            prop_assert_eq!(deck.total_cards(), size);
        } else {
            prop_assert!(n > size);
            prop_assert_eq!(deck.data().draw_pile.len() as u64, size);
        }
        prop_assert!(deck.data().validate().is_ok());
    }

    #[test]
    fn without_discard_pile_drawn_cards_are_deleted(amounts in amounts(), n in 1u64..30, seed: u64) {
        let mut rng = DeckRng::seeded(seed);
        let mut deck = build(&amounts, &["+不放回", "-弃牌堆"], &mut rng);
        let size = deck.total_cards();

        if deck.draw(n, &mut rng).is_ok() {
            prop_assert_eq!(deck.total_cards(), size - n);
            prop_assert!(deck.data().discard_pile.is_empty());
            let kinds_left = counts(&deck.data().draw_pile).len();
            prop_assert_eq!(deck.total_card_kinds(), kinds_left);
        }
        prop_assert!(deck.data().validate().is_ok());
    }

    #[test]
    fn recycling_restores_the_deck(amounts in amounts(), n in 1u64..30, seed: u64) {
        let mut rng = DeckRng::seeded(seed);
        let mut deck = build(&amounts, &["+不放回"], &mut rng);
        let before = counts(&deck.data().draw_pile);

        let _ = deck.draw(n, &mut rng);
        deck.recycle_all_and_shuffle(&mut rng);

        prop_assert!(deck.data().discard_pile.is_empty());
        prop_assert_eq!(counts(&deck.data().draw_pile), before);
    }

    #[test]
    fn shuffle_keeps_the_multiset(amounts in amounts(), seed: u64) {
        let mut rng = DeckRng::seeded(seed);
        let mut deck = build(&amounts, &["+放回"], &mut rng);
        let before = counts(&deck.data().draw_pile);

        deck.shuffle(&mut rng);

        prop_assert_eq!(counts(&deck.data().draw_pile), before);
    }
}

// =============================================================================
// Seeded Runs
// =============================================================================

#[test]
fn same_seed_same_draws() {
    let draw = |seed| {
        let mut rng = DeckRng::seeded(seed);
        let mut deck = build(&[3, 2, 1, 4], &["+放回"], &mut rng);
        deck.draw(8, &mut rng)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
    };
    assert_eq!(draw(7), draw(7));
}

#[test]
fn leaving_without_replacement_recycles_discards() {
    let mut rng = DeckRng::seeded(11);
    let mut deck = build(&[2, 2, 0, 0], &["+不放回"], &mut rng);
    deck.draw(3, &mut rng).unwrap();
    assert_eq!(deck.data().discard_pile.len(), 3);

    deck.update_flags(&["+放回".to_string()], false, &mut rng)
        .unwrap();

    assert!(deck.data().discard_pile.is_empty());
    assert_eq!(deck.data().draw_pile.len(), 4);
}
