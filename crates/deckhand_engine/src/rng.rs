//! Random source for deck operations.
//!
//! Every random choice a deck makes (insertion positions, shuffles, which
//! copy of a card to delete) goes through [`DeckRng`], so tests can seed it
//! and assert exact outcomes.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seedable RNG used by [`crate::Deck`].
#[derive(Clone, Debug)]
pub struct DeckRng {
    inner: ChaCha8Rng,
}

impl DeckRng {
    /// Deterministic sequence for the given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// A uniform insertion position in a sequence of `len` items, `0..=len`.
    pub fn position(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..=len)
    }

    /// A uniform index into a non-empty sequence of `len` items.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick an index from an empty sequence");
        self.inner.gen_range(0..len)
    }

    /// Shuffles a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}

impl Default for DeckRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = DeckRng::seeded(42);
        let mut rng2 = DeckRng::seeded(42);

        for len in 0..100 {
            assert_eq!(rng1.position(len), rng2.position(len));
        }
    }

    #[test]
    fn test_position_is_inclusive() {
        let mut rng = DeckRng::seeded(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            seen[rng.position(2)] = true;
        }
        assert_eq!(seen, [true, true, true]);
        assert_eq!(rng.position(0), 0);
    }

    #[test]
    fn test_index_stays_in_range() {
        let mut rng = DeckRng::seeded(1);
        for _ in 0..100 {
            assert!(rng.index(5) < 5);
        }
    }

    #[test]
    #[should_panic(expected = "empty sequence")]
    fn test_index_of_empty_panics() {
        DeckRng::seeded(1).index(0);
    }

    #[test]
    fn test_shuffle() {
        let mut rng = DeckRng::seeded(42);
        let mut data: Vec<u32> = (1..=10).collect();
        let original = data.clone();

        rng.shuffle(&mut data);

        assert_ne!(data, original);
        data.sort_unstable();
        assert_eq!(data, original);
    }

    proptest! {
        #[test]
        fn position_and_index_stay_in_range(seed in any::<u64>(), len in 1usize..64) {
            let mut rng = DeckRng::seeded(seed);
            prop_assert!(rng.position(len) <= len);
            prop_assert!(rng.index(len) < len);
        }

        #[test]
        fn shuffle_is_a_permutation(seed in any::<u64>(), mut data in prop::collection::vec(any::<u8>(), 0..32)) {
            let mut shuffled = data.clone();
            DeckRng::seeded(seed).shuffle(&mut shuffled);
            shuffled.sort_unstable();
            data.sort_unstable();
            prop_assert_eq!(shuffled, data);
        }
    }
}
