//! Randomness sources for tag picking
//!
//! Every random decision the store and the expander make goes through the
//! [`Picker`] trait, so hosts can swap in a seeded or scripted source.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// A source of random pick decisions
pub trait Picker {
    /// Draw a count uniformly from the inclusive range `[min, max]`
    fn pick_count(&mut self, min: usize, max: usize) -> usize;

    /// Draw `amount` distinct indices from `0..len`, in draw order
    ///
    /// Callers guarantee `amount <= len`.
    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

impl<P: Picker + ?Sized> Picker for &mut P {
    fn pick_count(&mut self, min: usize, max: usize) -> usize {
        (**self).pick_count(min, max)
    }

    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (**self).sample(len, amount)
    }
}

impl<P: Picker + ?Sized> Picker for Box<P> {
    fn pick_count(&mut self, min: usize, max: usize) -> usize {
        (**self).pick_count(min, max)
    }

    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (**self).sample(len, amount)
    }
}

/// Picker backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomPicker<R: Rng = StdRng> {
    rng: R,
}

impl RandomPicker<StdRng> {
    /// Deterministic picker: same seed, same draws
    pub fn seeded(seed: u64) -> Self {
        debug!(%seed, "RandomPicker::seeded: called");
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Picker seeded from the operating system
    pub fn from_os() -> Self {
        debug!("RandomPicker::from_os: called");
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> RandomPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Picker for RandomPicker<R> {
    fn pick_count(&mut self, min: usize, max: usize) -> usize {
        let (lo, hi) = (min.min(max), min.max(max));
        if lo == hi {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }

    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(len);
        rand::seq::index::sample(&mut self.rng, len, amount).into_vec()
    }
}

/// Picker that replays a fixed script of choices
///
/// `pick_count` consumes one value when the range is wider than a single
/// number, clamping it into the range. `sample` consumes one value per drawn
/// element and treats it as a position among the indices not yet drawn, so a
/// script can never produce duplicates. An exhausted script keeps answering
/// with the lowest choice.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicker {
    script: VecDeque<usize>,
}

impl ScriptedPicker {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Number of unconsumed choices
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Picker for ScriptedPicker {
    fn pick_count(&mut self, min: usize, max: usize) -> usize {
        let (lo, hi) = (min.min(max), min.max(max));
        if lo == hi {
            return lo;
        }
        self.script.pop_front().unwrap_or(lo).clamp(lo, hi)
    }

    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..len).collect();
        let mut drawn = Vec::with_capacity(amount.min(len));
        while drawn.len() < amount && !pool.is_empty() {
            let choice = self.script.pop_front().unwrap_or(0).min(pool.len() - 1);
            drawn.push(pool.remove(choice));
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seeded_pickers_agree() {
        let mut a = RandomPicker::seeded(7);
        let mut b = RandomPicker::seeded(7);

        for _ in 0..50 {
            assert_eq!(a.pick_count(1, 9), b.pick_count(1, 9));
            assert_eq!(a.sample(10, 4), b.sample(10, 4));
        }
    }

    #[test]
    fn test_pick_count_stays_in_range() {
        let mut picker = RandomPicker::seeded(42);
        for _ in 0..500 {
            let n = picker.pick_count(2, 4);
            assert!((2..=4).contains(&n));
        }
        // Reversed bounds behave like sorted bounds
        for _ in 0..100 {
            let n = picker.pick_count(5, 3);
            assert!((3..=5).contains(&n));
        }
    }

    #[test]
    fn test_sample_is_distinct_and_clamped() {
        let mut picker = RandomPicker::seeded(1);
        let drawn = picker.sample(5, 5);
        let unique: HashSet<_> = drawn.iter().collect();
        assert_eq!(unique.len(), 5);
        assert!(drawn.iter().all(|&i| i < 5));

        assert_eq!(picker.sample(3, 10).len(), 3);
        assert!(picker.sample(0, 2).is_empty());
    }

    #[test]
    fn test_scripted_sample_draws_from_remaining() {
        let mut picker = ScriptedPicker::new([1, 1]);
        assert_eq!(picker.sample(3, 2), vec![1, 2]);
        assert_eq!(picker.remaining(), 0);
    }

    #[test]
    fn test_scripted_fixed_count_consumes_nothing() {
        let mut picker = ScriptedPicker::new([9]);
        assert_eq!(picker.pick_count(2, 2), 2);
        assert_eq!(picker.remaining(), 1);
        assert_eq!(picker.pick_count(1, 3), 3);
    }

    proptest::proptest! {
        #[test]
        fn prop_sample_never_repeats(seed in proptest::prelude::any::<u64>(), len in 0usize..64, amount in 0usize..80) {
            let drawn = RandomPicker::seeded(seed).sample(len, amount);
            let unique: HashSet<_> = drawn.iter().collect();
            proptest::prop_assert_eq!(drawn.len(), amount.min(len));
            proptest::prop_assert_eq!(unique.len(), drawn.len());
            proptest::prop_assert!(drawn.iter().all(|&i| i < len));
        }

        #[test]
        fn prop_scripted_sample_never_repeats(script in proptest::collection::vec(0usize..20, 0..20), len in 0usize..10) {
            let drawn = ScriptedPicker::new(script).sample(len, len);
            let unique: HashSet<_> = drawn.iter().collect();
            proptest::prop_assert_eq!(drawn.len(), len);
            proptest::prop_assert_eq!(unique.len(), len);
        }
    }
}
