//! Linear congruential pseudo-random source.
//!
//! The recurrence is `state = (state * 1103515245 + 12345) mod 2^31` and each
//! draw is `state / 2^31`. Arithmetic is exact integer arithmetic, so any port
//! using the same recurrence reproduces the same stream.

use serde::{Deserialize, Serialize};

/// LCG multiplier.
pub const LCG_MULTIPLIER: u64 = 1_103_515_245;
/// LCG increment.
pub const LCG_INCREMENT: u64 = 12_345;
/// LCG modulus (2^31).
pub const LCG_MODULUS: u64 = 1 << 31;

const STATE_MASK: u64 = LCG_MODULUS - 1;

/// Seeded 31-bit linear congruential generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lcg {
    seed: u32,
    state: u32,
    draws: u64,
}

impl Lcg {
    /// Create a generator from a seed. Only the low 31 bits are used.
    pub fn new(seed: u32) -> Self {
        let seed = mask(u64::from(seed));
        Self {
            seed,
            state: seed,
            draws: 0,
        }
    }

    /// Reset the stream to a new seed.
    pub fn reset(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    /// The seed the stream was last reset to.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Current raw state.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Number of draws taken since the last reset.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Advance the recurrence and return the new 31-bit state.
    pub fn next_u31(&mut self) -> u32 {
        let next = u64::from(self.state)
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state = mask(next);
        self.draws += 1;
        self.state
    }

    /// Draw a float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u31()) / LCG_MODULUS as f64
    }

    /// Draw an integer in `min..=max`.
    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = (hi - lo + 1) as f64;
        lo + (self.next_f64() * span).floor() as i64
    }

    /// Draw a float in `min..max`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Pick one item from a slice. Consumes a draw even for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let draw = self.next_f64();
        items.get((draw * items.len() as f64).floor() as usize)
    }

    /// Return true with the given probability, expressed in percent.
    pub fn chance(&mut self, percent: f64) -> bool {
        self.next_f64() * 100.0 < percent
    }
}

fn mask(value: u64) -> u32 {
    // STATE_MASK keeps the value below 2^31
    (value & STATE_MASK) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurrence_matches_reference_values() {
        let mut lcg = Lcg::new(12345);
        assert_eq!(lcg.next_u31(), 1_406_932_606);
        assert_eq!(lcg.next_u31(), 654_583_775);
        assert_eq!(lcg.next_u31(), 1_449_466_924);
        assert_eq!(lcg.state(), 1_449_466_924);
    }

    #[test]
    fn test_draws_are_in_unit_interval() {
        let mut lcg = Lcg::new(1);
        for _ in 0..10_000 {
            let draw = lcg.next_f64();
            assert!((0.0..1.0).contains(&draw));
        }
        assert_eq!(lcg.draws(), 10_000);
    }

    #[test]
    fn test_reset_restarts_stream() {
        let mut lcg = Lcg::new(99);
        let first: Vec<u32> = (0..5).map(|_| lcg.next_u31()).collect();
        lcg.reset(99);
        let second: Vec<u32> = (0..5).map(|_| lcg.next_u31()).collect();
        assert_eq!(first, second);
        assert_eq!(lcg.draws(), 5);
    }

    #[test]
    fn test_seed_is_masked_to_31_bits() {
        let lcg = Lcg::new(u32::MAX);
        assert_eq!(lcg.seed(), 0x7FFF_FFFF);
    }

    #[test]
    fn test_range_i64_inclusive_bounds() {
        let mut lcg = Lcg::new(7);
        for _ in 0..1000 {
            let v = lcg.range_i64(10, 20);
            assert!((10..=20).contains(&v));
        }
        // Reversed bounds are normalized
        let v = lcg.range_i64(5, 1);
        assert!((1..=5).contains(&v));
    }

    #[test]
    fn test_pick_consumes_one_draw() {
        let mut lcg = Lcg::new(3);
        let items = ["a", "b", "c"];
        assert!(lcg.pick(&items).is_some());
        let empty: [&str; 0] = [];
        assert!(lcg.pick(&empty).is_none());
        assert_eq!(lcg.draws(), 2);
    }

    #[test]
    fn test_chance_extremes() {
        let mut lcg = Lcg::new(11);
        assert!((0..100).all(|_| lcg.chance(100.0)));
        assert!((0..100).all(|_| !lcg.chance(0.0)));
    }
}
