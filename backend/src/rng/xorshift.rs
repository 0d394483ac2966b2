//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG with 64-bit state. Same seed gives the same
//! sequence of latencies and the same cart shuffles, which is what lets a
//! drill be replayed and tested.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use registration_drill_core::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let delay = rng.range_inclusive(5_000, 40_000);
/// assert!((5_000..=40_000).contains(&delay));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed. A zero seed is replaced by 1.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Random value in `[min, max)`
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Random value in `[min, max]`, both ends reachable.
    ///
    /// # Panics
    /// Panics if min > max
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "min must not exceed max");
        if min == max {
            return min;
        }
        self.range(min, max + 1)
    }

    /// In-place Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range(0, i as i64 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Current state, usable as a seed to resume the sequence.
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
