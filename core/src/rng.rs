//! Injectable RNG for battle draws
//!
//! Damage and point rolls go through the `BattleRng` trait so callers can
//! seed a fast generator in production and script exact rolls in tests.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

/// Trait for random number generation in battles
pub trait BattleRng {
    /// Generate a random u32
    fn next_u32(&mut self) -> u32;

    /// Generate a random number in range [0, max)
    fn gen_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }

    /// Generate a random number in the closed range [low, high]
    ///
    /// Returns `low` when the range is empty or inverted.
    fn gen_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        match (high - low).checked_add(1) {
            Some(span) => low + self.gen_range(span),
            None => self.next_u32(),
        }
    }
}

/// Marsaglia xorshift over 32 bits of state.
///
/// Cheap and reproducible, which is all battle draws need. Unsuitable for
/// anything security related.
#[derive(Debug, Clone, Encode, Decode, TypeInfo)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    /// Fold both halves of a 64-bit seed into the state
    pub fn seed_from_u64(seed: u64) -> Self {
        Self::seed_from_u32((seed >> 32) as u32 ^ seed as u32)
    }

    /// Zero is a fixed point of xorshift, so it is bumped to 1
    pub fn seed_from_u32(seed: u32) -> Self {
        Self {
            state: seed.max(1),
        }
    }
}

impl BattleRng for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
