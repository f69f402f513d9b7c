//! Tick-seeded pseudo-random source
//!
//! Every observer of the same park computes the same value for the same
//! seed, so "random" decisions (entertainer costumes) agree everywhere.
//! No state is carried between calls: output is a pure function of
//! `(min, max, seed)`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Which generator backs `DeterministicRandom`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomMode {
    /// `fract(sin(seed * 12.9898) * 43758.5453)`, bit-compatible with existing deployments
    #[default]
    Legacy,
    /// ChaCha8 stream keyed by the seed
    ChaCha,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicRandom {
    mode: RandomMode,
}

impl DeterministicRandom {
    pub fn new(mode: RandomMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RandomMode {
        self.mode
    }

    /// Value in `[0, 1)`
    pub fn unit(&self, seed: u64) -> f64 {
        match self.mode {
            RandomMode::Legacy => {
                let v = (seed as f64 * 12.9898).sin() * 43758.5453;
                let fract = v - v.floor();
                // floor() of a huge product can round so that fract == 1.0
                if fract >= 1.0 {
                    0.0
                } else {
                    fract
                }
            }
            RandomMode::ChaCha => ChaCha8Rng::seed_from_u64(seed).gen::<f64>(),
        }
    }

    /// Integer uniformly drawn from `[min, max]` inclusive
    pub fn random_int(&self, min: i64, max: i64, seed: u64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return lo;
        }
        match self.mode {
            RandomMode::Legacy => {
                // i128 so the full i64 range does not overflow
                let (lo, hi) = (lo as i128, hi as i128);
                let span = (hi - lo + 1) as f64;
                let offset = (self.unit(seed) * span).floor() as i128;
                (lo + offset).min(hi) as i64
            }
            RandomMode::ChaCha => ChaCha8Rng::seed_from_u64(seed).gen_range(lo..=hi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_value_across_instances() {
        let a = DeterministicRandom::new(RandomMode::Legacy);
        let b = DeterministicRandom::new(RandomMode::Legacy);
        for seed in [0u64, 1, 17, 4096, 987_654_321] {
            assert_eq!(a.random_int(0, 10, seed), b.random_int(0, 10, seed));
        }

        let c = DeterministicRandom::new(RandomMode::ChaCha);
        let d = DeterministicRandom::new(RandomMode::ChaCha);
        assert_eq!(c.random_int(-5, 5, 42), d.random_int(-5, 5, 42));
    }

    #[test]
    fn test_legacy_formula_seed_zero() {
        // sin(0) = 0, so the unit value is exactly zero
        let rng = DeterministicRandom::default();
        assert_eq!(rng.unit(0), 0.0);
        assert_eq!(rng.random_int(3, 9, 0), 3);
    }

    #[test]
    fn test_values_within_bounds() {
        for mode in [RandomMode::Legacy, RandomMode::ChaCha] {
            let rng = DeterministicRandom::new(mode);
            for seed in 0..500u64 {
                let v = rng.random_int(2, 7, seed);
                assert!((2..=7).contains(&v), "{:?} produced {}", mode, v);
                let u = rng.unit(seed);
                assert!((0.0..1.0).contains(&u));
            }
        }
    }

    #[test]
    fn test_swapped_and_degenerate_bounds() {
        let rng = DeterministicRandom::default();
        let v = rng.random_int(9, 1, 123);
        assert!((1..=9).contains(&v));
        assert_eq!(rng.random_int(4, 4, 77), 4);
    }

    #[test]
    fn test_full_i64_range() {
        for mode in [RandomMode::Legacy, RandomMode::ChaCha] {
            let rng = DeterministicRandom::new(mode);
            for seed in [0u64, 7, 12_345, u64::MAX] {
                // Any value is in range; the call must not overflow
                let _ = rng.random_int(i64::MIN, i64::MAX, seed);
                let v = rng.random_int(i64::MAX, i64::MIN + 1, seed);
                assert!(v > i64::MIN);
            }
        }
        let rng = DeterministicRandom::default();
        assert_eq!(rng.random_int(i64::MIN, i64::MAX, 0), i64::MIN);
    }

    #[test]
    fn test_legacy_covers_range() {
        let rng = DeterministicRandom::default();
        let mut seen = [false; 11];
        for seed in 0..2000u64 {
            seen[rng.random_int(0, 10, seed) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
