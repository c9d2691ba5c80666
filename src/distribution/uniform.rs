//! Uniform in-range distribution
//!
//! Draws values with equal probability anywhere in a bucket's inclusive range.
//!
//! # Performance
//!
//! Uses the xoshiro256++ PRNG, which is fast and has good statistical properties.
//! `sample()` runs once per iteration of every worker.

use super::Distribution;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform random distribution over `[min, max]`
pub struct UniformDistribution {
    rng: Xoshiro256PlusPlus,
}

impl UniformDistribution {
    /// Create a new uniform distribution with random seed
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    /// Create a new uniform distribution with specific seed
    ///
    /// Useful for reproducible runs and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl Default for UniformDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl Distribution for UniformDistribution {
    #[inline(always)]
    fn sample(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        if !(max - min).is_finite() {
            // Span overflows f64; interpolate between the bounds instead
            let t: f64 = self.rng.gen();
            return (min * (1.0 - t) + max * t).clamp(min, max);
        }
        self.rng.gen_range(min..=max)
    }
}
