//! Uniform random distribution
//!
//! Uses the xoshiro256++ PRNG which is fast and has good statistical
//! properties. `next_offset()` runs inside the timed loop, so it has to be cheap.

use super::Distribution;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform random distribution over a byte range
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

    /// Seeded when `seed` is given, entropy-seeded otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
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
    fn next_offset(&mut self, len: u64) -> u64 {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_distribution_basic() {
        let mut dist = UniformDistribution::new();

        for _ in 0..100 {
            let offset = dist.next_offset(1000);
            assert!(offset < 1000);
        }
    }

    #[test]
    fn test_uniform_distribution_zero_len() {
        let mut dist = UniformDistribution::new();
        assert_eq!(dist.next_offset(0), 0);
    }

    #[test]
    fn test_uniform_distribution_seeded() {
        let mut dist1 = UniformDistribution::with_seed(12345);
        let mut dist2 = UniformDistribution::from_seed_option(Some(12345));

        for _ in 0..10 {
            assert_eq!(dist1.next_offset(1 << 30), dist2.next_offset(1 << 30));
        }
    }

    #[test]
    fn test_uniform_distribution_coverage() {
        let mut dist = UniformDistribution::with_seed(42);
        let len = 100u64;
        let mut buckets = vec![0u32; 10];

        for _ in 0..10000 {
            let offset = dist.next_offset(len);
            buckets[(offset * 10 / len) as usize] += 1;
        }

        // Each bucket should see roughly 1000 samples; allow 20% deviation
        for count in buckets {
            assert!(count > 800 && count < 1200, "Bucket count {} outside expected range", count);
        }
    }
}
