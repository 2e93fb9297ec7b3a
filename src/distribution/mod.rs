//! Random offset generation
//!
//! Random-access tests draw each offset independently and uniformly from
//! `[0, len)`. Backends that need aligned offsets round the drawn value down
//! to their page size, so the distribution itself stays byte-granular.
//!
//! # Example
//!
//! ```
//! use diskprobe::distribution::{Distribution, uniform::UniformDistribution};
//!
//! let mut dist = UniformDistribution::with_seed(7);
//! let offset = dist.next_offset(1024 * 1024);
//! assert!(offset < 1024 * 1024);
//! ```

/// Source of byte offsets for random-access tests
///
/// Distributions must be `Send`; each test owns its own instance.
pub trait Distribution: Send {
    /// Next offset in `[0, len)`; returns 0 when `len` is 0
    fn next_offset(&mut self, len: u64) -> u64;
}

pub mod uniform;
