//! diskprobe - storage throughput, latency and page-cache probe
//!
//! diskprobe measures what a single process sees when it talks to a file or
//! block device: sequential throughput, random per-operation latency, and how
//! much of the file the kernel currently holds in its page cache.
//!
//! # Architecture
//!
//! - **Targets**: file allocation and page-cache inspection/eviction
//! - **IO backends**: buffered (through the page cache) and direct (`O_DIRECT`)
//!   behind one `IOBackend` trait
//! - **Harness**: repeated trials with a fresh file per repetition
//! - **Stats**: mean and sample standard deviation over the repetitions
//!
//! # Example
//!
//! ```no_run
//! use diskprobe::target::allocator::FileAllocator;
//! use diskprobe::target::cache::get_residency;
//! use std::path::Path;
//!
//! let path = Path::new("/tmp/diskprobe.dat");
//! FileAllocator::default().allocate(path, 1 << 20, true)?;
//!
//! let residency = get_residency(path)?;
//! println!("{}/{} pages cached", residency.resident_pages, residency.total_pages);
//! # Ok::<(), diskprobe::BenchError>(())
//! ```

pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod harness;
pub mod output;
pub mod stats;
pub mod target;
pub mod util;

// Re-export commonly used types
pub use config::BenchConfig;
pub use engine::{BackendKind, IOBackend, Metric, Operation, OperationResult};
pub use error::BenchError;
pub use harness::MeasurementHarness;
pub use stats::Measurement;

/// Result type used throughout diskprobe
pub type Result<T> = std::result::Result<T, BenchError>;
