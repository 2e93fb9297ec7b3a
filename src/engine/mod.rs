//! IO backend abstraction
//!
//! An IO backend knows how to run the four timed tests against a file:
//! sequential write, sequential read, random write and random read. The two
//! implementations differ only in how they reach the storage stack.
//!
//! # Backends
//!
//! - **Buffered**: ordinary `pread`/`pwrite` through the page cache
//! - **Direct**: `O_DIRECT`, bypassing the page cache; buffers, offsets and
//!   lengths must all be page multiples
//!
//! # Example
//!
//! ```no_run
//! use diskprobe::engine::{create_backend, BackendConfig, BackendKind};
//! use std::path::Path;
//!
//! let backend = create_backend(BackendKind::Buffered, BackendConfig::default());
//! let result = backend.sequential_read(Path::new("/tmp/diskprobe.dat"), 1 << 30, 64 * 1024, true)?;
//! println!("{:?} bytes/sec", result.throughput());
//! # Ok::<(), diskprobe::BenchError>(())
//! ```

use crate::error::BenchError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::time::Duration;

/// Capability set shared by both backends
///
/// Every operation opens the file itself and closes it before returning, on
/// success and on error alike. A transfer that moves a different number of
/// bytes than requested aborts the operation with `BenchError::ShortTransfer`;
/// there is no partial result.
pub trait IOBackend {
    /// Which variant this is
    fn kind(&self) -> BackendKind;

    /// Write `total_len / chunk_len` whole chunks from offset 0, then fdatasync
    ///
    /// Any remainder shorter than `chunk_len` is left untouched and is not
    /// counted in the reported bytes.
    fn sequential_write(&self, path: &Path, total_len: u64, chunk_len: u64) -> Result<OperationResult>;

    /// Read the same whole-chunk pattern, optionally evicting the range first
    fn sequential_read(
        &self,
        path: &Path,
        total_len: u64,
        chunk_len: u64,
        invalidate: bool,
    ) -> Result<OperationResult>;

    /// `op_count` minimal writes at uniform offsets in `[0, total_len)`
    ///
    /// Syncs every `sync_interval` operations and once after the loop.
    fn random_write(&self, path: &Path, total_len: u64, op_count: u64) -> Result<OperationResult>;

    /// `op_count` minimal reads at uniform offsets in `[0, total_len)`
    fn random_read(
        &self,
        path: &Path,
        total_len: u64,
        op_count: u64,
        invalidate: bool,
    ) -> Result<OperationResult>;
}

/// Backend variant, fixed for the lifetime of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Buffered,
    Direct,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Buffered => write!(f, "buffered"),
            BackendKind::Direct => write!(f, "direct"),
        }
    }
}

/// Parameters shared by both backends
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Alignment unit for direct IO and minimal transfer size for Direct
    pub page_size: u64,

    /// Random writes issue fdatasync after this many operations
    pub sync_interval: u64,

    /// Fixed PRNG seed for reproducible offsets
    pub seed: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            page_size: 4096,
            sync_interval: 1000,
            seed: None,
        }
    }
}

/// Build the backend for `kind`
pub fn create_backend(kind: BackendKind, config: BackendConfig) -> Box<dyn IOBackend> {
    match kind {
        BackendKind::Buffered => Box::new(buffered::BufferedBackend::new(config)),
        BackendKind::Direct => Box::new(direct::DirectBackend::new(config)),
    }
}

/// The four timed tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    SequentialWrite,
    SequentialRead,
    RandomWrite,
    RandomRead,
}

impl Operation {
    /// Sequential tests report throughput, random tests report latency
    pub fn reports_throughput(&self) -> bool {
        matches!(self, Operation::SequentialWrite | Operation::SequentialRead)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::SequentialWrite => write!(f, "sequential write"),
            Operation::SequentialRead => write!(f, "sequential read"),
            Operation::RandomWrite => write!(f, "random write"),
            Operation::RandomRead => write!(f, "random read"),
        }
    }
}

/// Figure reported by one timed operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// Bytes per second (sequential tests)
    Throughput(f64),
    /// Seconds per operation, averaged over the whole loop (random tests)
    Latency(f64),
}

/// Outcome of one timed operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    pub operation: Operation,
    pub metric: Metric,
    /// Wall-clock duration of the timed loop
    pub duration: Duration,
    /// Bytes actually transferred
    pub bytes: u64,
    /// Transfer calls issued
    pub ops: u64,
}

impl OperationResult {
    pub(crate) fn sequential(operation: Operation, bytes: u64, ops: u64, duration: Duration) -> Self {
        Self {
            operation,
            metric: Metric::Throughput(crate::util::time::calculate_throughput(bytes, duration)),
            duration,
            bytes,
            ops,
        }
    }

    pub(crate) fn random(operation: Operation, bytes: u64, ops: u64, duration: Duration) -> Self {
        Self {
            operation,
            metric: Metric::Latency(crate::util::time::per_op_latency(duration, ops)),
            duration,
            bytes,
            ops,
        }
    }

    /// Bytes per second, for sequential tests
    pub fn throughput(&self) -> Option<f64> {
        match self.metric {
            Metric::Throughput(bytes_per_sec) => Some(bytes_per_sec),
            Metric::Latency(_) => None,
        }
    }

    /// Seconds per operation, for random tests
    pub fn latency(&self) -> Option<f64> {
        match self.metric {
            Metric::Latency(seconds) => Some(seconds),
            Metric::Throughput(_) => None,
        }
    }
}

/// Number of whole chunks that fit in `total_len`
pub(crate) fn whole_chunks(total_len: u64, chunk_len: u64) -> Result<u64> {
    if chunk_len == 0 {
        return Err(BenchError::Config("chunk length must be greater than 0".into()));
    }
    Ok(total_len / chunk_len)
}

/// Single `pwrite`; anything but a full transfer is fatal
#[inline(always)]
pub(crate) fn write_exact_once(file: &File, path: &Path, buf: &[u8], offset: u64) -> Result<()> {
    let written = file
        .write_at(buf, offset)
        .map_err(|e| BenchError::io("pwrite", path, e))?;
    if written != buf.len() {
        return Err(BenchError::ShortTransfer {
            op: "write",
            offset,
            expected: buf.len(),
            actual: written,
        });
    }
    Ok(())
}

/// Single `pread`; anything but a full transfer is fatal
#[inline(always)]
pub(crate) fn read_exact_once(file: &File, path: &Path, buf: &mut [u8], offset: u64) -> Result<()> {
    let expected = buf.len();
    let read = file
        .read_at(buf, offset)
        .map_err(|e| BenchError::io("pread", path, e))?;
    if read != expected {
        return Err(BenchError::ShortTransfer {
            op: "read",
            offset,
            expected,
            actual: read,
        });
    }
    Ok(())
}

pub(crate) fn sync_data(file: &File, path: &Path) -> Result<()> {
    file.sync_data().map_err(|e| BenchError::io("fdatasync", path, e))
}

/// True when the periodic sync is due after `completed` operations
#[inline(always)]
pub(crate) fn sync_due(completed: u64, sync_interval: u64) -> bool {
    sync_interval > 0 && completed % sync_interval == 0
}

pub mod buffered;
pub mod direct;
pub mod mock;
