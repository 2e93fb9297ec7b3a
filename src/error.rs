//! Error taxonomy
//!
//! Every failure in diskprobe is one of a small number of kinds, and each kind
//! maps to a fixed process exit code. Nothing is retried: a timing loop that hit
//! an error cannot produce a trustworthy number, so the whole test is abandoned.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the measurement core
#[derive(Debug, Error)]
pub enum BenchError {
    /// Bad mode, missing arguments or an invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Creating, reserving or zero-filling the backing file failed
    #[error("failed to allocate {path}: {reason}{}", os_reason(.source))]
    Allocation {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A syscall failed during a measurement
    #[error("{op} failed on {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A read or write transferred a different number of bytes than requested
    #[error("{op} at offset {offset} transferred {actual} of {expected} bytes")]
    ShortTransfer {
        op: &'static str,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// A direct I/O request that is not page aligned
    #[error("{what} {value} is not a multiple of the {page_size}-byte page size")]
    Alignment {
        what: &'static str,
        value: u64,
        page_size: u64,
    },

    /// Too few samples for the requested statistic
    #[error("need at least {needed} samples, got {got}")]
    InsufficientSamples { needed: usize, got: usize },
}

impl BenchError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn allocation(
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
        source: Option<std::io::Error>,
    ) -> Self {
        BenchError::Allocation {
            path: path.into(),
            reason: reason.into(),
            source,
        }
    }

    /// Process exit code for this error kind
    pub fn exit_code(&self) -> u8 {
        match self {
            BenchError::Config(_) => 1,
            BenchError::Allocation { .. } => 2,
            BenchError::Io { .. } | BenchError::ShortTransfer { .. } | BenchError::Alignment { .. } => 3,
            BenchError::InsufficientSamples { .. } => 4,
        }
    }
}

/// `": <os error>"` when there is an underlying IO error
fn os_reason(source: &Option<std::io::Error>) -> String {
    match source {
        Some(err) => format!(": {}", err),
        None => String::new(),
    }
}

impl From<anyhow::Error> for BenchError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain on one line
        BenchError::Config(format!("{:#}", err))
    }
}
