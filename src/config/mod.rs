//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Precedence is built-in defaults, then the TOML file, then CLI flags.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::engine::BackendConfig;
use serde::{Deserialize, Serialize};

/// Default test file size (1 GiB)
pub const DEFAULT_FILE_SIZE: u64 = 1024 * 1024 * 1024;
/// Default sequential chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: u64 = 64 * 1024;
/// Default number of random operations per repetition
pub const DEFAULT_OP_COUNT: u64 = 10_000;
/// Default number of random writes between fdatasync calls
pub const DEFAULT_SYNC_INTERVAL: u64 = 1_000;
/// Default repetitions per reported measurement
pub const DEFAULT_REPETITIONS: usize = 5;
/// Assumed OS page size
pub const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Measurement parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Test file size in bytes
    pub file_size: u64,
    /// Sequential transfer size in bytes
    pub chunk_size: u64,
    /// Random operations per repetition
    pub op_count: u64,
    /// Random writes between fdatasync calls
    pub sync_interval: u64,
    /// Samples per reported measurement (at least 2)
    pub repetitions: usize,
    /// Alignment unit for direct IO
    pub page_size: u64,
    /// Write zeros over the whole file when allocating
    pub zero_fill: bool,
    /// Evict the file from the page cache before read tests
    pub invalidate: bool,
    /// Fixed seed for random offsets
    pub seed: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            file_size: DEFAULT_FILE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            op_count: DEFAULT_OP_COUNT,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            repetitions: DEFAULT_REPETITIONS,
            page_size: DEFAULT_PAGE_SIZE,
            zero_fill: true,
            invalidate: true,
            seed: None,
        }
    }
}

impl BenchConfig {
    /// Parameters handed to the IO backend
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            page_size: self.page_size,
            sync_interval: self.sync_interval,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.file_size, 1 << 30);
        assert_eq!(config.chunk_size, 65536);
        assert_eq!(config.op_count, 10_000);
        assert_eq!(config.sync_interval, 1_000);
        assert_eq!(config.repetitions, 5);
        assert_eq!(config.page_size, 4096);
        assert!(config.zero_fill);
        assert!(config.invalidate);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_backend_config_carries_fields() {
        let config = BenchConfig {
            page_size: 8192,
            sync_interval: 50,
            seed: Some(3),
            ..BenchConfig::default()
        };
        let backend = config.backend_config();
        assert_eq!(backend.page_size, 8192);
        assert_eq!(backend.sync_interval, 50);
        assert_eq!(backend.seed, Some(3));
    }
}
