//! Configuration validation
//!
//! Runs before any file is touched, so a bad value never costs an allocation.

use super::BenchConfig;
use crate::engine::BackendKind;
use anyhow::Result;

/// Validate complete configuration for the selected backend
pub fn validate_config(config: &BenchConfig, backend: BackendKind) -> Result<()> {
    validate_sizes(config)?;
    validate_trial(config)?;

    if backend == BackendKind::Direct {
        validate_direct(config)?;
    }

    Ok(())
}

/// Validate file, chunk and page sizes
pub fn validate_sizes(config: &BenchConfig) -> Result<()> {
    if config.file_size == 0 {
        anyhow::bail!("file_size must be greater than 0");
    }

    if config.chunk_size == 0 {
        anyhow::bail!("chunk_size must be greater than 0");
    }

    if config.chunk_size > config.file_size {
        anyhow::bail!(
            "chunk_size ({}) must not exceed file_size ({})",
            config.chunk_size,
            config.file_size
        );
    }

    if !config.page_size.is_power_of_two() {
        anyhow::bail!("page_size must be a power of 2, got {}", config.page_size);
    }

    Ok(())
}

/// Validate repetition and random-op parameters
pub fn validate_trial(config: &BenchConfig) -> Result<()> {
    // The spread of a single sample is undefined
    if config.repetitions < 2 {
        anyhow::bail!("repetitions must be at least 2, got {}", config.repetitions);
    }

    if config.op_count == 0 {
        anyhow::bail!("op_count must be greater than 0");
    }

    if config.sync_interval == 0 {
        anyhow::bail!("sync_interval must be greater than 0");
    }

    Ok(())
}

/// Direct IO needs every size to be a page multiple
pub fn validate_direct(config: &BenchConfig) -> Result<()> {
    let page = config.page_size;

    if config.chunk_size % page != 0 {
        anyhow::bail!(
            "direct IO requires chunk_size ({}) to be a multiple of page_size ({})",
            config.chunk_size,
            page
        );
    }

    if config.file_size % page != 0 {
        anyhow::bail!(
            "direct IO requires file_size ({}) to be a multiple of page_size ({})",
            config.file_size,
            page
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid_for_both_backends() {
        let config = BenchConfig::default();
        assert!(validate_config(&config, BackendKind::Buffered).is_ok());
        assert!(validate_config(&config, BackendKind::Direct).is_ok());
    }

    #[test]
    fn test_validate_sizes() {
        let zero_file = BenchConfig {
            file_size: 0,
            ..BenchConfig::default()
        };
        assert!(validate_sizes(&zero_file).is_err());

        let zero_chunk = BenchConfig {
            chunk_size: 0,
            ..BenchConfig::default()
        };
        assert!(validate_sizes(&zero_chunk).is_err());

        let big_chunk = BenchConfig {
            file_size: 4096,
            chunk_size: 8192,
            ..BenchConfig::default()
        };
        assert!(validate_sizes(&big_chunk).is_err());

        let odd_page = BenchConfig {
            page_size: 3000,
            ..BenchConfig::default()
        };
        assert!(validate_sizes(&odd_page).is_err());
    }

    #[test]
    fn test_validate_trial() {
        let single = BenchConfig {
            repetitions: 1,
            ..BenchConfig::default()
        };
        assert!(validate_trial(&single).is_err());

        let no_ops = BenchConfig {
            op_count: 0,
            ..BenchConfig::default()
        };
        assert!(validate_trial(&no_ops).is_err());

        let no_sync = BenchConfig {
            sync_interval: 0,
            ..BenchConfig::default()
        };
        assert!(validate_trial(&no_sync).is_err());
    }

    #[test]
    fn test_unaligned_sizes_only_matter_for_direct() {
        let config = BenchConfig {
            file_size: 100,
            chunk_size: 40,
            ..BenchConfig::default()
        };
        assert!(validate_config(&config, BackendKind::Buffered).is_ok());
        assert!(validate_config(&config, BackendKind::Direct).is_err());

        let unaligned_file = BenchConfig {
            file_size: 1024 * 1024 + 1,
            ..BenchConfig::default()
        };
        assert!(validate_direct(&unaligned_file).is_err());
    }
}
