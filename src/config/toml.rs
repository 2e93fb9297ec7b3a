//! TOML configuration file parsing
//!
//! Every key is optional; missing keys keep their defaults.
//!
//! ```toml
//! file_size = 268435456
//! chunk_size = 131072
//! repetitions = 10
//! seed = 42
//! ```

use super::BenchConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<BenchConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<BenchConfig> {
    let config: BenchConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(parse_toml_string("").unwrap(), BenchConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = parse_toml_string(
            r#"
            file_size = 1048576
            repetitions = 3
            invalidate = false
            seed = 9
            "#,
        )
        .unwrap();

        assert_eq!(config.file_size, 1048576);
        assert_eq!(config.repetitions, 3);
        assert!(!config.invalidate);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.chunk_size, 64 * 1024);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_toml_string("block_size = 4096").is_err());
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "op_count = 500").unwrap();

        let config = parse_toml_file(file.path()).unwrap();
        assert_eq!(config.op_count, 500);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = parse_toml_file(Path::new("/nonexistent/diskprobe.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
