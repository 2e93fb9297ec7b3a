//! CLI to config conversion utilities

use super::cli::Cli;
use super::BenchConfig;
use anyhow::{Context, Result};

/// Parse a size string (e.g., "1G", "100M", "4k") to bytes
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("k") || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches("k"), 1024u64)
    } else if s.ends_with("m") || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches("m"), 1024 * 1024)
    } else if s.ends_with("g") || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches("g"), 1024 * 1024 * 1024)
    } else if s.ends_with("t") || s.ends_with("tb") {
        (s.trim_end_matches("tb").trim_end_matches("t"), 1024 * 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Size out of range: {}", s))
}

/// Apply CLI overrides on top of `config` (CLI takes precedence)
pub fn apply_cli_overrides(cli: &Cli, mut config: BenchConfig) -> Result<BenchConfig> {
    if let Some(ref size) = cli.file_size {
        config.file_size = parse_size(size).context("Invalid file size")?;
    }
    if let Some(ref size) = cli.chunk_size {
        config.chunk_size = parse_size(size).context("Invalid chunk size")?;
    }
    if let Some(ops) = cli.ops {
        config.op_count = ops;
    }
    if let Some(every) = cli.sync_every {
        config.sync_interval = every;
    }
    if let Some(repetitions) = cli.repetitions {
        config.repetitions = repetitions;
    }
    if let Some(ref size) = cli.page_size {
        config.page_size = parse_size(size).context("Invalid page size")?;
    }
    if cli.warm {
        config.invalidate = false;
    }
    if cli.no_zero_fill {
        config.zero_fill = false;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("4k").unwrap(), 4096);
        assert_eq!(parse_size("64KB").unwrap(), 65536);
        assert_eq!(parse_size("1M").unwrap(), 1048576);
        assert_eq!(parse_size(" 1g ").unwrap(), 1 << 30);
        assert_eq!(parse_size("2t").unwrap(), 2 << 40);
    }

    #[test]
    fn test_parse_size_invalid() {
        assert!(parse_size("abc").is_err());
        assert!(parse_size("1.5G").is_err());
        assert!(parse_size("").is_err());
        assert!(parse_size("99999999999999t").is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "diskprobe",
            "rnd-write",
            "/tmp/f",
            "--file-size",
            "16M",
            "--ops",
            "200",
            "--sync-every",
            "10",
            "--repetitions",
            "3",
            "--warm",
            "--seed",
            "5",
        ])
        .unwrap();

        let config = apply_cli_overrides(&cli, BenchConfig::default()).unwrap();
        assert_eq!(config.file_size, 16 * 1024 * 1024);
        assert_eq!(config.op_count, 200);
        assert_eq!(config.sync_interval, 10);
        assert_eq!(config.repetitions, 3);
        assert!(!config.invalidate);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.chunk_size, 64 * 1024);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::try_parse_from(["diskprobe", "seq-read", "/tmp/f"]).unwrap();
        let base = BenchConfig {
            repetitions: 9,
            ..BenchConfig::default()
        };
        assert_eq!(apply_cli_overrides(&cli, base.clone()).unwrap(), base);
    }

    #[test]
    fn test_bad_size_has_context() {
        let cli = Cli::try_parse_from(["diskprobe", "seq-read", "/tmp/f", "--chunk-size", "huge"]).unwrap();
        let err = apply_cli_overrides(&cli, BenchConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid chunk size"));
    }
}
