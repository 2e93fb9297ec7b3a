//! CLI argument parsing using clap

use crate::engine::{BackendKind, Operation};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// What to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Sequential read throughput (MB/s)
    SeqRead,
    /// Sequential write throughput (MB/s)
    SeqWrite,
    /// Random read latency (us)
    RndRead,
    /// Random write latency (us)
    RndWrite,
    /// Create and zero-fill the test file, no output
    Allocate,
    /// Show how much of the file is in the page cache
    ShowCache,
}

impl Mode {
    /// The timed operation behind a measurement mode
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Mode::SeqRead => Some(Operation::SequentialRead),
            Mode::SeqWrite => Some(Operation::SequentialWrite),
            Mode::RndRead => Some(Operation::RandomRead),
            Mode::RndWrite => Some(Operation::RandomWrite),
            Mode::Allocate | Mode::ShowCache => None,
        }
    }
}

/// IO strategy selector (third positional argument)
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IoMode {
    /// Page-cache-backed IO (default)
    Buffered,
    /// O_DIRECT, bypassing the page cache
    #[value(name = "direct_io", alias = "direct")]
    DirectIo,
}

impl From<IoMode> for BackendKind {
    fn from(mode: IoMode) -> Self {
        match mode {
            IoMode::Buffered => BackendKind::Buffered,
            IoMode::DirectIo => BackendKind::Direct,
        }
    }
}

/// diskprobe - storage throughput, latency and page-cache probe
#[derive(Parser, Debug)]
#[command(name = "diskprobe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Test to run
    #[arg(value_enum, value_name = "MODE")]
    pub mode: Mode,

    /// Test file or device path
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// IO strategy: buffered (default) or direct_io
    #[arg(value_enum, value_name = "IO")]
    pub io: Option<IoMode>,

    /// TOML configuration file
    #[arg(short = 'c', long, env = "DISKPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Test file size (e.g., 1G, 256M)
    #[arg(short = 's', long)]
    pub file_size: Option<String>,

    /// Sequential chunk size (e.g., 64k, 1M)
    #[arg(short = 'b', long)]
    pub chunk_size: Option<String>,

    /// Random operations per repetition
    #[arg(short = 'n', long)]
    pub ops: Option<u64>,

    /// Random writes between fdatasync calls
    #[arg(long)]
    pub sync_every: Option<u64>,

    /// Repetitions per measurement (at least 2)
    #[arg(short = 'r', long)]
    pub repetitions: Option<usize>,

    /// Page size used for direct IO alignment (e.g., 4k)
    #[arg(long)]
    pub page_size: Option<String>,

    /// Do not evict the file from the page cache before read tests
    #[arg(long)]
    pub warm: bool,

    /// Reserve the file without writing zeros over it
    #[arg(long)]
    pub no_zero_fill: bool,

    /// Fixed seed for random offsets
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Backend selected by the IO argument
    pub fn backend_kind(&self) -> BackendKind {
        self.io.unwrap_or(IoMode::Buffered).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from(["diskprobe", "seq-read", "/tmp/test.dat"]).unwrap();
        assert_eq!(cli.mode, Mode::SeqRead);
        assert_eq!(cli.path, PathBuf::from("/tmp/test.dat"));
        assert_eq!(cli.backend_kind(), BackendKind::Buffered);
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_direct_io_positional() {
        let cli = Cli::try_parse_from(["diskprobe", "rnd-write", "/dev/sdb", "direct_io"]).unwrap();
        assert_eq!(cli.mode, Mode::RndWrite);
        assert_eq!(cli.backend_kind(), BackendKind::Direct);
    }

    #[test]
    fn test_all_modes_parse() {
        for (arg, mode) in [
            ("seq-read", Mode::SeqRead),
            ("seq-write", Mode::SeqWrite),
            ("rnd-read", Mode::RndRead),
            ("rnd-write", Mode::RndWrite),
            ("allocate", Mode::Allocate),
            ("show-cache", Mode::ShowCache),
        ] {
            let cli = Cli::try_parse_from(["diskprobe", arg, "f"]).unwrap();
            assert_eq!(cli.mode, mode);
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Cli::try_parse_from(["diskprobe", "seq-scan", "f"]).is_err());
    }

    #[test]
    fn test_missing_path_rejected() {
        assert!(Cli::try_parse_from(["diskprobe", "seq-read"]).is_err());
    }

    #[test]
    fn test_unknown_io_mode_rejected() {
        assert!(Cli::try_parse_from(["diskprobe", "seq-read", "f", "mmap"]).is_err());
    }

    #[test]
    fn test_mode_operations() {
        assert_eq!(Mode::SeqWrite.operation(), Some(Operation::SequentialWrite));
        assert_eq!(Mode::RndRead.operation(), Some(Operation::RandomRead));
        assert_eq!(Mode::Allocate.operation(), None);
        assert_eq!(Mode::ShowCache.operation(), None);
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["diskprobe", "allocate", "f", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
