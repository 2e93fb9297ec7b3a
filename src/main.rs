//! diskprobe CLI entry point

use anyhow::Context;
use clap::Parser;
use diskprobe::config::cli::{Cli, Mode};
use diskprobe::config::{cli_convert, toml, validator, BenchConfig};
use diskprobe::engine::{create_backend, BackendKind};
use diskprobe::output::{json, text};
use diskprobe::target::allocator::FileAllocator;
use diskprobe::target::cache::get_residency;
use diskprobe::{BenchError, MeasurementHarness, Result};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Defaults, then the TOML file, then CLI flags, then validation
fn load_config(cli: &Cli, backend: BackendKind) -> anyhow::Result<BenchConfig> {
    let base = match cli.config {
        Some(ref path) => toml::parse_toml_file(path)?,
        None => BenchConfig::default(),
    };

    let config = cli_convert::apply_cli_overrides(cli, base)?;
    validator::validate_config(&config, backend).context("Configuration validation failed")?;

    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let backend_kind = cli.backend_kind();
    let config = load_config(cli, backend_kind)?;
    debug!(?config, backend = %backend_kind, "configuration loaded");

    match cli.mode {
        Mode::Allocate => {
            FileAllocator::default().allocate(&cli.path, config.file_size, config.zero_fill)
        }
        Mode::ShowCache => show_cache(cli),
        Mode::SeqRead | Mode::SeqWrite | Mode::RndRead | Mode::RndWrite => {
            measure(cli, &config, backend_kind)
        }
    }
}

fn show_cache(cli: &Cli) -> Result<()> {
    let residency = get_residency(&cli.path)?;

    if cli.json {
        json::print_json(&json::JsonResidency::new(&residency))
    } else {
        text::print_residency(&residency);
        Ok(())
    }
}

fn measure(cli: &Cli, config: &BenchConfig, backend_kind: BackendKind) -> Result<()> {
    let operation = cli
        .mode
        .operation()
        .ok_or_else(|| BenchError::Config(format!("{:?} is not a measurement mode", cli.mode)))?;

    let backend = create_backend(backend_kind, config.backend_config());
    let harness = MeasurementHarness::new(backend.as_ref(), config);
    let measurement = harness.measure(&cli.path, operation)?;
    info!(%operation, result = %measurement, "measurement complete");

    if cli.json {
        json::print_json(&json::JsonMeasurement::new(
            operation,
            backend_kind,
            &cli.path,
            &measurement,
            config,
        ))
    } else {
        text::print_measurement(&measurement);
        Ok(())
    }
}
