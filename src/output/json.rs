//! JSON output formatting
//!
//! One document per invocation. Sequential tests report MB/s, random tests
//! microseconds per operation; `unit` says which.

use crate::config::BenchConfig;
use crate::engine::{BackendKind, Operation};
use crate::error::BenchError;
use crate::stats::{Measurement, Unit};
use crate::target::cache::CacheResidency;
use crate::Result;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Summary of one measurement mode
#[derive(Debug, Clone, Serialize)]
pub struct JsonMeasurement<'a> {
    /// RFC 3339 completion time
    pub timestamp: String,
    pub operation: Operation,
    pub backend: BackendKind,
    pub path: String,
    pub unit: Unit,
    pub mean: f64,
    /// Sample standard deviation
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub samples: &'a [f64],
    pub config: &'a BenchConfig,
}

impl<'a> JsonMeasurement<'a> {
    pub fn new(
        operation: Operation,
        backend: BackendKind,
        path: &Path,
        measurement: &'a Measurement,
        config: &'a BenchConfig,
    ) -> Self {
        Self {
            timestamp: now_rfc3339(),
            operation,
            backend,
            path: path.display().to_string(),
            unit: measurement.unit,
            mean: measurement.mean,
            stddev: measurement.variation,
            min: measurement.min(),
            max: measurement.max(),
            samples: &measurement.samples,
            config,
        }
    }
}

/// Page-cache snapshot for `show-cache`
#[derive(Debug, Clone, Serialize)]
pub struct JsonResidency<'a> {
    pub timestamp: String,
    #[serde(flatten)]
    pub residency: &'a CacheResidency,
    pub resident_ratio: f64,
}

impl<'a> JsonResidency<'a> {
    pub fn new(residency: &'a CacheResidency) -> Self {
        Self {
            timestamp: now_rfc3339(),
            residency,
            resident_ratio: residency.resident_ratio(),
        }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write `value` as pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)
}

/// Write `value` to stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    write_json(io::stdout().lock(), value)
        .map_err(|e| BenchError::io("write", Path::new("<stdout>"), e))
}
