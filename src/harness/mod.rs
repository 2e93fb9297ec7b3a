//! Repeated-trial measurement harness
//!
//! A trial runs one timed operation `repetitions` times. Before every
//! repetition the backing file is re-allocated (and zero-filled by default) so
//! layout changes and leftover cache state from one repetition do not leak into
//! the next. Each repetition contributes exactly one sample; the first error
//! aborts the whole trial and nothing partial is reported.
//!
//! # Example
//!
//! ```no_run
//! use diskprobe::config::BenchConfig;
//! use diskprobe::engine::{create_backend, BackendKind, Operation};
//! use diskprobe::harness::MeasurementHarness;
//! use std::path::Path;
//!
//! let config = BenchConfig::default();
//! let backend = create_backend(BackendKind::Buffered, config.backend_config());
//! let harness = MeasurementHarness::new(backend.as_ref(), &config);
//!
//! let measurement = harness.measure(Path::new("/tmp/diskprobe.dat"), Operation::SequentialRead)?;
//! println!("{}", measurement);
//! # Ok::<(), diskprobe::BenchError>(())
//! ```

use crate::config::BenchConfig;
use crate::engine::{IOBackend, Metric, Operation, OperationResult};
use crate::stats::{Measurement, Unit};
use crate::target::allocator::FileAllocator;
use crate::util::time::{format_bytes, format_duration, format_throughput};
use crate::Result;
use std::path::Path;
use tracing::{debug, info};

/// Runs operations against a backend and turns timings into samples
pub struct MeasurementHarness<'a> {
    backend: &'a dyn IOBackend,
    config: &'a BenchConfig,
    allocator: FileAllocator,
}

impl<'a> MeasurementHarness<'a> {
    pub fn new(backend: &'a dyn IOBackend, config: &'a BenchConfig) -> Self {
        Self {
            backend,
            config,
            allocator: FileAllocator::default(),
        }
    }

    /// Reset the backing file to its neutral state
    pub fn prepare(&self, path: &Path) -> Result<()> {
        self.allocator
            .allocate(path, self.config.file_size, self.config.zero_fill)
    }

    /// Run `operation` once with the configured parameters
    pub fn run_operation(&self, path: &Path, operation: Operation) -> Result<OperationResult> {
        let config = self.config;
        match operation {
            Operation::SequentialWrite => {
                self.backend
                    .sequential_write(path, config.file_size, config.chunk_size)
            }
            Operation::SequentialRead => self.backend.sequential_read(
                path,
                config.file_size,
                config.chunk_size,
                config.invalidate,
            ),
            Operation::RandomWrite => {
                self.backend
                    .random_write(path, config.file_size, config.op_count)
            }
            Operation::RandomRead => self.backend.random_read(
                path,
                config.file_size,
                config.op_count,
                config.invalidate,
            ),
        }
    }

    /// Collect one sample per repetition
    ///
    /// Returns exactly `repetitions` samples, in MB/s for sequential tests and
    /// microseconds for random tests.
    pub fn run_trial(&self, path: &Path, operation: Operation) -> Result<Vec<f64>> {
        let repetitions = self.config.repetitions;
        let mut samples = Vec::with_capacity(repetitions);

        info!(
            %operation,
            backend = %self.backend.kind(),
            path = %path.display(),
            repetitions,
            "starting trial"
        );

        for repetition in 0..repetitions {
            self.prepare(path)?;
            let result = self.run_operation(path, operation)?;
            let sample = scale_sample(&result);

            debug!(
                repetition,
                sample,
                unit = %unit_for(operation),
                bytes = %format_bytes(result.bytes),
                ops = result.ops,
                rate = %result.throughput().map(format_throughput).unwrap_or_default(),
                elapsed = %format_duration(result.duration),
                "repetition complete"
            );
            samples.push(sample);
        }

        Ok(samples)
    }

    /// Run a trial and summarize it
    pub fn measure(&self, path: &Path, operation: Operation) -> Result<Measurement> {
        let samples = self.run_trial(path, operation)?;
        let measurement = Measurement::from_samples(samples, unit_for(operation))?;

        info!(%operation, mean = measurement.mean, stddev = measurement.variation, "trial complete");
        Ok(measurement)
    }
}

/// Reporting unit for an operation
pub fn unit_for(operation: Operation) -> Unit {
    if operation.reports_throughput() {
        Unit::MegabytesPerSec
    } else {
        Unit::Microseconds
    }
}

/// Convert a result to its reported unit: bytes/s to MB/s, s/op to us/op
pub fn scale_sample(result: &OperationResult) -> f64 {
    match result.metric {
        Metric::Throughput(bytes_per_sec) => bytes_per_sec / 1e6,
        Metric::Latency(seconds) => seconds * 1e6,
    }
}
