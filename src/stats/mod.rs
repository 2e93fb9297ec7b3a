//! Repeated-trial statistics
//!
//! A trial yields one scalar sample per repetition. The reported figure is the
//! mean with a Bessel-corrected sample standard deviation as its spread.
//!
//! # Example
//!
//! ```
//! use diskprobe::stats::{mean, sample_stddev};
//!
//! let samples = [100.0, 102.0, 98.0];
//! assert_eq!(mean(&samples).unwrap(), 100.0);
//! assert_eq!(sample_stddev(&samples).unwrap(), 2.0);
//! ```

use crate::error::BenchError;
use crate::Result;
use serde::Serialize;
use std::fmt;

/// Arithmetic mean; rejects an empty sample
pub fn mean(samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        return Err(BenchError::InsufficientSamples { needed: 1, got: 0 });
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Sample standard deviation with Bessel's correction (n - 1 divisor)
///
/// Undefined for fewer than two samples, which is rejected rather than
/// dividing by zero.
pub fn sample_stddev(samples: &[f64]) -> Result<f64> {
    if samples.len() < 2 {
        return Err(BenchError::InsufficientSamples {
            needed: 2,
            got: samples.len(),
        });
    }

    let m = mean(samples)?;
    let squared: f64 = samples.iter().map(|x| (x - m).powi(2)).sum();
    Ok((squared / (samples.len() - 1) as f64).sqrt())
}

/// Unit a sample is scaled to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    /// Throughput in 10^6 bytes per second
    #[serde(rename = "MB/s")]
    MegabytesPerSec,
    /// Latency in microseconds per operation
    #[serde(rename = "us")]
    Microseconds,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::MegabytesPerSec => write!(f, "MB/s"),
            Unit::Microseconds => write!(f, "us"),
        }
    }
}

/// Summary of a repeated trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub mean: f64,
    /// Sample standard deviation
    pub variation: f64,
    pub unit: Unit,
    pub samples: Vec<f64>,
}

impl Measurement {
    /// Reduce samples to mean and sample standard deviation
    pub fn from_samples(samples: Vec<f64>, unit: Unit) -> Result<Self> {
        let variation = sample_stddev(&samples)?;
        let mean = mean(&samples)?;
        Ok(Self {
            mean,
            variation,
            unit,
            samples,
        })
    }

    pub fn min(&self) -> f64 {
        self.samples.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} +- {:.1} {}", self.mean, self.variation, self.unit)
    }
}
