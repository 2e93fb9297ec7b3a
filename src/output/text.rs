//! Human-readable text output

use crate::stats::Measurement;
use crate::target::cache::CacheResidency;

/// One line: `<mean> +- <stddev> <unit>`
pub fn format_measurement(measurement: &Measurement) -> String {
    measurement.to_string()
}

/// Path, size in MB (10^6 bytes) and resident/total page counts
pub fn format_residency(residency: &CacheResidency) -> String {
    format!(
        "file path: {}\nfile size: {} MB\nfile cached pages: {}/{}",
        residency.path.display(),
        residency.size as f64 / 1e6,
        residency.resident_pages,
        residency.total_pages
    )
}

pub fn print_measurement(measurement: &Measurement) {
    println!("{}", format_measurement(measurement));
}

pub fn print_residency(residency: &CacheResidency) {
    println!("{}", format_residency(residency));
}
