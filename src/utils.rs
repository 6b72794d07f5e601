pub mod parsers;

use clap::builder::{
    styling::{AnsiColor, Effects},
    Styles,
};
use std::time::Duration;

pub use parsers::{parse_job_duration, parse_storage_size, parse_time_limit, StorageUnit};

/// Format duration for display in HH:MM:SS format.
///
/// Displays time with hours as the maximum unit (no days).
/// Format: `HH:MM:SS` where hours can exceed 24.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use htcrystalball::utils::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(45)), "00:00:45");
/// assert_eq!(format_duration(Duration::from_secs(4500)), "01:15:00");
/// assert_eq!(format_duration(Duration::from_secs(90000)), "25:00:00");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format a byte count as GiB with two decimals (e.g., `"10.00 GiB"`).
///
/// # Examples
///
/// ```
/// use htcrystalball::utils::format_bytes;
///
/// assert_eq!(format_bytes(10 << 30), "10.00 GiB");
/// assert_eq!(format_bytes(512 << 20), "0.50 GiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    format!("{:.2} GiB", bytes as f64 / StorageUnit::GiB.bytes() as f64)
}

pub const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());
