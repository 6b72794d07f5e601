use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use strum::Display;

static STORAGE_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*(?:([kKmMgGtTpP])[iI]?[bB]?|([bB]))?$")
        .expect("storage size pattern is valid")
});

static JOB_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*([a-zA-Z]*)$").expect("duration pattern is valid"));

/// Binary storage units. HTCondor always treats sizes as base 2, so `G` and
/// `GB` both mean GiB here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StorageUnit {
    #[strum(to_string = "B")]
    Bytes,
    #[strum(to_string = "KiB")]
    KiB,
    #[strum(to_string = "MiB")]
    MiB,
    #[strum(to_string = "GiB")]
    GiB,
    #[strum(to_string = "TiB")]
    TiB,
    #[strum(to_string = "PiB")]
    PiB,
}

impl StorageUnit {
    pub fn bytes(self) -> u64 {
        match self {
            StorageUnit::Bytes => 1,
            StorageUnit::KiB => 1 << 10,
            StorageUnit::MiB => 1 << 20,
            StorageUnit::GiB => 1 << 30,
            StorageUnit::TiB => 1 << 40,
            StorageUnit::PiB => 1 << 50,
        }
    }

    fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_lowercase() {
            'b' => Some(StorageUnit::Bytes),
            'k' => Some(StorageUnit::KiB),
            'm' => Some(StorageUnit::MiB),
            'g' => Some(StorageUnit::GiB),
            't' => Some(StorageUnit::TiB),
            'p' => Some(StorageUnit::PiB),
            _ => None,
        }
    }
}

/// Parse a storage size such as `"10G"`, `"512MiB"` or `"1.5TB"` into bytes.
///
/// Supported units (case-insensitive): `K`, `M`, `G`, `T`, `P`, each optionally
/// followed by `i` and/or `B`, or a bare `B` for bytes. A number without unit is
/// read in `default_unit`.
///
/// # Examples
///
/// ```
/// use htcrystalball::utils::parsers::{parse_storage_size, StorageUnit};
///
/// assert_eq!(parse_storage_size("10G", StorageUnit::GiB).unwrap(), 10 << 30);
/// assert_eq!(parse_storage_size("512MiB", StorageUnit::GiB).unwrap(), 512 << 20);
/// assert_eq!(parse_storage_size("2", StorageUnit::MiB).unwrap(), 2 << 20);
/// ```
pub fn parse_storage_size(input: &str, default_unit: StorageUnit) -> Result<u64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(anyhow!("Storage size cannot be empty"));
    }

    let caps = STORAGE_SIZE.captures(input).ok_or_else(|| {
        anyhow!("Invalid storage size '{input}'. Expected formats like 10G, 512MiB, 1.5TB or 100")
    })?;

    let amount = caps[1]
        .parse::<f64>()
        .context("Invalid number in storage size")?;
    let unit = caps
        .get(2)
        .or_else(|| caps.get(3))
        .and_then(|m| m.as_str().chars().next())
        .and_then(StorageUnit::from_prefix)
        .unwrap_or(default_unit);

    let bytes = (amount * unit.bytes() as f64).round();
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(anyhow!("Storage size '{input}' is too large"));
    }

    Ok(bytes as u64)
}

/// Parse a job duration into a [`Duration`].
///
/// Supported formats:
/// - `"15m"`, `"15min"`, `"2h"`, `"1d"`, `"30s"`: a number with a unit
/// - `"15"`: minutes (default unit)
/// - `"HH:MM:SS"` or `"MM:SS"`: clock notation
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use htcrystalball::utils::parsers::parse_job_duration;
///
/// assert_eq!(parse_job_duration("15m").unwrap(), Duration::from_secs(900));
/// assert_eq!(parse_job_duration("2h").unwrap(), Duration::from_secs(7200));
/// assert_eq!(parse_job_duration("10").unwrap(), Duration::from_secs(600));
/// assert_eq!(parse_job_duration("1:30:00").unwrap(), Duration::from_secs(5400));
/// ```
pub fn parse_job_duration(input: &str) -> Result<Duration> {
    let input = input.trim();

    if input.is_empty() {
        return Err(anyhow!("Job duration cannot be empty"));
    }

    if input.contains(':') {
        return parse_time_limit(input);
    }

    let caps = JOB_DURATION.captures(input).ok_or_else(|| {
        anyhow!("Invalid job duration '{input}'. Expected formats like 15m, 2h, 1d, 30s or 15")
    })?;

    let amount = caps[1]
        .parse::<u64>()
        .context("Invalid number in job duration")?;
    let seconds_per_unit = match caps[2].to_lowercase().as_str() {
        "s" | "sec" => 1,
        "" | "m" | "min" => 60,
        "h" => 3600,
        "d" => 86400,
        unit => return Err(anyhow!("Unknown duration unit '{unit}'. Use d, h, m or s")),
    };

    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow!("Job duration '{input}' is too large"))
}

/// Parse time limit string into Duration.
///
/// Supported formats:
/// - `"HH:MM:SS"`: hours:minutes:seconds
/// - `"MM:SS"`: minutes:seconds
/// - `"MM"`: minutes
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use htcrystalball::utils::parsers::parse_time_limit;
///
/// assert_eq!(parse_time_limit("30").unwrap(), Duration::from_secs(1800));
/// assert_eq!(parse_time_limit("30:45").unwrap(), Duration::from_secs(1845));
/// assert_eq!(parse_time_limit("2:30:45").unwrap(), Duration::from_secs(9045));
/// ```
pub fn parse_time_limit(time_str: &str) -> Result<Duration> {
    let parts: Vec<&str> = time_str.split(':').collect();

    let seconds = match parts.len() {
        1 => {
            let val = time_str
                .parse::<u64>()
                .context("Invalid time format. Expected number of minutes")?;
            val.checked_mul(60)
        }
        2 => {
            let minutes = parts[0]
                .parse::<u64>()
                .context("Invalid minutes in MM:SS format")?;
            let seconds = parts[1]
                .parse::<u64>()
                .context("Invalid seconds in MM:SS format")?;
            minutes
                .checked_mul(60)
                .and_then(|s| s.checked_add(seconds))
        }
        3 => {
            let hours = parts[0]
                .parse::<u64>()
                .context("Invalid hours in HH:MM:SS format")?;
            let minutes = parts[1]
                .parse::<u64>()
                .context("Invalid minutes in HH:MM:SS format")?;
            let seconds = parts[2]
                .parse::<u64>()
                .context("Invalid seconds in HH:MM:SS format")?;
            hours
                .checked_mul(3600)
                .and_then(|s| s.checked_add(minutes.checked_mul(60)?))
                .and_then(|s| s.checked_add(seconds))
        }
        _ => {
            return Err(anyhow!(
                "Invalid time format. Expected formats: HH:MM:SS, MM:SS, or MM"
            ))
        }
    };

    seconds
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow!("Time '{time_str}' is too large"))
}
