//! Reading request values from an HTCondor submit description.
//!
//! Only the handful of commands that describe a job's shape are read; the rest
//! of the file (executable, arguments, log files, ...) is ignored.

use crate::core::RequestOptions;
use crate::utils::parsers::{parse_job_duration, parse_storage_size, StorageUnit};
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::Path;

/// Reads the submit file at `path`. See [`parse_submit_description`].
pub fn parse_submit_file(path: &Path) -> Result<RequestOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read submit file {}", path.display()))?;
    parse_submit_description(&content)
        .with_context(|| format!("Invalid submit file {}", path.display()))
}

/// Extracts the job shape from submit description text.
///
/// Recognised commands (case-insensitive, optionally prefixed with `+` or `MY.`):
/// `request_cpus`, `request_memory` (MiB unless a unit is given),
/// `request_gpus`, `request_disk` (KiB unless a unit is given),
/// `job_duration`, `max_nodes`, `jobs`, and `queue [N]`.
///
/// # Examples
///
/// ```
/// use htcrystalball::submit::parse_submit_description;
///
/// let options = parse_submit_description("request_cpus = 4\nrequest_memory = 10G\nqueue 20\n").unwrap();
/// assert_eq!(options.cpus, Some(4));
/// assert_eq!(options.memory, Some(10 << 30));
/// assert_eq!(options.jobs, Some(20));
/// ```
pub fn parse_submit_description(content: &str) -> Result<RequestOptions> {
    let mut options = RequestOptions::default();

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        apply_line(&mut options, line)
            .with_context(|| format!("line {}: '{}'", index + 1, line))?;
    }

    tracing::debug!(?options, "Parsed submit description");
    Ok(options)
}

fn apply_line(options: &mut RequestOptions, line: &str) -> Result<()> {
    let Some((key, value)) = line.split_once('=') else {
        return apply_queue(options, line);
    };

    let key = normalize_key(key);
    let value = value.trim().trim_matches('"');

    match key.as_str() {
        "requestcpus" => options.cpus = Some(parse_count(value)?),
        "requestmemory" => options.memory = Some(parse_storage_size(value, StorageUnit::MiB)?),
        "requestgpus" => options.gpus = Some(parse_count(value)?),
        "requestdisk" => options.disk = Some(parse_storage_size(value, StorageUnit::KiB)?),
        "jobduration" => options.duration = Some(parse_job_duration(value)?),
        "maxnodes" => options.max_nodes = Some(parse_count(value)?),
        "jobs" => options.jobs = Some(parse_count(value)?),
        other => tracing::debug!(key = other, "Ignoring submit command"),
    }
    Ok(())
}

fn apply_queue(options: &mut RequestOptions, line: &str) -> Result<()> {
    let mut words = line.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    if !keyword.eq_ignore_ascii_case("queue") {
        bail!("Expected 'key = value' or a queue statement");
    }

    let count = match (words.next(), words.next()) {
        (None, _) => 1,
        (Some(n), None) => parse_count(n)
            .map_err(|_| anyhow!("Only 'queue' and 'queue <count>' are supported"))?,
        _ => bail!("Only 'queue' and 'queue <count>' are supported"),
    };
    options.jobs = Some(count);
    Ok(())
}

/// `+MaxNodes`, `MY.max_nodes` and `MAXNODES` all name the same command: `maxnodes`.
fn normalize_key(key: &str) -> String {
    let key = key.trim();
    let key = key.strip_prefix('+').unwrap_or(key);
    let key = match key.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("my.") => &key[3..],
        _ => key,
    };

    key.chars()
        .filter(|&ch| ch != '_')
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

fn parse_count(value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .with_context(|| format!("Expected a non-negative integer, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_the_job_shape() {
        let submit = r#"
# a typical submit file
executable     = run.sh
arguments      = $(Process)
request_cpus   = 4
request_memory = 10 GB
request_gpus   = 1
request_disk   = 2048
+JobDuration   = "15m"
+MaxNodes      = 3
queue 20
"#;
        let options = parse_submit_description(submit).unwrap();
        assert_eq!(options.cpus, Some(4));
        assert_eq!(options.memory, Some(10 << 30));
        assert_eq!(options.gpus, Some(1));
        assert_eq!(options.disk, Some(2048 << 10));
        assert_eq!(options.duration, Some(Duration::from_secs(900)));
        assert_eq!(options.max_nodes, Some(3));
        assert_eq!(options.jobs, Some(20));
    }

    #[test]
    fn bare_memory_is_mebibytes() {
        let options = parse_submit_description("REQUEST_MEMORY = 2048").unwrap();
        assert_eq!(options.memory, Some(2048 << 20));
    }

    #[test]
    fn bare_queue_means_one_job() {
        let options = parse_submit_description("request_cpus = 1\nqueue").unwrap();
        assert_eq!(options.jobs, Some(1));
    }

    #[test]
    fn my_prefix_and_snake_case_keys() {
        let options =
            parse_submit_description("MY.max_nodes = 2\njob_duration = 1h\njobs = 7").unwrap();
        assert_eq!(options.max_nodes, Some(2));
        assert_eq!(options.duration, Some(Duration::from_secs(3600)));
        assert_eq!(options.jobs, Some(7));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let options = parse_submit_description(
            "JOBS = 5\n+MAXNODES = 2\nJOBDURATION = 15m\nRequest_Cpus = 3\nmy.RequestGpus = 1",
        )
        .unwrap();
        assert_eq!(options.jobs, Some(5));
        assert_eq!(options.max_nodes, Some(2));
        assert_eq!(options.duration, Some(Duration::from_secs(900)));
        assert_eq!(options.cpus, Some(3));
        assert_eq!(options.gpus, Some(1));
    }

    #[test]
    fn normalized_keys() {
        assert_eq!(normalize_key("+MaxNodes"), "maxnodes");
        assert_eq!(normalize_key(" MY.max_nodes "), "maxnodes");
        assert_eq!(normalize_key("REQUEST_MEMORY"), "requestmemory");
    }

    #[test]
    fn unknown_commands_are_ignored() {
        let options = parse_submit_description("universe = vanilla\nlog = job.log").unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn queue_from_is_rejected() {
        let err = parse_submit_description("queue file from list.txt").unwrap_err();
        assert!(format!("{err:#}").contains("line 1"));
    }

    #[test]
    fn malformed_value_names_the_line() {
        let err = parse_submit_description("request_cpus = 1\nrequest_cpus = many").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("line 2"));
        assert!(message.contains("many"));
    }

    #[test]
    fn reads_from_disk() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "request_cpus = 2")?;
        writeln!(file, "request_memory = 4G")?;

        let options = parse_submit_file(file.path())?;
        assert_eq!(options.cpus, Some(2));
        assert_eq!(options.memory, Some(4 << 30));
        Ok(())
    }
}
