use crate::cli::{HtCrystalBall, RequestArgs};
use crate::display;
use anyhow::{Context, Result};
use htcrystalball::config::{load_config, Config, OutputFormat};
use htcrystalball::core::{
    default_snapshot_path, estimate, EstimateError, JobRequest, RequestOptions,
};
use htcrystalball::pool::PoolSnapshot;
use htcrystalball::submit::parse_submit_file;
use htcrystalball::utils::parsers::{parse_job_duration, parse_storage_size, StorageUnit};
use std::path::PathBuf;

pub fn handle_estimate(args: &HtCrystalBall) -> Result<()> {
    let config = load_config(args.config.as_ref()).context("Failed to load configuration")?;

    let request = resolve_request(&args.request)?;
    tracing::debug!(?request, "Resolved job request");

    let snapshot_path = snapshot_path(&args.request, &config)?;
    let snapshot = PoolSnapshot::load(&snapshot_path)?;
    let result = estimate(&snapshot.nodes, &request)?;

    if !result.feasible {
        tracing::warn!("No node in the pool can run the requested job");
    }

    let format = if args.request.json {
        OutputFormat::Json
    } else {
        config.output.format
    };

    match format {
        OutputFormat::Json => display::print_json(&result),
        OutputFormat::Table => {
            if args.verbose > 0 {
                display::print_inputs(&request);
                display::print_nodes(&snapshot.nodes);
                display::print_preview(&snapshot.nodes, &request, &result, config.output.color);
            }
            display::print_summary(&request, &result, snapshot.nodes.len());
            Ok(())
        }
    }
}

/// Merges command-line values over the submit file and checks the required ones are present.
pub(crate) fn resolve_request(args: &RequestArgs) -> Result<JobRequest> {
    let cli = request_options(args)?;
    let submit = match &args.submit {
        Some(path) => parse_submit_file(path)?,
        None => RequestOptions::default(),
    };
    let merged = cli.or(submit);

    if merged.cpus.is_none() {
        return Err(EstimateError::InvalidRequest(
            "no number of CPU cores given; pass CPU or set request_cpus in a submit file".into(),
        )
        .into());
    }
    if merged.memory.is_none() {
        return Err(EstimateError::InvalidRequest(
            "no RAM amount given; pass RAM or set request_memory in a submit file".into(),
        )
        .into());
    }

    Ok(merged.resolve())
}

fn request_options(args: &RequestArgs) -> Result<RequestOptions> {
    Ok(RequestOptions {
        cpus: args.cpu,
        memory: args
            .ram
            .as_deref()
            .map(|ram| parse_storage_size(ram, StorageUnit::GiB))
            .transpose()
            .context("Invalid RAM amount")?,
        gpus: args.gpu,
        disk: args
            .disk
            .as_deref()
            .map(|disk| parse_storage_size(disk, StorageUnit::GiB))
            .transpose()
            .context("Invalid disk amount")?,
        jobs: args.jobs,
        duration: args
            .time
            .as_deref()
            .map(parse_job_duration)
            .transpose()
            .context("Invalid job duration")?,
        max_nodes: args.max_nodes,
    })
}

fn snapshot_path(args: &RequestArgs, config: &Config) -> Result<PathBuf> {
    if let Some(path) = args.pool.clone().or_else(|| config.pool.snapshot.clone()) {
        return Ok(path);
    }
    default_snapshot_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const GIB: u64 = 1 << 30;

    fn args(cpu: Option<u32>, ram: Option<&str>) -> RequestArgs {
        RequestArgs {
            cpu,
            ram: ram.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn parses_command_line_quantities() -> Result<()> {
        let request = resolve_request(&RequestArgs {
            disk: Some("20G".into()),
            time: Some("15m".into()),
            jobs: Some(20),
            ..args(Some(4), Some("10G"))
        })?;

        assert_eq!(request.cores, 4);
        assert_eq!(request.memory, 10 * GIB);
        assert_eq!(request.disk, 20 * GIB);
        assert_eq!(request.jobs, 20);
        assert_eq!(request.duration, Some(Duration::from_secs(900)));
        Ok(())
    }

    #[test]
    fn missing_cpu_is_an_invalid_request() {
        let err = resolve_request(&args(None, Some("10G"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EstimateError>(),
            Some(EstimateError::InvalidRequest(_))
        ));
    }

    #[test]
    fn missing_ram_is_an_invalid_request() {
        let err = resolve_request(&args(Some(1), None)).unwrap_err();
        assert!(err.to_string().contains("RAM"));
    }

    #[test]
    fn bad_units_are_reported() {
        let err = resolve_request(&args(Some(1), Some("10X"))).unwrap_err();
        assert!(err.to_string().contains("Invalid RAM amount"));
    }

    #[test]
    fn command_line_wins_over_submit_file() -> Result<()> {
        let mut submit = NamedTempFile::new()?;
        writeln!(submit, "request_cpus = 1")?;
        writeln!(submit, "request_memory = 2048")?;
        writeln!(submit, "request_gpus = 1")?;
        writeln!(submit, "queue 50")?;

        let request = resolve_request(&RequestArgs {
            submit: Some(submit.path().to_path_buf()),
            jobs: Some(10),
            ..args(Some(8), None)
        })?;

        assert_eq!(request.cores, 8);
        assert_eq!(request.memory, 2 * GIB);
        assert_eq!(request.gpus, 1);
        assert_eq!(request.jobs, 10);
        Ok(())
    }

    #[test]
    fn explicit_zero_shape_reaches_the_estimator() -> Result<()> {
        let request = resolve_request(&args(Some(0), Some("0")))?;
        let pool = vec![htcrystalball::core::NodeResources::new("n1", 8, 32 * GIB)];
        assert_eq!(
            estimate(&pool, &request).unwrap_err(),
            EstimateError::DegenerateRequest
        );
        Ok(())
    }

    #[test]
    fn pool_flag_beats_config() -> Result<()> {
        let mut config = Config::default();
        config.pool.snapshot = Some(PathBuf::from("/from/config.json"));

        let from_flag = RequestArgs {
            pool: Some(PathBuf::from("/from/flag.json")),
            ..Default::default()
        };
        assert_eq!(
            snapshot_path(&from_flag, &config)?,
            PathBuf::from("/from/flag.json")
        );
        assert_eq!(
            snapshot_path(&RequestArgs::default(), &config)?,
            PathBuf::from("/from/config.json")
        );
        Ok(())
    }
}
