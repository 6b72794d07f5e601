use anyhow::{Context, Result};
use htcrystalball::core::{JobRequest, MatchResult, NodeResources};
use htcrystalball::utils::{format_bytes, format_duration};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use tabled::{builder::Builder, settings::Style};

pub fn print_json(result: &MatchResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

pub fn print_inputs(request: &JobRequest) {
    let mut builder = Builder::default();
    builder.push_record(["PARAMETER", "VALUE"]);
    builder.push_record(["CPUS".to_string(), request.cores.to_string()]);
    builder.push_record(["RAM".to_string(), format_bytes(request.memory)]);
    builder.push_record(["DISK".to_string(), format_bytes(request.disk)]);
    builder.push_record(["GPUS".to_string(), request.gpus.to_string()]);
    builder.push_record(["JOBS".to_string(), request.jobs.to_string()]);
    builder.push_record([
        "JOB DURATION".to_string(),
        request.duration.map_or_else(|| "-".to_string(), format_duration),
    ]);
    builder.push_record([
        "MAX NODES".to_string(),
        request
            .max_nodes
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
    ]);

    println!("INPUT");
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub fn print_nodes(nodes: &[NodeResources]) {
    let mut builder = Builder::default();
    builder.push_record(["NODE", "CORES", "RAM", "GPUS", "DISK"]);
    for node in nodes {
        builder.push_record([
            node.name.clone(),
            node.cores.to_string(),
            format_bytes(node.memory),
            node.gpus.to_string(),
            format_bytes(node.disk),
        ]);
    }

    println!("NODES");
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub fn print_preview(
    nodes: &[NodeResources],
    request: &JobRequest,
    result: &MatchResult,
    color: bool,
) {
    let by_name: HashMap<&str, &NodeResources> =
        nodes.iter().map(|n| (n.name.as_str(), n)).collect();

    let mut builder = Builder::default();
    builder.push_record([
        "NODE",
        "FITS",
        "SLOTS",
        "LIMITED BY",
        "CORE USAGE",
        "RAM USAGE",
        "GPU USAGE",
        "DISK USAGE",
        "WALL TIME ALONE",
        "SELECTED",
    ]);

    for matched in &result.nodes {
        let Some(node) = by_name.get(matched.name.as_str()) else {
            continue;
        };
        let row = [
            matched.name.clone(),
            if matched.fits() { "YES" } else { "NO" }.to_string(),
            matched.slots.to_string(),
            matched.limited_by.to_string(),
            count_usage(u64::from(request.cores), u64::from(node.cores)),
            bytes_usage(request.memory, node.memory),
            count_usage(u64::from(request.gpus), u64::from(node.gpus)),
            bytes_usage(request.disk, node.disk),
            matched
                .wall_time
                .map_or_else(|| "-".to_string(), format_duration),
            if matched.selected { "yes" } else { "no" }.to_string(),
        ];

        if color {
            builder.push_record(row.map(|cell| {
                if matched.fits() {
                    cell.green().to_string()
                } else {
                    cell.red().to_string()
                }
            }));
        } else {
            builder.push_record(row);
        }
    }

    println!("PREVIEW");
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub fn print_summary(request: &JobRequest, result: &MatchResult, pool_size: usize) {
    if !result.feasible {
        println!(
            "0 jobs fit: no node in the pool of {pool_size} can run a job with {}.",
            describe_shape(request)
        );
        return;
    }

    println!(
        "The job fits on {} of {pool_size} nodes.",
        result.satisfying_nodes().len()
    );

    let selected = result.selected_nodes();
    if request.max_nodes.is_some() {
        println!(
            "{} jobs can run concurrently on the best {} node(s): {}.",
            result.aggregate_slots,
            selected.len(),
            selected.join(", ")
        );
    } else {
        println!("{} jobs can run concurrently.", result.aggregate_slots);
    }

    match (result.waves, result.estimated_time) {
        (Some(waves), Some(time)) => println!(
            "{} job(s) need {waves} wave(s); estimated time on an idle pool: {}.",
            request.jobs,
            format_duration(time)
        ),
        (Some(waves), None) => println!(
            "{} job(s) need {waves} wave(s). Pass --time to get a time estimate.",
            request.jobs
        ),
        _ => {}
    }
}

fn describe_shape(request: &JobRequest) -> String {
    let mut parts = vec![
        format!("{} core(s)", request.cores),
        format!("{} RAM", format_bytes(request.memory)),
    ];
    if request.gpus > 0 {
        parts.push(format!("{} GPU(s)", request.gpus));
    }
    if request.disk > 0 {
        parts.push(format!("{} disk", format_bytes(request.disk)));
    }
    parts.join(", ")
}

fn percent(requested: u64, capacity: u64) -> String {
    if capacity == 0 {
        return "n/a".to_string();
    }
    let pct = (requested as f64 / capacity as f64 * 100.0).round();
    format!("{pct:.0}%")
}

fn count_usage(requested: u64, capacity: u64) -> String {
    if requested == 0 {
        return "-".to_string();
    }
    format!("{requested}/{capacity} ({})", percent(requested, capacity))
}

fn bytes_usage(requested: u64, capacity: u64) -> String {
    if requested == 0 {
        return "-".to_string();
    }
    format!(
        "{}/{} ({})",
        format_bytes(requested).trim_end_matches(" GiB"),
        format_bytes(capacity),
        percent(requested, capacity)
    )
}
