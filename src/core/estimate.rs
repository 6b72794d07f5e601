//! Slot matching and throughput estimation over a pool snapshot.
//!
//! Everything here is a pure function of the snapshot and the request: no
//! I/O, no shared state.

use crate::core::error::{EstimateError, EstimateResult};
use crate::core::node::{NodeResources, Resource};
use crate::core::request::JobRequest;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use strum::IntoEnumIterator;

/// How one node fares against the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeMatch {
    pub name: String,
    /// Concurrent jobs of the requested shape the node can hold
    pub slots: u64,
    /// The dimension that produced the slot count
    pub limited_by: Resource,
    /// Whether the node counts toward the pool aggregate under `max_nodes`
    pub selected: bool,
    /// Time to drain every job on this node alone
    pub wall_time: Option<Duration>,
}

impl NodeMatch {
    pub fn fits(&self) -> bool {
        self.slots > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Ordered by slots descending, then name ascending
    pub nodes: Vec<NodeMatch>,
    pub aggregate_slots: u64,
    pub feasible: bool,
    /// Rounds of concurrent execution needed to run every job
    pub waves: Option<u32>,
    pub estimated_time: Option<Duration>,
}

impl MatchResult {
    /// Names of every node that can hold at least one job.
    pub fn satisfying_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.fits())
            .map(|n| n.name.as_str())
            .collect()
    }

    /// Names of the nodes counted toward the aggregate.
    pub fn selected_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.name.as_str())
            .collect()
    }

    pub fn fits_on(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name && n.fits())
    }
}

/// Matches `request` against every node of `pool` and estimates how long the
/// batch takes to drain.
///
/// A request that fits nowhere yields `feasible == false` rather than an error.
///
/// # Examples
///
/// ```
/// use htcrystalball::core::{estimate, JobRequest, NodeResources};
///
/// const GIB: u64 = 1024 * 1024 * 1024;
/// let pool = vec![NodeResources::new("node1", 8, 32 * GIB)];
/// let request = JobRequest::builder().cores(4).memory(10 * GIB).build();
///
/// let result = estimate(&pool, &request).unwrap();
/// assert_eq!(result.aggregate_slots, 2);
/// assert_eq!(result.satisfying_nodes(), vec!["node1"]);
/// ```
pub fn estimate(pool: &[NodeResources], request: &JobRequest) -> EstimateResult<MatchResult> {
    if Resource::iter().all(|r| request.requested(r) == 0) {
        return Err(EstimateError::DegenerateRequest);
    }
    validate(pool, request)?;

    let mut nodes = Vec::with_capacity(pool.len());
    for node in pool {
        let (slots, limited_by) =
            slots_on(node, request).ok_or(EstimateError::DegenerateRequest)?;
        tracing::debug!(node = %node.name, slots, %limited_by, "Matched node");
        nodes.push(NodeMatch {
            name: node.name.clone(),
            slots,
            limited_by,
            selected: true,
            wall_time: drain_time(request, slots),
        });
    }

    nodes.sort_by(|a, b| b.slots.cmp(&a.slots).then_with(|| a.name.cmp(&b.name)));

    if let Some(max_nodes) = request.max_nodes {
        let limit = usize::try_from(max_nodes).unwrap_or(usize::MAX);
        for node in nodes.iter_mut().skip(limit) {
            node.selected = false;
        }
    }

    let aggregate_slots = nodes
        .iter()
        .filter(|n| n.selected)
        .fold(0u64, |acc, n| acc.saturating_add(n.slots));
    let feasible = aggregate_slots > 0;

    let waves = feasible.then(|| waves_needed(request.jobs, aggregate_slots));
    let estimated_time = waves.and_then(|w| request.duration.map(|d| d.saturating_mul(w)));

    tracing::debug!(
        aggregate_slots,
        feasible,
        ?waves,
        ?estimated_time,
        "Estimated pool throughput"
    );

    Ok(MatchResult {
        nodes,
        aggregate_slots,
        feasible,
        waves,
        estimated_time,
    })
}

/// Slot count of one node and the dimension producing it.
///
/// Dimensions the request leaves at zero do not constrain the node. Returns
/// `None` when the request constrains nothing at all.
pub fn slots_on(node: &NodeResources, request: &JobRequest) -> Option<(u64, Resource)> {
    Resource::iter()
        .filter_map(|resource| {
            let requested = request.requested(resource);
            (requested > 0).then(|| (node.capacity(resource) / requested, resource))
        })
        .fold(None, |best, (slots, resource)| match best {
            Some((best_slots, _)) if best_slots <= slots => best,
            _ => Some((slots, resource)),
        })
}

fn validate(pool: &[NodeResources], request: &JobRequest) -> EstimateResult<()> {
    if pool.is_empty() {
        return Err(invalid("the pool snapshot contains no nodes"));
    }
    if request.cores == 0 {
        return Err(invalid("at least one CPU core must be requested"));
    }
    if request.memory == 0 {
        return Err(invalid("a RAM amount greater than zero must be requested"));
    }
    if request.jobs == 0 {
        return Err(invalid("the number of jobs must be at least 1"));
    }
    if request.max_nodes == Some(0) {
        return Err(invalid("max nodes must be at least 1 when given"));
    }
    if request.duration.is_some_and(|d| d.is_zero()) {
        return Err(invalid("the job duration must be greater than zero"));
    }

    let mut seen = HashSet::with_capacity(pool.len());
    for node in pool {
        if !seen.insert(node.name.as_str()) {
            return Err(invalid(format!(
                "node '{}' appears more than once in the pool snapshot",
                node.name
            )));
        }
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> EstimateError {
    EstimateError::InvalidRequest(reason.into())
}

fn waves_needed(jobs: u32, slots: u64) -> u32 {
    // Never more waves than jobs, so this always fits.
    u32::try_from(u64::from(jobs).div_ceil(slots)).unwrap_or(u32::MAX)
}

fn drain_time(request: &JobRequest, slots: u64) -> Option<Duration> {
    if slots == 0 {
        return None;
    }
    request
        .duration
        .map(|d| d.saturating_mul(waves_needed(request.jobs, slots)))
}
