//! Reading a pool snapshot from disk.
//!
//! Two formats are understood: a JSON document written by this tool (or any
//! inventory exporter) and the plain-text output of `condor_status -long`.
//! Querying a live collector is left to those external tools.

use crate::core::NodeResources;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub nodes: Vec<NodeResources>,
}

impl PoolSnapshot {
    /// Loads a snapshot, picking the reader from the file extension:
    /// `.json` is read as JSON, anything else as a `condor_status -long` dump.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pool snapshot {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let snapshot = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_classads(&content)
        }
        .with_context(|| format!("Invalid pool snapshot {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            nodes = snapshot.nodes.len(),
            "Loaded pool snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse JSON pool snapshot")
    }

    /// Builds a snapshot from `condor_status -long` text.
    ///
    /// Ads are separated by blank lines. Dynamic slots are skipped because
    /// their partitionable parent already reports the whole machine. Duplicate
    /// ads for a node are counted once. A node with partitionable slots is sized
    /// by them; otherwise its static slots are summed.
    pub fn from_classads(content: &str) -> Result<Self> {
        let mut order: Vec<String> = Vec::new();
        let mut machines: HashMap<String, Machine> = HashMap::new();

        for (index, ad) in parse_ads(content).into_iter().enumerate() {
            let slot = SlotAd::from_attributes(&ad)
                .with_context(|| format!("Invalid slot ad #{}", index + 1))?;

            if slot.kind == SlotKind::Dynamic {
                tracing::trace!(node = %slot.node, "Skipping dynamic slot");
                continue;
            }

            let machine = machines.entry(slot.node.clone()).or_insert_with(|| {
                order.push(slot.node.clone());
                Machine::default()
            });
            if machine.seen.contains(&slot) {
                tracing::debug!(node = %slot.node, "Skipping duplicate slot ad");
                continue;
            }
            machine.seen.push(slot);
        }

        let nodes = order
            .into_iter()
            .filter_map(|name| {
                let machine = machines.remove(&name)?;
                machine.into_node(name)
            })
            .collect();

        Ok(Self { nodes })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    Partitionable,
    Static,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotAd {
    node: String,
    /// Slot name, so equally sized static slots stay distinct
    name: Option<String>,
    kind: SlotKind,
    cores: u32,
    /// Bytes, converted from the MiB the collector reports
    memory: u64,
    /// Bytes, converted from KiB
    disk: u64,
    gpus: u32,
}

impl SlotAd {
    fn from_attributes(attrs: &HashMap<String, String>) -> Result<Self> {
        let node = attrs
            .get("utsnamenodename")
            .or_else(|| attrs.get("machine"))
            .cloned()
            .or_else(|| {
                attrs
                    .get("name")
                    .map(|name| host_of(name).to_string())
            })
            .ok_or_else(|| anyhow!("Missing UtsnameNodename, Machine or Name attribute"))?;

        let kind = match attrs.get("slottype").map(|s| s.to_ascii_lowercase()) {
            Some(kind) if kind == "partitionable" => SlotKind::Partitionable,
            Some(kind) if kind == "dynamic" => SlotKind::Dynamic,
            Some(kind) if kind == "static" => SlotKind::Static,
            Some(other) => bail!("Unknown SlotType '{other}' on {node}"),
            None => SlotKind::Static,
        };

        let cores = required_number(attrs, "TotalSlotCpus", &node)?;
        let memory = required_number(attrs, "TotalSlotMemory", &node)?;
        let disk = required_number(attrs, "TotalSlotDisk", &node)?;
        let gpus = optional_number(attrs, "TotalSlotGPUs", &node)?.unwrap_or(0);

        Ok(Self {
            cores: u32::try_from(cores)
                .with_context(|| format!("TotalSlotCpus {cores} out of range on {node}"))?,
            memory: memory
                .checked_mul(1 << 20)
                .ok_or_else(|| anyhow!("TotalSlotMemory {memory} MiB out of range on {node}"))?,
            disk: disk
                .checked_mul(1 << 10)
                .ok_or_else(|| anyhow!("TotalSlotDisk {disk} KiB out of range on {node}"))?,
            gpus: u32::try_from(gpus)
                .with_context(|| format!("TotalSlotGPUs {gpus} out of range on {node}"))?,
            name: attrs.get("name").cloned(),
            node,
            kind,
        })
    }
}

#[derive(Debug, Default)]
struct Machine {
    seen: Vec<SlotAd>,
}

impl Machine {
    fn into_node(self, name: String) -> Option<NodeResources> {
        let partitionable: Vec<&SlotAd> = self
            .seen
            .iter()
            .filter(|s| s.kind == SlotKind::Partitionable)
            .collect();
        let slots = if partitionable.is_empty() {
            self.seen.iter().collect()
        } else {
            partitionable
        };
        if slots.is_empty() {
            return None;
        }

        let mut node = NodeResources::new(name, 0, 0);
        for slot in slots {
            node.cores = node.cores.saturating_add(slot.cores);
            node.memory = node.memory.saturating_add(slot.memory);
            node.disk = node.disk.saturating_add(slot.disk);
            node.gpus = node.gpus.saturating_add(slot.gpus);
        }
        Some(node)
    }
}

/// Splits `condor_status -long` output into attribute maps with lowercase keys.
fn parse_ads(content: &str) -> Vec<HashMap<String, String>> {
    let mut ads = Vec::new();
    let mut current = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                ads.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            current.insert(key.trim().to_ascii_lowercase(), value.to_string());
        }
    }
    if !current.is_empty() {
        ads.push(current);
    }

    ads
}

/// `slot1@node.example.org` -> `node.example.org`
fn host_of(name: &str) -> &str {
    name.rsplit_once('@').map_or(name, |(_, host)| host)
}

fn optional_number(attrs: &HashMap<String, String>, key: &str, node: &str) -> Result<Option<u64>> {
    let Some(raw) = attrs.get(&key.to_ascii_lowercase()) else {
        return Ok(None);
    };
    // condor_status prints some integral attributes as reals
    let value = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| anyhow!("Invalid {key} '{raw}' on {node}"))?;
    Ok(Some(value as u64))
}

fn required_number(attrs: &HashMap<String, String>, key: &str, node: &str) -> Result<u64> {
    optional_number(attrs, key, node)?.ok_or_else(|| anyhow!("Missing {key} on {node}"))
}
