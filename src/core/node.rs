use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Capacity of one machine in the pool, as reported by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResources {
    pub name: String,
    pub cores: u32,
    /// RAM in bytes
    pub memory: u64,
    #[serde(default)]
    pub gpus: u32,
    /// Scratch disk in bytes
    #[serde(default)]
    pub disk: u64,
}

impl NodeResources {
    pub fn new(name: impl Into<String>, cores: u32, memory: u64) -> Self {
        Self {
            name: name.into(),
            cores,
            memory,
            gpus: 0,
            disk: 0,
        }
    }

    pub fn with_gpus(mut self, gpus: u32) -> Self {
        self.gpus = gpus;
        self
    }

    pub fn with_disk(mut self, disk: u64) -> Self {
        self.disk = disk;
        self
    }

    pub fn capacity(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Cores => u64::from(self.cores),
            Resource::Memory => self.memory,
            Resource::Gpus => u64::from(self.gpus),
            Resource::Disk => self.disk,
        }
    }
}

/// A schedulable resource dimension.
///
/// Iteration order is the tie-break order when two dimensions limit a node equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
    Cores,
    Memory,
    Gpus,
    Disk,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_gpus_and_disk_default_to_zero() {
        let node: NodeResources =
            serde_json::from_str(r#"{"name":"n1","cores":8,"memory":1024}"#).unwrap();
        assert_eq!(node, NodeResources::new("n1", 8, 1024));
    }

    #[test]
    fn resource_displays_lowercase() {
        assert_eq!(Resource::Gpus.to_string(), "gpus");
        assert_eq!(Resource::Memory.to_string(), "memory");
    }
}
