use crate::core::node::Resource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The shape of one job plus how many of them should run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub cores: u32,
    /// RAM per job in bytes
    pub memory: u64,
    pub gpus: u32,
    /// Disk per job in bytes
    pub disk: u64,
    pub jobs: u32,
    /// Wall time of a single job
    pub duration: Option<Duration>,
    /// Cap on how many distinct nodes may be used at once (node-locked licences)
    pub max_nodes: Option<u32>,
}

impl JobRequest {
    pub fn builder() -> JobRequestBuilder {
        JobRequestBuilder::new()
    }

    pub fn requested(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Cores => u64::from(self.cores),
            Resource::Memory => self.memory,
            Resource::Gpus => u64::from(self.gpus),
            Resource::Disk => self.disk,
        }
    }
}

#[derive(Debug, Default)]
pub struct JobRequestBuilder {
    cores: u32,
    memory: u64,
    gpus: u32,
    disk: u64,
    jobs: u32,
    duration: Option<Duration>,
    max_nodes: Option<u32>,
}

impl JobRequestBuilder {
    pub fn new() -> Self {
        Self {
            jobs: 1, // A single job unless told otherwise
            ..Default::default()
        }
    }

    pub fn cores(mut self, cores: u32) -> Self {
        self.cores = cores;
        self
    }

    pub fn memory(mut self, memory: u64) -> Self {
        self.memory = memory;
        self
    }

    pub fn gpus(mut self, gpus: u32) -> Self {
        self.gpus = gpus;
        self
    }

    pub fn disk(mut self, disk: u64) -> Self {
        self.disk = disk;
        self
    }

    pub fn jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    pub fn max_nodes(mut self, max_nodes: Option<u32>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn build(self) -> JobRequest {
        JobRequest {
            cores: self.cores,
            memory: self.memory,
            gpus: self.gpus,
            disk: self.disk,
            jobs: self.jobs,
            duration: self.duration,
            max_nodes: self.max_nodes,
        }
    }
}

/// A partially specified request, as read from one source (command line, submit file).
///
/// Sources are layered with [`RequestOptions::or`] and turned into a
/// [`JobRequest`] with [`RequestOptions::resolve`]. Quantities are already in
/// canonical units here; string parsing happens before this point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub cpus: Option<u32>,
    pub memory: Option<u64>,
    pub gpus: Option<u32>,
    pub disk: Option<u64>,
    pub jobs: Option<u32>,
    pub duration: Option<Duration>,
    pub max_nodes: Option<u32>,
}

impl RequestOptions {
    /// Keeps every value set on `self` and takes the rest from `fallback`.
    pub fn or(self, fallback: RequestOptions) -> Self {
        Self {
            cpus: self.cpus.or(fallback.cpus),
            memory: self.memory.or(fallback.memory),
            gpus: self.gpus.or(fallback.gpus),
            disk: self.disk.or(fallback.disk),
            jobs: self.jobs.or(fallback.jobs),
            duration: self.duration.or(fallback.duration),
            max_nodes: self.max_nodes.or(fallback.max_nodes),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fills unset fields with their defaults. Validation is left to the estimator.
    pub fn resolve(self) -> JobRequest {
        let mut builder = JobRequest::builder()
            .cores(self.cpus.unwrap_or(0))
            .memory(self.memory.unwrap_or(0))
            .gpus(self.gpus.unwrap_or(0))
            .disk(self.disk.unwrap_or(0))
            .duration(self.duration)
            .max_nodes(self.max_nodes);
        if let Some(jobs) = self.jobs {
            builder = builder.jobs(jobs);
        }
        builder.build()
    }
}
