//! Preview how many jobs of a given shape fit on an HTCondor pool and how
//! long a batch of them takes to drain.
//!
//! The matching engine in [`core`] is a pure function of a pool snapshot and a
//! job request. The remaining modules turn files and strings into those
//! inputs.

pub mod config;
pub mod core;
pub mod pool;
pub mod submit;
pub mod utils;
