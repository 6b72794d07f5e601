pub mod error;
pub mod estimate;
pub mod node;
pub mod request;

pub use error::EstimateError;
pub use estimate::{estimate, MatchResult, NodeMatch};
pub use node::{NodeResources, Resource};
pub use request::{JobRequest, JobRequestBuilder, RequestOptions};

use std::path::PathBuf;

const VERSION_MESSAGE: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_BUILD_TIMESTAMP"),
    ")\n",
    "Branch: ",
    env!("VERGEN_GIT_BRANCH"),
    "\nCommit: ",
    env!("VERGEN_GIT_SHA"),
);

pub fn version() -> &'static str {
    let author = clap::crate_authors!();

    Box::leak(Box::new(format!(
        "\
{VERSION_MESSAGE}
Authors: {author}"
    )))
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to get config directory"))
        .map(|p| p.join("htcrystalball"))
}

/// Where a pool snapshot is looked up when neither `--pool` nor the config names one.
pub fn default_snapshot_path() -> anyhow::Result<PathBuf> {
    get_config_dir().map(|d| d.join("slots.json"))
}
