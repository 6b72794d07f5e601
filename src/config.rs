use crate::core::get_config_dir;
use serde::Deserialize;
use std::path::PathBuf;
use strum::{Display, EnumString};

const ENV_PREFIX: &str = "HTCRYSTALBALL";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct PoolConfig {
    /// Snapshot used when `--pool` is not given (JSON or `condor_status -long` text)
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Colour table rows by whether the job fits (default: true)
    #[serde(default = "default_color")]
    pub color: bool,
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn default_color() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: default_color(),
        }
    }
}

/// Loads configuration from the default config file, an optional user file
/// and `HTCRYSTALBALL_*` environment variables, later sources winning.
///
/// Nested keys use a double underscore, e.g. `HTCRYSTALBALL_POOL__SNAPSHOT`.
pub fn load_config(config_path: Option<&PathBuf>) -> Result<Config, config::ConfigError> {
    let mut config_vec = vec![];

    // Default config file
    if let Ok(default_config_path) = get_config_dir().map(|d| d.join("htcrystalball.toml")) {
        if default_config_path.exists() {
            config_vec.push(default_config_path);
        }
    }

    // User-provided config file
    if let Some(config_path) = config_path {
        if config_path.exists() {
            config_vec.push(config_path.clone());
        } else {
            return Err(config::ConfigError::NotFound(format!(
                "Config file {config_path:?} does not exist",
            )));
        }
    }

    build_config(&config_vec, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build_config(
    files: &[PathBuf],
    env: config::Environment,
) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder();
    let settings = files.iter().fold(settings, |s, path| {
        tracing::debug!(path = %path.display(), "Adding config file");
        s.add_source(config::File::from(path.as_path()))
    });

    settings.add_source(env).build()?.try_deserialize()
}
