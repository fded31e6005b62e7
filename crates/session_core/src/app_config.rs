use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "GRADER";
const DEFAULT_CONFIG_STEM: &str = "grader";
const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime configuration shared by the terminal and desktop front ends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraderConfig {
    /// Where category labels and the research question are persisted.
    pub settings_path: PathBuf,
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Fixed seed for the row draw order.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            seed: None,
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("abstract_grader"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("settings.toml")
}

/// Layers built-in defaults, then `grader.toml` from the working directory
/// (or `config_file` when given, which must exist), then `GRADER__*`
/// environment variables.
pub fn load_config(config_file: Option<&Path>) -> anyhow::Result<GraderConfig> {
    load_config_with_prefix(config_file, ENV_PREFIX)
}

pub fn load_config_with_prefix(
    config_file: Option<&Path>,
    env_prefix: &str,
) -> anyhow::Result<GraderConfig> {
    let defaults = GraderConfig::default();

    let file_source = match config_file {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_STEM).required(false),
    };

    let config = Config::builder()
        .set_default(
            "settings_path",
            defaults.settings_path.to_string_lossy().into_owned(),
        )?
        .set_default("log_filter", defaults.log_filter)?
        .add_source(file_source)
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to assemble grader configuration")?;

    config
        .try_deserialize::<GraderConfig>()
        .context("invalid grader configuration")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
