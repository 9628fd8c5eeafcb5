pub mod init;
mod schema;

pub use schema::{Config, DEFAULT_LOG_LEVEL, DEFAULT_REFRESH_INTERVAL};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/liquidity-score/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("liquidity-score")
}

/// Get the default config file path (~/.config/liquidity-score/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No file at the default path; built-in indicators in use
    BuiltIn(PathBuf),
}

impl ConfigSource {
    /// Report the source. Loading happens before the subscriber exists,
    /// so callers log this once tracing is initialised.
    pub fn log(&self, config: &Config) {
        match self {
            ConfigSource::File(path) => tracing::debug!(
                path = %path.display(),
                indicators = config.indicators.len(),
                "loaded config"
            ),
            ConfigSource::BuiltIn(path) => tracing::info!(
                "No config at {}, using built-in indicators",
                path.display()
            ),
        }
    }
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/liquidity-score/config.yaml) and falls back to the built-in
///   indicator table when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, ConfigSource)> {
    let explicit = path.is_some();
    load_from(path.unwrap_or_else(get_config_path), explicit)
}

fn load_from(config_path: PathBuf, explicit: bool) -> Result<(Config, ConfigSource)> {
    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok((Config::default(), ConfigSource::BuiltIn(config_path)));
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok((config, ConfigSource::File(config_path)))
}
