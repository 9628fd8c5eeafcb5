use crate::scoring::IndicatorTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const DEFAULT_REFRESH_INTERVAL: &str = "1h";

/// Top-level configuration file.
///
/// Example YAML:
/// ```yaml
/// indicators:
///   - code: M2SL
///     name: M2 Money Supply
///     weight: 0.2
/// data: ~/liquidity/observations.json
/// log_level: info
/// refresh_interval: 15m
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub indicators: IndicatorTable,

    /// Observation file or directory written by the fetch job
    #[serde(default)]
    pub data: Option<String>,

    /// Default tracing filter when RUST_LOG is unset (e.g. "info")
    #[serde(default)]
    pub log_level: Option<String>,

    /// How often `watch` reloads observations (humantime, e.g. "15m")
    #[serde(default)]
    pub refresh_interval: Option<String>,
}

impl Config {
    /// Observation path from the config, with a leading `~/` expanded.
    pub fn data_path(&self) -> Option<PathBuf> {
        self.data.as_deref().map(expand_home)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn refresh_interval(&self) -> Result<Duration> {
        let raw = self
            .refresh_interval
            .as_deref()
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);
        humantime::parse_duration(raw)
            .with_context(|| format!("Invalid refresh_interval '{}'", raw))
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.indicators.len(), 6);
        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.refresh_interval().unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
indicators:
  - code: M2SL
    name: M2 Money Supply
    weight: 0.6
  - code: FEDFUNDS
    name: Federal Funds Rate
    weight: 0.4
    polarity: inverted
    description: Policy rate
data: /var/lib/liquidity/observations
log_level: debug
refresh_interval: 15m
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.indicators.len(), 2);
        assert_eq!(
            config.data_path(),
            Some(PathBuf::from("/var/lib/liquidity/observations"))
        );
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.refresh_interval().unwrap(), Duration::from_secs(900));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "queries: []\n";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_invalid_refresh_interval() {
        let config = Config {
            refresh_interval: Some("soon".to_string()),
            ..Config::default()
        };
        assert!(config.refresh_interval().is_err());
    }

    #[test]
    fn test_data_path_expands_home() {
        let config = Config {
            data: Some("~/obs.json".to_string()),
            ..Config::default()
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.data_path(), Some(home.join("obs.json")));
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            data: Some("obs.json".to_string()),
            ..Config::default()
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
