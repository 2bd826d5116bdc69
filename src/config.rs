//! Configuration loader - built-in defaults, .env / environment, then CLI overrides

use crate::data::CachePolicy;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DATA_PATH: &str = "data/Motor_Vehicle_Collisions_-_Crashes.csv";
pub const DEFAULT_MAX_ROWS: usize = 100_000;

pub const ENV_DATA_PATH: &str = "COLLISIONS_CSV";
pub const ENV_MAX_ROWS: &str = "COLLISIONS_MAX_ROWS";
pub const ENV_RELOAD_ON_CHANGE: &str = "COLLISIONS_RELOAD_ON_CHANGE";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Everything the dashboard needs before the first load.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub max_rows: usize,
    pub cache_policy: CachePolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            max_rows: DEFAULT_MAX_ROWS,
            cache_policy: CachePolicy::default(),
        }
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

impl DashboardConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATA_PATH).filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path.trim());
        }
        if let Some(value) = lookup(ENV_MAX_ROWS) {
            let parsed = value.trim().replace('_', "").parse();
            config.max_rows = parsed.map_err(|_| ConfigError::InvalidValue {
                key: ENV_MAX_ROWS,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_RELOAD_ON_CHANGE) {
            config.cache_policy.reload_on_change = parse_flag(ENV_RELOAD_ON_CHANGE, &value)?;
        }

        Ok(config)
    }

    /// Apply command line flags on top.
    pub fn with_overrides(
        mut self,
        data_path: Option<PathBuf>,
        max_rows: Option<usize>,
        no_reload_on_change: bool,
    ) -> Self {
        if let Some(path) = data_path {
            self.data_path = path;
        }
        if let Some(max_rows) = max_rows {
            self.max_rows = max_rows;
        }
        if no_reload_on_change {
            self.cache_policy.reload_on_change = false;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.max_rows, 100_000);
        assert!(config.cache_policy.reload_on_change);
    }

    #[test]
    fn test_environment_values() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (ENV_DATA_PATH, "/data/crashes.csv"),
            (ENV_MAX_ROWS, "250_000"),
            (ENV_RELOAD_ON_CHANGE, "off"),
        ]))
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("/data/crashes.csv"));
        assert_eq!(config.max_rows, 250_000);
        assert!(!config.cache_policy.reload_on_change);
    }

    #[test]
    fn test_malformed_values_rejected() {
        let err = DashboardConfig::from_lookup(lookup(&[(ENV_MAX_ROWS, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_MAX_ROWS,
                value: "lots".to_string()
            }
        );
        assert!(DashboardConfig::from_lookup(lookup(&[(ENV_RELOAD_ON_CHANGE, "maybe")])).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = DashboardConfig::default().with_overrides(
            Some(PathBuf::from("other.csv")),
            Some(10),
            true,
        );
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.max_rows, 10);
        assert!(!config.cache_policy.reload_on_change);
    }
}
