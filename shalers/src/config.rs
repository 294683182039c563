//! Configuration for Shale.
//!
//! TOML-based, with built-in defaults so the crate works with no config
//! file present.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShaleError};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShaleConfig {
    /// Dialect used when a caller does not name one.
    pub default_dialect: String,

    /// Embedded DuckDB harness options.
    pub duckdb: DuckDbConfig,
}

/// DuckDB harness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DuckDbConfig {
    /// Maximum concurrent engine calls (default: 16).
    pub max_concurrency: usize,
}

impl Default for ShaleConfig {
    fn default() -> Self {
        Self {
            default_dialect: "duckdb".to_string(),
            duckdb: DuckDbConfig::default(),
        }
    }
}

impl Default for DuckDbConfig {
    fn default() -> Self {
        Self { max_concurrency: 16 }
    }
}

impl ShaleConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ShaleError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ShaleError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `SHALE_CONFIG` environment variable
    /// 2. `./shale.toml` (current directory)
    /// 3. `~/.config/shale/config.toml` (user config dir)
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("SHALE_CONFIG") {
            if let Ok(cfg) = Self::from_file(&path) {
                tracing::info!(path = %path, "loaded config from SHALE_CONFIG");
                return cfg;
            }
        }

        if let Ok(cfg) = Self::from_file("shale.toml") {
            tracing::info!("loaded config from ./shale.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("shale").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ShaleConfig::default();
        assert_eq!(cfg.default_dialect, "duckdb");
        assert_eq!(cfg.duckdb.max_concurrency, 16);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
default_dialect = "postgres"

[duckdb]
max_concurrency = 4
"#;
        let cfg = ShaleConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.default_dialect, "postgres");
        assert_eq!(cfg.duckdb.max_concurrency, 4);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = ShaleConfig::from_toml("default_dialect = \"bigquery\"\n").unwrap();
        assert_eq!(cfg.default_dialect, "bigquery");
        assert_eq!(cfg.duckdb.max_concurrency, 16);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ShaleConfig::from_toml("default_dialect = [").unwrap_err();
        match err {
            ShaleError::Config(msg) => assert!(msg.contains("parse")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
