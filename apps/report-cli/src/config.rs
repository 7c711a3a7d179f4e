//! # Report Configuration
//!
//! Where to fetch from and how to shape the output.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLER_API_URL=http://192.168.1.20:3000/api                        │
//! │     TALLER_API_TIMEOUT_SECS=10                                         │
//! │     TALLER_CHART_LIMIT=10                                              │
//! │     TALLER_CURRENCY_SYMBOL=$                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/taller/report.toml (Linux)                               │
//! │     ~/Library/Application Support/com.taller.taller/report.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:3000/api, 30 s, no chart limit, "$"               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # report.toml
//! [api]
//! base_url = "http://localhost:3000/api"
//! timeout_secs = 30
//!
//! [output]
//! chart_limit = 10
//! currency_symbol = "$"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// API Settings
// =============================================================================

/// Console API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL; resource paths (`compras`, `insumos`, ...) are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// =============================================================================
// Output Settings
// =============================================================================

/// Output shaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Maximum bars per chart. Unset means every ranked entity.
    #[serde(default)]
    pub chart_limit: Option<usize>,

    /// Prefix for money values in export rows.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            chart_limit: None,
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Report Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

impl ReportConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path` if given (must exist), otherwise the
    ///    platform default path (optional)
    /// 3. Environment variables
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Reads a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading report config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidUrl {
                url: self.api.base_url.clone(),
                reason: "base_url is empty".to_string(),
            });
        }

        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.api.base_url.clone(),
                reason: format!("expected http or https, got {}", parsed.scheme()),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.output.chart_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "chart_limit must be greater than 0 when set".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup` (an environment-like key/value source).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TALLER_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("TALLER_API_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric TALLER_API_TIMEOUT_SECS"),
            }
        }

        if let Some(limit) = lookup("TALLER_CHART_LIMIT") {
            match limit.trim().parse::<usize>() {
                Ok(n) => self.output.chart_limit = Some(n),
                Err(_) => warn!(value = %limit, "Ignoring non-numeric TALLER_CHART_LIMIT"),
            }
        }

        if let Some(symbol) = lookup("TALLER_CURRENCY_SYMBOL") {
            self.output.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "taller", "taller")
            .map(|dirs| dirs.config_dir().join("report.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.output.chart_limit, None);
        assert_eq!(config.output.currency_symbol, "$");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
            [output]
            chart_limit = 5
            "#,
        );

        let config = ReportConfig::from_file(file.path()).unwrap();
        assert_eq!(config.output.chart_limit, Some(5));
        assert_eq!(config.output.currency_symbol, "$");
        assert_eq!(config.api, ApiSettings::default());
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r#"
            [api]
            base_url = "https://taller.example.com/api"
            timeout_secs = 5

            [output]
            currency_symbol = "Q"
            "#,
        );

        let config = ReportConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://taller.example.com/api");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.output.currency_symbol, "Q");
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("[api\nbase_url = ");
        assert!(matches!(
            ReportConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            ReportConfig::load(Some(missing.as_path())),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_overrides_take_priority() {
        let env: HashMap<&str, &str> = [
            ("TALLER_API_URL", "http://10.0.0.2:3000/api"),
            ("TALLER_API_TIMEOUT_SECS", "12"),
            ("TALLER_CHART_LIMIT", "3"),
            ("TALLER_CURRENCY_SYMBOL", "€"),
        ]
        .into_iter()
        .collect();

        let mut config = ReportConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://10.0.0.2:3000/api");
        assert_eq!(config.api.timeout_secs, 12);
        assert_eq!(config.output.chart_limit, Some(3));
        assert_eq!(config.output.currency_symbol, "€");
    }

    #[test]
    fn test_non_numeric_overrides_are_ignored() {
        let mut config = ReportConfig::default();
        config.apply_overrides(|key| match key {
            "TALLER_API_TIMEOUT_SECS" => Some("soon".to_string()),
            "TALLER_CHART_LIMIT" => Some("all".to_string()),
            _ => None,
        });

        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.output.chart_limit, None);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ReportConfig::default();
        assert!(config.validate().is_ok());

        config.api.base_url = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { .. })));

        config.api.base_url = "localhost:3000".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { .. })));

        config.api.base_url = "http://localhost:3000/api".to_string();
        config.api.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        config.api.timeout_secs = 30;
        config.output.chart_limit = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ReportConfig::default()).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[output]"));
    }
}
