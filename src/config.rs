//! Configuration loading
//!
//! Settings come from a TOML file (explicit path, else
//! `~/.fool-exchange/config.toml`), falling back to defaults. The rate API key
//! can be supplied through the `FIXER_API_KEY` environment variable, which
//! wins over the file.

use crate::error::{ExchangeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `rates.api_key`
pub const API_KEY_ENV: &str = "FIXER_API_KEY";

/// Default historical rate endpoint
pub const DEFAULT_RATE_BASE_URL: &str = "http://data.fixer.io/api";

/// Default cache lifetime; the provider refreshes historical data daily
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

/// Longest accepted cache lifetime (ten years)
pub const MAX_CACHE_TTL_HOURS: i64 = 24 * 366 * 10;

/// Where cached rates live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Sqlite,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_seed_file")]
    pub seed_file: PathBuf,
    #[serde(default)]
    pub table_prefix: String,
    #[serde(default)]
    pub rates: RatesConfig,
}

/// Historical rate API and cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,
    #[serde(default = "default_cache_backend")]
    pub cache: CacheBackend,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fool-exchange")
}

fn default_database_path() -> PathBuf {
    home_dir().join("exchange.db")
}

fn default_seed_file() -> PathBuf {
    PathBuf::from("assets").join("initial-data.csv")
}

fn default_base_url() -> String {
    DEFAULT_RATE_BASE_URL.to_string()
}

fn default_cache_ttl_hours() -> i64 {
    DEFAULT_CACHE_TTL_HOURS
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Sqlite
}

fn default_cache_path() -> PathBuf {
    home_dir().join("rate-cache.db")
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            cache_ttl_hours: default_cache_ttl_hours(),
            cache: default_cache_backend(),
            cache_path: default_cache_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            seed_file: default_seed_file(),
            table_prefix: String::new(),
            rates: RatesConfig::default(),
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        home_dir().join("config.toml")
    }

    /// Parse a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ExchangeError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just yields defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(config_path) => {
                if !config_path.exists() {
                    return Err(ExchangeError::ConfigError(format!(
                        "Config file not found: {}",
                        config_path.display()
                    )));
                }
                Self::from_toml(&fs::read_to_string(config_path)?)?
            }
            None => {
                let default_config = Self::default_path();
                if default_config.exists() {
                    log::debug!("Loading config from {}", default_config.display());
                    Self::from_toml(&fs::read_to_string(&default_config)?)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.rates.api_key = key.trim().to_string();
            }
        }
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_CACHE_TTL_HOURS).contains(&self.rates.cache_ttl_hours) {
            return Err(ExchangeError::ConfigError(format!(
                "rates.cache_ttl_hours must be between 0 and {}, got {}",
                MAX_CACHE_TTL_HOURS, self.rates.cache_ttl_hours
            )));
        }
        if !self
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ExchangeError::ConfigError(format!(
                "table_prefix may only contain ASCII letters, digits and '_': {:?}",
                self.table_prefix
            )));
        }
        Ok(())
    }

    /// Cache lifetime as a chrono duration, clamped to the accepted range
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.rates.cache_ttl_hours.clamp(0, MAX_CACHE_TTL_HOURS))
    }

    /// Create parent directories for the database and cache files
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for path in [&self.database_path, &self.rates.cache_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }
        Ok(())
    }
}
