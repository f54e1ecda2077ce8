//! Threshold configuration loading and validation.
//!
//! Configuration is loaded from multiple sources with the following
//! precedence (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`QUERY_SHERIFF_*`)
//! 3. `.query-sheriff.toml` in current directory
//! 4. `~/.config/query-sheriff/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [thresholds]
//! slow_query_threshold = 0.5     # seconds
//! offset_threshold = 500         # rows
//! lock_threshold = 5.0           # seconds
//! transaction_threshold = 5.0    # seconds
//! small_table_threshold = 100    # rows
//!
//! # Optional row-count estimates for the repeated-filter detector.
//! # The core never queries the database; supply estimates here.
//! [tables]
//! currencies = 12
//! feature_flags = 40
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `QUERY_SHERIFF_SLOW_QUERY_THRESHOLD` | Slow query cutoff in seconds |
//! | `QUERY_SHERIFF_OFFSET_THRESHOLD` | Largest acceptable OFFSET |
//! | `QUERY_SHERIFF_LOCK_THRESHOLD` | Lock duration cutoff in seconds |
//! | `QUERY_SHERIFF_TRANSACTION_THRESHOLD` | Transaction duration cutoff |
//! | `QUERY_SHERIFF_SMALL_TABLE_THRESHOLD` | Row count under which a table is small |

use std::{collections::HashMap, env, fs, path::PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, invalid_config_error};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Externally supplied table row-count estimates, keyed by table name
    #[serde(default)]
    pub tables:     HashMap<String, u64>
}

/// Numeric thresholds applied during one inspection pass.
///
/// Read-only to the detectors; safe to share across concurrent passes.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    /// Queries slower than this many seconds are flagged (strict `>`)
    #[serde(default = "default_slow_query")]
    pub slow_query_threshold:  f64,
    /// OFFSET values above this many rows are flagged
    #[serde(default = "default_offset")]
    pub offset_threshold:      u64,
    /// Locking statements held longer than this many seconds are flagged
    #[serde(default = "default_lock")]
    pub lock_threshold:        f64,
    /// Transactions whose cumulative duration exceeds this are flagged
    #[serde(default = "default_transaction")]
    pub transaction_threshold: f64,
    /// Tables with fewer rows than this are considered small
    #[serde(default = "default_small_table")]
    pub small_table_threshold: u64
}

fn default_slow_query() -> f64 {
    0.5
}

fn default_offset() -> u64 {
    500
}

fn default_lock() -> f64 {
    5.0
}

fn default_transaction() -> f64 {
    5.0
}

fn default_small_table() -> u64 {
    100
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold:  default_slow_query(),
            offset_threshold:      default_offset(),
            lock_threshold:        default_lock(),
            transaction_threshold: default_transaction(),
            small_table_threshold: default_small_table()
        }
    }
}

impl ThresholdConfig {
    /// Validate all thresholds before an inspection pass.
    ///
    /// Thresholds are pass-wide, so a single bad value fails the whole call
    /// before any detector runs.
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("slow_query_threshold", self.slow_query_threshold),
            ("lock_threshold", self.lock_threshold),
            ("transaction_threshold", self.transaction_threshold)
        ] {
            if !value.is_finite() {
                return Err(invalid_config_error(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
            if value < 0.0 {
                return Err(invalid_config_error(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.query-sheriff.toml)
    /// 3. Config file in home directory (~/.config/query-sheriff/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("query-sheriff")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".query-sheriff.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env()?;
        Ok(config)
    }

    fn from_file(path: &PathBuf) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| invalid_config_error(format!("Failed to read config file: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| invalid_config_error(format!("Invalid config file: {}", e)))
    }

    /// Override thresholds from `QUERY_SHERIFF_*` environment variables
    fn apply_env(&mut self) -> AppResult<()> {
        if let Some(v) = env_f64("QUERY_SHERIFF_SLOW_QUERY_THRESHOLD")? {
            self.thresholds.slow_query_threshold = v;
        }
        if let Some(v) = env_u64("QUERY_SHERIFF_OFFSET_THRESHOLD")? {
            self.thresholds.offset_threshold = v;
        }
        if let Some(v) = env_f64("QUERY_SHERIFF_LOCK_THRESHOLD")? {
            self.thresholds.lock_threshold = v;
        }
        if let Some(v) = env_f64("QUERY_SHERIFF_TRANSACTION_THRESHOLD")? {
            self.thresholds.transaction_threshold = v;
        }
        if let Some(v) = env_u64("QUERY_SHERIFF_SMALL_TABLE_THRESHOLD")? {
            self.thresholds.small_table_threshold = v;
        }
        Ok(())
    }
}

fn env_f64(name: &str) -> AppResult<Option<f64>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid_config_error(format!("{} is not a number: '{}'", name, raw))),
        Err(_) => Ok(None)
    }
}

fn env_u64(name: &str) -> AppResult<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| {
                invalid_config_error(format!("{} is not a non-negative integer: '{}'", name, raw))
            }),
        Err(_) => Ok(None)
    }
}
