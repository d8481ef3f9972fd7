//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.access-metrics.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".access-metrics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Document store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Review validation settings.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log at debug level unless `--quiet` is given.
    #[serde(default)]
    pub verbose: bool,
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding facilities, reviews and access tags.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Attempts at writing a facility summary before giving up on
    /// concurrent modifications.
    #[serde(default = "default_max_write_retries")]
    pub max_write_retries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            max_write_retries: default_max_write_retries(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("access_metrics.json")
}

fn default_max_write_retries() -> usize {
    5
}

/// Review validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject reviews that leave any category unrated.
    #[serde(default = "default_true")]
    pub require_all_ratings: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_all_ratings: true,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output format for `show`.
    #[serde(default)]
    pub format: OutputFormat,

    /// Number of most recent reviews listed in a facility report.
    #[serde(default = "default_recent_reviews")]
    pub recent_reviews: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            recent_reviews: default_recent_reviews(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_recent_reviews() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.store.data_file = data.clone();
        }

        if args.allow_partial_ratings {
            self.validation.require_all_ratings = false;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
