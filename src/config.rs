//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.joinmetrics.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".joinmetrics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// File locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Merge behaviour.
    #[serde(default)]
    pub merge: MergeConfig,
}

/// Locations of the aggregate and the metric sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Canonical aggregate document.
    #[serde(default = "default_aggregate")]
    pub aggregate: PathBuf,

    /// Directory scanned in folder mode.
    #[serde(default = "default_metrics_dir")]
    pub metrics_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            aggregate: default_aggregate(),
            metrics_dir: default_metrics_dir(),
        }
    }
}

fn default_aggregate() -> PathBuf {
    PathBuf::from("../data/data.json")
}

fn default_metrics_dir() -> PathBuf {
    PathBuf::from("metrics")
}

/// How metric files are recognised and persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Suffix of metric source files, stripped to form the metric name.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Save the aggregate after every file in folder mode.
    /// If false, the aggregate is saved once after the whole folder.
    #[serde(default = "default_true")]
    pub save_each: bool,

    /// Write indented JSON.
    #[serde(default)]
    pub pretty: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            save_each: true,
            pretty: false,
        }
    }
}

fn default_extension() -> String {
    crate::merge::DEFAULT_EXTENSION.to_string()
}

fn default_true() -> bool {
    true
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
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.joinmetrics.toml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref aggregate) = args.aggregate {
            self.paths.aggregate = aggregate.clone();
        }
        if let Some(ref metrics_dir) = args.metrics_dir {
            self.paths.metrics_dir = metrics_dir.clone();
        }
        if let Some(ref extension) = args.extension {
            self.merge.extension = extension.clone();
        }

        // Flags only ever switch away from the defaults
        if args.save_once {
            self.merge.save_each = false;
        }
        if args.pretty {
            self.merge.pretty = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
