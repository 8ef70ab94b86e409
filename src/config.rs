//! # Configuration Management
//!
//! This module loads and saves `selector-config.toml`. The file holds the
//! persisted selection condition (the settings a history screen restores on
//! launch) and the location of the sample store.
//!
//! ## Settings rules
//! - `interval_sec` wins; a legacy `interval_ms` is read as whole seconds when positive
//! - writes clamp `limit` to `[1, 20000]` and drop non-positive intervals
//! - every write clears the legacy `interval_ms` key
//! - an unknown `order` string reads as `OldestFirst`

use crate::condition::{Condition, SortOrder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "selector-config.toml";

const LIMIT_MIN: i32 = 1;
const LIMIT_MAX: i32 = 20_000;

/// Errors from reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config encode failed: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration loaded from selector-config.toml
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Persisted selection condition
    #[serde(default)]
    pub selector: SelectorSettings,
    /// Sample store location
    #[serde(default)]
    pub store: StoreConfig,
}

/// Sample store configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON file holding an ascending array of samples
    pub samples_path: String,
    /// Optional cap on rows returned per range query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            samples_path: "samples.json".to_string(),
            max_rows: None,
        }
    }
}

/// Persisted form of a [`Condition`].
///
/// Absent keys mean "unset". `order` is kept as a string so a hand-edited or
/// outdated value degrades to the default instead of failing the whole file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectorSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_millis: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_millis: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_sec: Option<i64>,
    /// Interval in milliseconds, written by older versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_accuracy: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

impl SelectorSettings {
    /// Decode the stored keys into a condition.
    pub fn condition(&self) -> Condition {
        let interval_sec = self.interval_sec.or_else(|| {
            self.interval_ms
                .map(|ms| ms / 1_000)
                .filter(|&sec| sec > 0)
        });

        Condition {
            from_millis: self.from_millis,
            to_millis: self.to_millis,
            interval_sec,
            limit: self.limit,
            min_accuracy: self.min_accuracy,
            order: SortOrder::parse_or_default(self.order.as_deref()),
        }
    }

    /// Replace the stored condition with `block(current)`, applying write rules.
    pub fn update<F>(&mut self, block: F)
    where
        F: FnOnce(Condition) -> Condition,
    {
        let next = block(self.condition());
        *self = SelectorSettings {
            from_millis: next.from_millis,
            to_millis: next.to_millis,
            interval_sec: next.interval_sec.filter(|&sec| sec > 0),
            interval_ms: None,
            limit: next.limit.map(|n| n.clamp(LIMIT_MIN, LIMIT_MAX)),
            min_accuracy: next.min_accuracy,
            order: Some(next.order.as_str().to_string()),
        };
    }

    pub fn set_from_to(&mut self, from_millis: Option<i64>, to_millis: Option<i64>) {
        self.update(|c| Condition {
            from_millis,
            to_millis,
            ..c
        });
    }

    pub fn set_limit(&mut self, limit: Option<i32>) {
        self.update(|c| Condition { limit, ..c });
    }

    pub fn set_min_accuracy(&mut self, min_accuracy: Option<f32>) {
        self.update(|c| Condition { min_accuracy, ..c });
    }

    pub fn set_interval_sec(&mut self, interval_sec: Option<i64>) {
        self.update(|c| Condition { interval_sec, ..c });
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.update(|c| Condition { order, ..c });
    }

    pub fn clear_all(&mut self) {
        *self = SelectorSettings::default();
    }
}

impl Config {
    /// Load configuration from selector-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => {
                info!(
                    path = %path.as_ref().display(),
                    samples = %config.store.samples_path,
                    "loaded configuration"
                );
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.as_ref().display(), "no config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.as_ref().display(), error = %e, "invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration, reporting any failure to the caller.
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str::<Config>(&contents)?)
    }

    /// Save current configuration to selector-config.toml
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(CONFIG_FILE)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
