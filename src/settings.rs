//! Runtime settings.
//!
//! Settings load from an optional file plus environment variables with
//! the `STATWATCH_` prefix, environment taking precedence:
//!
//! - `STATWATCH_DATA_DIR`: directory holding the per-year history documents (default: "data")
//! - `STATWATCH_VALUES_FILE`: JSON document the observation source reads (default: "values.json")
//! - `STATWATCH_INTERVAL_SECS`: seconds between ticks (default: 300)
//! - `STATWATCH_CHAT_IDS`: comma-separated notification destinations (default: none)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Runtime settings for the watcher daemon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the per-year history documents.
    pub data_dir: PathBuf,
    /// JSON document the observation source reads each tick.
    pub values_file: PathBuf,
    /// Seconds between ticks.
    pub interval_secs: u64,
    /// Notification destinations.
    pub chat_ids: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            values_file: PathBuf::from("values.json"),
            interval_secs: 300,
            chat_ids: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("STATWATCH")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("chat_ids"),
            )
            .build()
            .context("building configuration")?;
        config.try_deserialize().context("deserializing configuration")
    }
}
