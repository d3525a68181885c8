use crate::models::config_validator::validate_config;
use crate::models::error::{LogStoreError, Result};
use crate::models::level::Level;
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Which destinations a logger writes to.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    pub system: String,
    #[serde(default = "bool_true")]
    pub console: bool,
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Location of the SQLite log store, `":memory:"` for a private in-memory one.
    #[serde(default)]
    pub store: Option<String>,
    /// When set, `log` crate macros at or above this level are routed into the logger.
    #[serde(default)]
    pub bridge_level: Option<Level>,
}

const fn bool_true() -> bool {
    true
}

impl LoggerConfig {
    pub fn new(system: impl Into<String>) -> Self {
        LoggerConfig {
            system: system.into(),
            console: true,
            file: None,
            store: None,
            bridge_level: None,
        }
    }
}

pub fn setup_config(config_file: impl Into<PathBuf>) -> Result<LoggerConfig> {
    let config_path = config_file.into();
    info!("Loading logger config from: {}", config_path.display());

    let config_str =
        fs::read_to_string(&config_path).map_err(|cause| LogStoreError::ConfigRead {
            path: config_path.clone(),
            cause,
        })?;

    let config: LoggerConfig =
        serde_json::from_str(&config_str).map_err(|cause| LogStoreError::ConfigParse {
            path: config_path,
            cause,
        })?;

    validate_config(&config)?;

    Ok(config)
}
