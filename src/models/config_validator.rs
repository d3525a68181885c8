use crate::models::config::LoggerConfig;
use crate::models::error::{LogStoreError, Result};
use log::{info, warn};
use std::path::Path;

/// Validates the entire configuration
pub fn validate_config(config: &LoggerConfig) -> Result<()> {
    info!("Validating logger configuration...");

    validate_system(&config.system)?;

    if let Some(file) = &config.file {
        validate_parent_directory("log file", file)?;
    }

    if let Some(store) = &config.store {
        validate_store_location(store)?;
    }

    if !config.console && config.file.is_none() && config.store.is_none() {
        warn!(
            "Logger '{}' has no destinations configured; every record will be discarded",
            config.system
        );
    }

    info!("Logger configuration validation passed");
    Ok(())
}

fn validate_system(system: &str) -> Result<()> {
    if system.trim().is_empty() {
        return Err(LogStoreError::ConfigInvalid(
            "system must be a non-empty name identifying the logger".to_string(),
        ));
    }
    Ok(())
}

fn validate_store_location(location: &str) -> Result<()> {
    if location.is_empty() || location == ":memory:" {
        return Ok(());
    }
    validate_parent_directory("log store", Path::new(location))
}

fn validate_parent_directory(what: &str, path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(LogStoreError::ConfigInvalid(format!(
            "{} path is a directory: {}",
            what,
            path.display()
        )));
    }

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            #[cfg(windows)]
            let suggestion = format!("mkdir \"{}\"", parent.display());
            #[cfg(not(windows))]
            let suggestion = format!("mkdir -p \"{}\"", parent.display());

            Err(LogStoreError::ConfigInvalid(format!(
                "{} parent directory does not exist: {}\nSuggestion: Create the parent directory with: {}",
                what,
                parent.display(),
                suggestion
            )))
        }
        _ => Ok(()),
    }
}
