use crate::models::config::LoggerConfig;
use crate::models::error::Result;
use crate::repo::sqlite::SqliteStore;
use crate::models::log_record::LogRecord;
use crate::service::destination::{ConsoleDestination, Destination, FileDestination};
use crate::service::formatter::{DefaultFormatter, Formatter};
use crate::service::logger::Logger;
use crate::utils::log_bridge::init_log_bridge;
use log::{info, warn};
use std::sync::Arc;

/// A logger built from a [`LoggerConfig`], plus a handle to its store for queries.
pub struct ConfiguredLogger {
    pub logger: Arc<Logger>,
    pub store: Option<Arc<SqliteStore>>,
}

/// Opens every configured destination. Any destination that cannot be
/// created fails the whole setup.
pub fn build_logger(config: &LoggerConfig) -> Result<ConfiguredLogger> {
    build_logger_with_formatter(config, DefaultFormatter)
}

/// Like [`build_logger`], with `formatter` rendering console and file output.
/// It also becomes the logger's own [`Logger::formatter`].
pub fn build_logger_with_formatter(
    config: &LoggerConfig,
    formatter: impl Formatter + 'static,
) -> Result<ConfiguredLogger> {
    let formatter: Arc<dyn Formatter> = Arc::new(formatter);
    let shared = || {
        let formatter = Arc::clone(&formatter);
        move |record: &LogRecord| formatter.format(record)
    };
    let mut destinations: Vec<Arc<dyn Destination>> = Vec::new();

    if config.console {
        destinations.push(Arc::new(ConsoleDestination::with_formatter(shared())));
    }

    if let Some(path) = &config.file {
        destinations.push(Arc::new(FileDestination::with_formatter(path, shared())?));
        info!("Logging to file: {}", path.display());
    }

    let store = match &config.store {
        Some(location) => {
            let store = Arc::new(SqliteStore::open(location)?);
            destinations.push(store.clone());
            Some(store)
        }
        None => None,
    };

    let logger = Arc::new(Logger::with_shared_formatter(
        config.system.as_str(),
        destinations,
        formatter,
    ));

    if let Some(level) = config.bridge_level {
        if let Err(e) = init_log_bridge(Arc::clone(&logger), level.into()) {
            warn!("Could not route log macros into '{}': {}", config.system, e);
        }
    }

    Ok(ConfiguredLogger { logger, store })
}
