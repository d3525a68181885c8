//! Structured logging with pluggable destinations and a queryable SQLite store.
//!
//! ```ignore
//! use logstore::{json, Filter, Level, Logger, SqliteStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::open("logs.sqlite")?);
//! let logger = Logger::new("co.example.app", vec![store.clone()]);
//! logstore::info!(logger, context: json!({"user": 7}), "signed in");
//!
//! let errors = store.query(&[Filter::Level(Level::Error)])?;
//! ```

pub mod models;
pub mod repo;
pub mod service;
pub mod utils;

pub use models::config::{setup_config, LoggerConfig};
pub use models::error::{LogStoreError, Result};
pub use models::level::Level;
pub use models::log_record::{LogRecord, Source};
pub use repo::filter::{Condition, Filter, FilterValue};
pub use repo::sqlite::SqliteStore;
pub use serde_json::json;
pub use service::codec::StructuredValue;
pub use service::destination::{ConsoleDestination, Destination, FileDestination};
pub use service::formatter::{DefaultFormatter, Formatter};
pub use service::logger::{init_main, main, try_main, Logger};
pub use service::setup::{build_logger, build_logger_with_formatter, ConfiguredLogger};
pub use utils::log_bridge::{init_log_bridge, LogBridge};
