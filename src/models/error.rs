use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogStoreError {
    #[error("Failed to open or create log store '{location}': {cause}")]
    StoreOpen {
        location: String,
        cause: rusqlite::Error,
    },

    #[error("Failed to append log record {id}: {cause}")]
    Append { id: String, cause: rusqlite::Error },

    #[error("Failed to encode or decode context: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Log query failed for '{operation}': {cause}")]
    Query {
        operation: String,
        cause: rusqlite::Error,
    },

    #[error("Stored log row {id} is corrupt: {reason}")]
    Decode { id: String, reason: String },

    #[error("Log store is closed")]
    NotOpen,

    #[error("Failed to open log file '{path}': {cause}")]
    FileOpen { path: PathBuf, cause: io::Error },

    #[error("Failed to write log file '{path}': {cause}")]
    FileWrite { path: PathBuf, cause: io::Error },

    #[error("Failed to read config file '{path}': {cause}")]
    ConfigRead { path: PathBuf, cause: io::Error },

    #[error("Failed to parse config file '{path}': {cause}")]
    ConfigParse {
        path: PathBuf,
        cause: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Main logger not defined, call init_main() before using it")]
    MainLoggerNotSet,

    #[error("Main logger is already defined")]
    MainLoggerAlreadySet,
}

pub type Result<T> = std::result::Result<T, LogStoreError>;
