pub mod config;
pub mod config_validator;
pub mod error;
pub mod level;
pub mod log_record;
pub mod log_row;
