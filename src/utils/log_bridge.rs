use crate::models::level::Level;
use crate::models::log_record::Source;
use crate::service::codec::StructuredValue;
use crate::service::logger::Logger;
use log::{LevelFilter, Log, Metadata, Record};
use std::sync::Arc;

/// Target prefix of this crate's own diagnostics. They are never routed back
/// into a `Logger`, otherwise a failing destination would log forever.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Adapter that lets `log::info!` and friends write through a [`Logger`].
pub struct LogBridge {
    level: LevelFilter,
    logger: Arc<Logger>,
}

impl LogBridge {
    pub fn new(logger: Arc<Logger>, level: LevelFilter) -> Self {
        LogBridge { level, logger }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && !metadata.target().starts_with(OWN_TARGET)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let source = Source::new(
            record.module_path().unwrap_or_else(|| record.target()),
            record.file().unwrap_or("<unknown>"),
            record.line().unwrap_or(0),
        );

        self.logger.log(
            Level::from(record.level()),
            record.args().to_string(),
            source,
            StructuredValue::Null,
        );
    }

    fn flush(&self) {}
}

/// Installs a [`LogBridge`] as the global `log` implementation.
pub fn init_log_bridge(logger: Arc<Logger>, level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let bridge = LogBridge::new(logger, level);
    log::set_boxed_logger(Box::new(bridge))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::log_record::LogRecord;
    use crate::service::destination::Destination;
    use serial_test::serial;
    use std::sync::Mutex;

    fn collecting_logger() -> (Arc<Mutex<Vec<LogRecord>>>, Arc<Logger>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let destination: Arc<dyn Destination> =
            Arc::new(move |record: &LogRecord| sink.lock().unwrap().push(record.clone()));
        (seen, Arc::new(Logger::new("co.example.bridge", vec![destination])))
    }

    #[test]
    fn test_bridge_forwards_records() {
        let (seen, logger) = collecting_logger();
        let bridge = LogBridge::new(logger, LevelFilter::Debug);

        bridge.log(
            &Record::builder()
                .args(format_args!("connected to {}", "db-1"))
                .level(log::Level::Warn)
                .target("app::db")
                .module_path(Some("app::db"))
                .file(Some("src/db.rs"))
                .line(Some(31))
                .build(),
        );

        let records = seen.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Warning);
        assert_eq!(records[0].message, "connected to db-1");
        assert_eq!(records[0].function, "app::db");
        assert_eq!(records[0].file, "src/db.rs");
        assert_eq!(records[0].line, 31);
        assert_eq!(records[0].system, "co.example.bridge");
        assert!(records[0].context.is_null());
    }

    #[test]
    fn test_bridge_respects_level_filter() {
        let (seen, logger) = collecting_logger();
        let bridge = LogBridge::new(logger, LevelFilter::Info);

        bridge.log(
            &Record::builder()
                .args(format_args!("too chatty"))
                .level(log::Level::Debug)
                .target("app")
                .build(),
        );

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(bridge.level(), LevelFilter::Info);
    }

    #[test]
    fn test_bridge_ignores_own_diagnostics() {
        let (seen, logger) = collecting_logger();
        let bridge = LogBridge::new(logger, LevelFilter::Trace);

        bridge.log(
            &Record::builder()
                .args(format_args!("Dropping log record"))
                .level(log::Level::Warn)
                .target(module_path!())
                .build(),
        );

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_location_defaults() {
        let (seen, logger) = collecting_logger();
        let bridge = LogBridge::new(logger, LevelFilter::Trace);

        bridge.log(
            &Record::builder()
                .args(format_args!("bare"))
                .level(log::Level::Trace)
                .target("external")
                .build(),
        );

        let records = seen.lock().unwrap();
        assert_eq!(records[0].level, Level::Verbose);
        assert_eq!(records[0].function, "external");
        assert_eq!(records[0].file, "<unknown>");
        assert_eq!(records[0].line, 0);
    }

    #[test]
    #[serial]
    fn test_init_log_bridge_routes_log_macros() {
        let (seen, logger) = collecting_logger();
        if init_log_bridge(logger, LevelFilter::Info).is_err() {
            // another global logger already owns the facade
            return;
        }

        log::info!(target: "app::startup", "ready in {}ms", 12);

        let records = seen.lock().unwrap();
        let startup: Vec<&LogRecord> = records
            .iter()
            .filter(|r| r.message == "ready in 12ms")
            .collect();
        assert_eq!(startup.len(), 1);
        assert_eq!(startup[0].level, Level::Info);
        assert!(startup[0].function.ends_with("log_bridge::tests"));
    }
}
