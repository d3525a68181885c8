use crate::models::error::{LogStoreError, Result};
use crate::models::level::Level;
use crate::models::log_record::{LogRecord, Source};
use crate::service::codec::StructuredValue;
use crate::service::destination::Destination;
use crate::service::formatter::{DefaultFormatter, Formatter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Fans every record out to its destinations, in order, on the calling thread.
#[derive(Clone)]
pub struct Logger {
    system: String,
    destinations: Vec<Arc<dyn Destination>>,
    // Destinations render with their own formatter; `build_logger` hands this
    // one to the console and file destinations it creates.
    formatter: Arc<dyn Formatter>,
}

impl Logger {
    pub fn new(system: impl Into<String>, destinations: Vec<Arc<dyn Destination>>) -> Self {
        Self::with_formatter(system, destinations, DefaultFormatter)
    }

    pub fn with_formatter(
        system: impl Into<String>,
        destinations: Vec<Arc<dyn Destination>>,
        formatter: impl Formatter + 'static,
    ) -> Self {
        Self::with_shared_formatter(system, destinations, Arc::new(formatter))
    }

    pub(crate) fn with_shared_formatter(
        system: impl Into<String>,
        destinations: Vec<Arc<dyn Destination>>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Logger {
            system: system.into(),
            destinations,
            formatter,
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn destinations(&self) -> &[Arc<dyn Destination>] {
        &self.destinations
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    /// Builds a record and delivers it to every destination. A destination
    /// that panics is reported and skipped; the rest still get the record.
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        source: Source,
        context: StructuredValue,
    ) {
        let record = LogRecord::new(level, message, source, context, self.system.as_str());
        self.dispatch(&record);
    }

    /// Delivers an already built record.
    pub fn dispatch(&self, record: &LogRecord) {
        for (idx, destination) in self.destinations.iter().enumerate() {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| destination.send(record)));
            if let Err(payload) = delivered {
                log::error!(
                    "Destination #{} of logger '{}' panicked: {}",
                    idx + 1,
                    self.system,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    pub fn verbose(&self, message: impl Into<String>, source: Source, context: StructuredValue) {
        self.log(Level::Verbose, message, source, context)
    }

    pub fn debug(&self, message: impl Into<String>, source: Source, context: StructuredValue) {
        self.log(Level::Debug, message, source, context)
    }

    pub fn info(&self, message: impl Into<String>, source: Source, context: StructuredValue) {
        self.log(Level::Info, message, source, context)
    }

    pub fn warning(&self, message: impl Into<String>, source: Source, context: StructuredValue) {
        self.log(Level::Warning, message, source, context)
    }

    pub fn error(&self, message: impl Into<String>, source: Source, context: StructuredValue) {
        self.log(Level::Error, message, source, context)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

static MAIN_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Installs the process-wide logger. Can only be done once.
pub fn init_main(logger: Logger) -> Result<()> {
    MAIN_LOGGER
        .set(logger)
        .map_err(|_| LogStoreError::MainLoggerAlreadySet)
}

pub fn try_main() -> Result<&'static Logger> {
    MAIN_LOGGER.get().ok_or(LogStoreError::MainLoggerNotSet)
}

/// The process-wide logger.
///
/// # Panics
///
/// Panics if [`init_main`] has not been called.
pub fn main() -> &'static Logger {
    match MAIN_LOGGER.get() {
        Some(logger) => logger,
        None => panic!("Main logger not defined, please define a main logger before using it."),
    }
}

/// Logs at an explicit level, capturing the call site.
///
/// ```ignore
/// logstore::log_at!(logger, Level::Info, "user {} signed in", id);
/// logstore::log_at!(logger, Level::Info, context: json!({"id": id}), "user signed in");
/// ```
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, context: $context:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), $crate::source!(), $context)
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log(
            $level,
            format!($($arg)+),
            $crate::source!(),
            $crate::StructuredValue::Null,
        )
    };
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Verbose, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Error, $($arg)+)
    };
}
