use crate::models::log_record::LogRecord;
use crate::service::codec::render;
use chrono::SecondsFormat;

/// Turns a record into a single line of text.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn format(&self, record: &LogRecord) -> String {
        self(record)
    }
}

/// `<timestamp> [<LEVEL>][<system>] <message> <file>.<function>:<line> | <context>`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl Formatter for DefaultFormatter {
    fn format(&self, record: &LogRecord) -> String {
        format!(
            "{} [{}][{}] {} {}.{}:{} | {}",
            record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            record.level,
            record.system,
            record.message,
            record.file,
            record.function,
            record.line,
            render(&record.context)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::level::Level;
    use crate::models::log_record::Source;
    use chrono::{DateTime, Utc};
    use serde_json::{json, Value};

    fn example_record(context: Value) -> LogRecord {
        LogRecord::new(
            Level::Info,
            "this is an example log message",
            Source::new(
                "test_default_formatter()",
                "LoggerTests/LoggerTests.swift",
                18,
            ),
            context,
            "co.binaryscraping.logger.tests",
        )
        .with_timestamp(DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn test_default_formatter() {
        let record = example_record(json!({"id": "deadbeef", "age": 18}));

        assert_eq!(
            DefaultFormatter.format(&record),
            "1970-01-01T00:00:00Z [INFO][co.binaryscraping.logger.tests] this is an example log message LoggerTests/LoggerTests.swift.test_default_formatter():18 | {\"age\":18,\"id\":\"deadbeef\"}"
        );
    }

    #[test]
    fn test_default_formatter_is_deterministic() {
        let record = example_record(json!({"b": [1, 2], "a": {"y": 1, "x": 2}}));
        let first = DefaultFormatter.format(&record);
        let second = DefaultFormatter.format(&record.clone());
        assert_eq!(first, second);
        assert!(first.ends_with(r#"| {"a":{"x":2,"y":1},"b":[1,2]}"#));
    }

    #[test]
    fn test_default_formatter_without_context() {
        let record = example_record(Value::Null);
        assert!(DefaultFormatter.format(&record).ends_with(":18 | nil"));
    }

    #[test]
    fn test_closure_formatter() {
        let formatter = |record: &LogRecord| format!("{}: {}", record.level, record.message);
        let record = example_record(Value::Null);
        assert_eq!(
            formatter.format(&record),
            "INFO: this is an example log message"
        );
    }
}
