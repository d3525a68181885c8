use crate::models::level::Level;
use crate::service::codec::StructuredValue;
use chrono::{DateTime, Utc};

/// Where a log call was made from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Source {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl Source {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Source {
            function: function.into(),
            file: file.into(),
            line,
        }
    }
}

/// Expands to the fully qualified name of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name[..name.len() - 3].trim_end_matches("::{{closure}}")
    }};
}

/// Captures the call site as a [`Source`].
#[macro_export]
macro_rules! source {
    () => {
        $crate::Source::new($crate::function_name!(), file!(), line!())
    };
}

/// One logged event. Built once per logging call and handed to every
/// destination by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub function: String,
    pub file: String,
    pub line: u32,
    /// `Null` means no context was supplied.
    pub context: StructuredValue,
    pub system: String,
}

impl LogRecord {
    pub fn new(
        level: Level,
        message: impl Into<String>,
        source: Source,
        context: StructuredValue,
        system: impl Into<String>,
    ) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            function: source.function,
            file: source.file,
            line: source.line,
            context,
            system: system.into(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn has_context(&self) -> bool {
        !self.context.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_source_macro_captures_call_site() {
        let source = crate::source!();
        assert_eq!(source.file, file!());
        assert!(source.line > 0);
        assert!(source
            .function
            .ends_with("test_source_macro_captures_call_site"));
    }

    #[test]
    fn test_function_name_inside_closure() {
        let name = (|| crate::function_name!())();
        assert!(name.ends_with("test_function_name_inside_closure"));
    }

    #[test]
    fn test_new_record_copies_source_fields() {
        let record = LogRecord::new(
            Level::Warning,
            "disk almost full",
            Source::new("check_disk", "src/disk.rs", 42),
            json!({"free": 12}),
            "co.example.tests",
        );

        assert_eq!(record.function, "check_disk");
        assert_eq!(record.file, "src/disk.rs");
        assert_eq!(record.line, 42);
        assert_eq!(record.system, "co.example.tests");
        assert!(record.has_context());
    }

    #[test]
    fn test_null_context_means_absent() {
        let record = LogRecord::new(
            Level::Info,
            "no context",
            Source::default(),
            Value::Null,
            "co.example.tests",
        );
        assert!(!record.has_context());
    }
}
