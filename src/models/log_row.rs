use crate::models::error::{LogStoreError, Result};
use crate::models::level::Level;
use crate::models::log_record::LogRecord;
use crate::service::codec::{self, StructuredValue};
use chrono::{DateTime, Utc};

/// A row of the `logs` table exactly as read back from SQLite.
#[derive(Debug, Clone)]
pub struct LogRow {
    pub id: String,
    pub timestamp: String,
    pub level: i64,
    pub message: String,
    pub function: String,
    pub file: String,
    pub line: i64,
    pub context: Option<Vec<u8>>,
    pub system: String,
}

impl LogRow {
    fn corrupt(&self, reason: String) -> LogStoreError {
        LogStoreError::Decode {
            id: self.id.clone(),
            reason,
        }
    }
}

impl TryFrom<LogRow> for LogRecord {
    type Error = LogStoreError;

    fn try_from(row: LogRow) -> Result<LogRecord> {
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| row.corrupt(format!("bad timestamp '{}': {}", row.timestamp, e)))?
            .with_timezone(&Utc);

        let level = Level::from_ordinal(row.level)
            .ok_or_else(|| row.corrupt(format!("unknown level {}", row.level)))?;

        let line = u32::try_from(row.line)
            .map_err(|_| row.corrupt(format!("line {} out of range", row.line)))?;

        let context = match &row.context {
            None => StructuredValue::Null,
            Some(bytes) => codec::decode(bytes)
                .map_err(|e| row.corrupt(format!("bad context: {}", e)))?,
        };

        Ok(LogRecord {
            timestamp,
            level,
            message: row.message,
            function: row.function,
            file: row.file,
            line,
            context,
            system: row.system,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_row() -> LogRow {
        LogRow {
            id: "row-1".to_string(),
            timestamp: "2024-05-01T12:30:00.000000123Z".to_string(),
            level: 3,
            message: "slow request".to_string(),
            function: "handle".to_string(),
            file: "src/server.rs".to_string(),
            line: 88,
            context: Some(br#"{"ms":1200}"#.to_vec()),
            system: "co.example.api".to_string(),
        }
    }

    #[test]
    fn test_valid_row_converts() {
        let record = LogRecord::try_from(valid_row()).unwrap();
        assert_eq!(record.level, Level::Warning);
        assert_eq!(record.line, 88);
        assert_eq!(record.context, json!({"ms": 1200}));
        assert_eq!(record.timestamp.timestamp_subsec_nanos(), 123);
    }

    #[test]
    fn test_null_context_column_is_absent() {
        let row = LogRow {
            context: None,
            ..valid_row()
        };
        assert!(LogRecord::try_from(row).unwrap().context.is_null());
    }

    #[test]
    fn test_corrupt_context_is_rejected() {
        let row = LogRow {
            context: Some(b"{not json".to_vec()),
            ..valid_row()
        };
        match LogRecord::try_from(row) {
            Err(LogStoreError::Decode { id, .. }) => assert_eq!(id, "row-1"),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let row = LogRow {
            level: 9,
            ..valid_row()
        };
        assert!(matches!(
            LogRecord::try_from(row),
            Err(LogStoreError::Decode { .. })
        ));
    }

    #[test]
    fn test_negative_line_is_rejected() {
        let row = LogRow {
            line: -1,
            ..valid_row()
        };
        assert!(LogRecord::try_from(row).is_err());
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let row = LogRow {
            timestamp: "yesterday".to_string(),
            ..valid_row()
        };
        assert!(LogRecord::try_from(row).is_err());
    }
}
