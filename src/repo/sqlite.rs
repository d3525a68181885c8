use crate::models::error::{LogStoreError, Result};
use crate::models::log_record::LogRecord;
use crate::models::log_row::LogRow;
use crate::repo::filter::{conjunction, Filter};
use crate::service::codec;
use crate::service::destination::Destination;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info, warn};
use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

const SELECT_LOGS: &str = "SELECT \"id\", \"timestamp\", \"level\", \"message\", \"function\", \"file\", \"line\", \"context\", \"system\"
    FROM \"logs\"";

const ORDER_LOGS: &str = " ORDER BY \"timestamp\" ASC, rowid ASC";

/// Fixed-width RFC 3339 form used for the `timestamp` column. Lexicographic
/// order of these strings is chronological order.
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn is_in_memory(location: &str) -> bool {
    location.is_empty() || location == ":memory:" || location.starts_with("file::memory:")
}

fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    let setup_queries = "BEGIN;

    CREATE TABLE IF NOT EXISTS \"logs\"(
        \"id\"        TEXT    not null
            constraint logs_id_pk
                primary key,
        \"timestamp\" TEXT    not null,
        \"level\"     integer not null,
        \"message\"   TEXT    not null,
        \"function\"  TEXT    not null,
        \"file\"      TEXT    not null,
        \"line\"      integer not null,
        \"context\"   BLOB,
        \"system\"    TEXT    not null);

    CREATE INDEX IF NOT EXISTS logs_timestamp_index
            on \"logs\" (\"timestamp\");

    CREATE INDEX IF NOT EXISTS logs_level_index
            on \"logs\" (\"level\");

    COMMIT;";

    conn.execute_batch(setup_queries)
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<LogRow> {
    let context = match row.get_ref(7)? {
        ValueRef::Null => None,
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Some(bytes.to_vec()),
        other => {
            return Err(rusqlite::Error::InvalidColumnType(
                7,
                "context".to_string(),
                other.data_type(),
            ))
        }
    };

    Ok(LogRow {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        level: row.get(2)?,
        message: row.get(3)?,
        function: row.get(4)?,
        file: row.get(5)?,
        line: row.get(6)?,
        context,
        system: row.get(8)?,
    })
}

/// Durable, queryable log destination backed by SQLite.
///
/// Every operation on one store runs under a single lock, so appends and
/// queries from many threads never overlap on the connection.
pub struct SqliteStore {
    location: String,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the store at `location` and makes sure the `logs`
    /// table exists. `""` and `":memory:"` give a private in-memory store.
    pub fn open(location: &str) -> Result<Self> {
        info!("Opening log store: {}", location);
        let store_open = |cause| LogStoreError::StoreOpen {
            location: location.to_string(),
            cause,
        };

        let conn = if location.is_empty() || location == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(location)
        }
        .map_err(store_open)?;

        let mut pragmas = String::from("PRAGMA busy_timeout = 5000;");
        if !is_in_memory(location) {
            pragmas.push_str(" PRAGMA journal_mode = WAL;");
        }
        conn.execute_batch(&pragmas).map_err(store_open)?;
        setup_database(&conn).map_err(store_open)?;

        debug!("Log store schema ready: {}", location);
        Ok(SqliteStore {
            location: location.to_string(),
            conn: Mutex::new(Some(conn)),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Releases the connection. Later operations fail with `NotOpen`.
    pub fn close(&self) {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(conn) = conn {
            if let Err((_, e)) = conn.close() {
                warn!("Error closing log store {}: {}", self.location, e);
            }
            info!("Closed log store: {}", self.location);
        }
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard.as_ref().ok_or(LogStoreError::NotOpen)?;
        f(conn)
    }

    /// Persists one record under a fresh id. A `Null` context is stored as SQL NULL.
    pub fn append(&self, record: &LogRecord) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        let context = if record.has_context() {
            Some(codec::encode(&record.context)?)
        } else {
            None
        };

        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO \"logs\"
                    (\"id\", \"timestamp\", \"level\", \"message\", \"function\", \"file\", \"line\", \"context\", \"system\")
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    &id,
                    format_timestamp(&record.timestamp),
                    record.level.ordinal(),
                    &record.message,
                    &record.function,
                    &record.file,
                    i64::from(record.line),
                    context,
                    &record.system,
                ],
            )
            .map_err(|cause| LogStoreError::Append {
                id: id.clone(),
                cause,
            })
        })?;

        Ok(())
    }

    /// Every stored record, oldest first.
    pub fn query_all(&self) -> Result<Vec<LogRecord>> {
        self.query(&[])
    }

    /// Records matching all of `filters`, oldest first. An empty slice
    /// behaves like [`query_all`](Self::query_all). Fails as a whole if any
    /// matching row cannot be decoded.
    pub fn query(&self, filters: &[Filter]) -> Result<Vec<LogRecord>> {
        let mut sql = String::from(SELECT_LOGS);
        let params = match conjunction(filters) {
            Some(condition) => {
                sql.push_str(" WHERE ");
                sql.push_str(&condition.sql);
                condition.params
            }
            None => Vec::new(),
        };
        sql.push_str(ORDER_LOGS);

        let query_error = |cause| LogStoreError::Query {
            operation: "query logs".to_string(),
            cause,
        };

        let rows = self.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql).map_err(query_error)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), read_row)
                .map_err(query_error)?;
            rows.collect::<rusqlite::Result<Vec<LogRow>>>()
                .map_err(query_error)
        })?;

        debug!("Log query matched {} rows", rows.len());
        rows.into_iter().map(LogRecord::try_from).collect()
    }

    pub fn count(&self) -> Result<u64> {
        self.with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM \"logs\"", [], |row| row.get(0))
                .map_err(|cause| LogStoreError::Query {
                    operation: "count logs".to_string(),
                    cause,
                })
        })
    }
}

impl Destination for SqliteStore {
    fn send(&self, record: &LogRecord) {
        if let Err(e) = self.append(record) {
            warn!("Dropping log record for store {}: {}", self.location, e);
        }
    }
}
