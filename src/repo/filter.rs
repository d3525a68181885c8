//! Declarative predicates over stored log records.
//!
//! A [`Filter`] compiles into a [`Condition`]: a SQL fragment using `?`
//! placeholders plus the values to bind, in placeholder order. User-supplied
//! text only ever travels as a bound value.

use crate::models::level::Level;
use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, ToSqlOutput};

pub(crate) const TIMESTAMP_COLUMN: &str = "\"timestamp\"";

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Inclusive on both ends. With neither bound it matches every record.
    DateRange {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    Level(Level),
    /// LIKE pattern, `%` matches any run of characters.
    Message(String),
    Function(String),
    File(String),
    Line(u32),
    System(String),
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    pub fn or(left: Filter, right: Filter) -> Filter {
        Filter::Or(Box::new(left), Box::new(right))
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Filter {
        Filter::DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Filter {
        Filter::DateRange {
            start: Some(start),
            end: None,
        }
    }

    pub fn until(end: DateTime<Utc>) -> Filter {
        Filter::DateRange {
            start: None,
            end: Some(end),
        }
    }

    /// Folds a list of alternatives into nested `Or`s. `None` when empty.
    pub fn any_of(filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        filters.into_iter().reduce(Filter::or)
    }

    pub fn compile(&self) -> Condition {
        match self {
            Filter::DateRange { start, end } => match (start, end) {
                (Some(start), Some(end)) => Condition::new(
                    format!("{} BETWEEN ? AND ?", TIMESTAMP_COLUMN),
                    vec![FilterValue::timestamp(start), FilterValue::timestamp(end)],
                ),
                (Some(start), None) => Condition::new(
                    format!("{} >= ?", TIMESTAMP_COLUMN),
                    vec![FilterValue::timestamp(start)],
                ),
                (None, Some(end)) => Condition::new(
                    format!("{} <= ?", TIMESTAMP_COLUMN),
                    vec![FilterValue::timestamp(end)],
                ),
                (None, None) => Condition::always(),
            },
            Filter::Level(level) => Condition::new(
                "\"level\" = ?".to_string(),
                vec![FilterValue::Integer(level.ordinal())],
            ),
            Filter::Message(pattern) => Condition::like("message", pattern),
            Filter::Function(pattern) => Condition::like("function", pattern),
            Filter::File(pattern) => Condition::like("file", pattern),
            Filter::System(pattern) => Condition::like("system", pattern),
            Filter::Line(line) => Condition::new(
                "\"line\" = ?".to_string(),
                vec![FilterValue::Integer(i64::from(*line))],
            ),
            Filter::Or(left, right) => {
                let left = left.compile();
                let right = right.compile();
                if left.is_always() || right.is_always() {
                    return Condition::always();
                }
                let mut params = left.params;
                params.extend(right.params);
                Condition::new(format!("({} OR {})", left.sql, right.sql), params)
            }
        }
    }
}

/// A value bound to one `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

impl FilterValue {
    pub(crate) fn timestamp(value: &DateTime<Utc>) -> FilterValue {
        FilterValue::Text(crate::repo::sqlite::format_timestamp(value))
    }
}

impl ToSql for FilterValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FilterValue::Text(text) => text.to_sql(),
            FilterValue::Integer(value) => value.to_sql(),
        }
    }
}

/// Compiled form of a filter. An empty `sql` matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub sql: String,
    pub params: Vec<FilterValue>,
}

impl Condition {
    fn new(sql: String, params: Vec<FilterValue>) -> Self {
        Condition { sql, params }
    }

    fn always() -> Self {
        Condition {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn like(column: &str, pattern: &str) -> Self {
        Condition::new(
            format!("\"{}\" LIKE ?", column),
            vec![FilterValue::Text(pattern.to_string())],
        )
    }

    pub fn is_always(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Joins the conditions of several filters with AND into a WHERE body.
/// Returns `None` when no filter restricts anything.
pub fn conjunction(filters: &[Filter]) -> Option<Condition> {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    for condition in filters.iter().map(Filter::compile) {
        if condition.is_always() {
            continue;
        }
        clauses.push(format!("({})", condition.sql));
        params.extend(condition.params);
    }

    if clauses.is_empty() {
        None
    } else {
        Some(Condition::new(clauses.join(" AND "), params))
    }
}
