//! Backend-neutral statements and result sets.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ExecutorError;

/// A value bound to a named parameter or read back from a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `Text` for `Some`, `Null` for `None`.
    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |v| Self::Text(v.to_string()))
    }

    /// `Timestamp` for `Some`, `Null` for `None`.
    pub fn opt_timestamp(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Null, Self::Timestamp)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

/// One SQL statement with named `:param` placeholders.
///
/// Caller-supplied values only ever travel in `params`; the SQL text holds
/// nothing but validated identifiers and literals chosen by this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<(String, SqlValue)>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind `value` to `:name`. The name is given without the colon.
    pub fn bind(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }
}

/// Rows returned by a query, or the affected-row count of a DML statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
    pub affected_rows: u64,
}

impl QueryOutput {
    /// Output of a statement that returned no result set.
    pub fn affected(rows: u64) -> Self {
        Self {
            affected_rows: rows,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |values| RowRef {
            columns: &self.columns,
            values,
        })
    }

    pub fn first(&self) -> Option<RowRef<'_>> {
        self.iter().next()
    }
}

/// A borrowed row with typed, name-based column access.
///
/// Column lookup is case-insensitive. The `opt_*` accessors return `None`
/// for a column that is absent from the result set, so rows read from a
/// table at an older schema version still map.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    columns: &'a [String],
    values: &'a [SqlValue],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> Option<&'a SqlValue> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|idx| self.values.get(idx))
    }

    fn required(&self, column: &str) -> Result<&'a SqlValue, ExecutorError> {
        match self.get(column) {
            None => Err(schema_err(format!("column '{column}' missing from result"))),
            Some(SqlValue::Null) => Err(schema_err(format!("column '{column}' is null"))),
            Some(value) => Ok(value),
        }
    }

    pub fn text(&self, column: &str) -> Result<String, ExecutorError> {
        self.required(column).map(value_to_text)
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>, ExecutorError> {
        Ok(match self.get(column) {
            None | Some(SqlValue::Null) => None,
            Some(value) => Some(value_to_text(value)),
        })
    }

    pub fn int(&self, column: &str) -> Result<i64, ExecutorError> {
        let value = self.required(column)?;
        value_to_int(value).ok_or_else(|| mismatch(column, "integer", value))
    }

    pub fn bool(&self, column: &str) -> Result<bool, ExecutorError> {
        let value = self.required(column)?;
        value_to_bool(value).ok_or_else(|| mismatch(column, "boolean", value))
    }

    pub fn timestamp(&self, column: &str) -> Result<DateTime<Utc>, ExecutorError> {
        let value = self.required(column)?;
        value_to_timestamp(value).ok_or_else(|| mismatch(column, "timestamp", value))
    }

    pub fn opt_timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>, ExecutorError> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(value) => value_to_timestamp(value)
                .map(Some)
                .ok_or_else(|| mismatch(column, "timestamp", value)),
        }
    }
}

fn schema_err(message: String) -> ExecutorError {
    ExecutorError::SyntaxOrSchema { message }
}

fn mismatch(column: &str, expected: &str, value: &SqlValue) -> ExecutorError {
    let found = match value {
        SqlValue::Null => "null",
        SqlValue::Bool(_) => "boolean",
        SqlValue::Int(_) => "integer",
        SqlValue::Double(_) => "double",
        SqlValue::Text(_) => "text",
        SqlValue::Timestamp(_) => "timestamp",
    };
    schema_err(format!("column '{column}': expected {expected}, found {found}"))
}

fn value_to_text(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Double(d) => d.to_string(),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Timestamp(ts) => format_timestamp(ts),
    }
}

fn value_to_int(value: &SqlValue) -> Option<i64> {
    match value {
        SqlValue::Int(i) => Some(*i),
        SqlValue::Text(s) => s.trim().parse().ok(),
        SqlValue::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

// Databricks returns BOOLEAN as "true"/"false"; SQLite stores 0/1.
fn value_to_bool(value: &SqlValue) -> Option<bool> {
    match value {
        SqlValue::Bool(b) => Some(*b),
        SqlValue::Int(0) => Some(false),
        SqlValue::Int(1) => Some(true),
        SqlValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn value_to_timestamp(value: &SqlValue) -> Option<DateTime<Utc>> {
    match value {
        SqlValue::Timestamp(ts) => Some(*ts),
        SqlValue::Text(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Canonical storage form: RFC 3339, microsecond precision, `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse RFC 3339, or a zone-less `YYYY-MM-DD[ T]HH:MM:SS[.f]` taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
