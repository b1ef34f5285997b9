//! Result types for catalog browsing and record lookup
//!
//! These types carry data exactly as the driver reported it. Rows are plain
//! positional value sequences aligned with the column list, so any
//! presentation layer can render them without knowing the backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;

/// A single column value, typed as the driver reported it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),

    /// Exact decimal kept as the driver rendered it
    Decimal(String),

    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text payload, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Text(value) | Value::Decimal(value) => f.write_str(value),
            Value::Date(value) => write!(f, "{}", value),
            Value::Time(value) => write!(f, "{}", value),
            Value::Timestamp(value) => write!(f, "{}", value),
            Value::TimestampTz(value) => write!(f, "{}", value.to_rfc3339()),
            Value::Bytes(value) => write!(f, "[{} bytes]", value.len()),
        }
    }
}

/// One result row, positionally aligned with [`ResultSet::columns`]
pub type Row = Vec<Value>;

/// Column names plus rows, in driver order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    /// Column names as reported by the driver
    pub columns: Vec<String>,

    /// Rows in driver-returned order
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Information about a table (for listing)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    /// Table name
    pub name: String,

    /// Catalog kind code (e.g. `T` for table, `V` for view)
    pub kind: String,

    /// Table comment, if the catalog has one
    pub comment: Option<String>,
}

/// Outcome of a point lookup by key column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMatch {
    /// Column names of the looked-up table
    pub columns: Vec<String>,

    /// First matching row, absent when nothing matched
    pub row: Option<Row>,

    /// Total number of rows that matched the key
    pub match_count: usize,
}

impl RecordMatch {
    /// Whether the key identified exactly one row
    pub fn is_unique(&self) -> bool {
        self.match_count == 1
    }
}

/// Response for `GET /api/status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Whether any credentials were loaded
    pub config_loaded: bool,

    /// Warehouse information query result
    pub system_info: Option<ResultSet>,

    pub error: Option<String>,
}

/// Response for `GET /api/databases`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabasesResponse {
    pub databases: Vec<String>,
    pub error: Option<String>,
}

/// Response for `GET /api/databases/{database}/tables`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesResponse {
    pub database: String,
    pub tables: Vec<TableInfo>,
    pub error: Option<String>,
}

/// Response for `GET /api/databases/{database}/tables/{table}/sample`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResponse {
    pub database: String,
    pub table: String,

    /// Sample size that was requested after clamping
    pub limit: u32,

    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub error: Option<String>,
}

/// Response for `GET /api/databases/{database}/tables/{table}/record`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub database: String,
    pub table: String,
    pub column: String,
    pub value: String,
    pub columns: Vec<String>,
    pub row: Option<Row>,
    pub match_count: usize,

    /// True when exactly one row matched
    pub unique: bool,

    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_serializes_untagged() {
        let row: Row = vec![
            Value::Null,
            Value::Integer(42),
            Value::Text("HR".to_string()),
            Value::Decimal("12.50".to_string()),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
        ];
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!([null, 42, "HR", "12.50", "2024-02-29"]));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Text("SALES".to_string()).to_string(), "SALES");
        assert_eq!(Value::Bytes(vec![1, 2, 3]).to_string(), "[3 bytes]");
    }

    #[test]
    fn test_record_match_uniqueness() {
        let record = RecordMatch {
            columns: vec!["id".to_string()],
            row: Some(vec![Value::Integer(1)]),
            match_count: 1,
        };
        assert!(record.is_unique());

        let duplicated = RecordMatch { match_count: 3, ..record };
        assert!(!duplicated.is_unique());
    }
}
