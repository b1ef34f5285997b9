//! SQLite driver implementation
//!
//! Opens a single `SqliteConnection` per scope. In this dialect a "database"
//! is an attached schema (`main`, `temp`, or any `ATTACH`ed file).

use crate::credentials::Credentials;
use crate::database::traits::{Connection, DatabaseError, Driver};
use crate::schema::{ResultSet, Row, Value};
use crate::sql::{Dialect, Statement};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{
    Column as _, ConnectOptions, Connection as _, Executor, Row as _, Statement as _, TypeInfo,
    ValueRef,
};
use std::str::FromStr;

/// Credential naming the database file (or `:memory:`)
const FILENAME_KEY: &str = "filename";

/// SQLite driver
///
/// Credentials: `filename` is required; every other field (`mode`, `cache`,
/// `immutable`, `vfs`) is passed to sqlx as a connection URL parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        Self
    }

    /// Build connect options from the credentials
    ///
    /// The filename is used as a path, never parsed as a URL. Only the extra
    /// fields go through sqlx's URL parameter parsing.
    fn connect_options(credentials: &Credentials) -> Result<SqliteConnectOptions, DatabaseError> {
        let filename = credentials.text(FILENAME_KEY).ok_or_else(|| {
            DatabaseError::Connection(format!("missing `{}` credential", FILENAME_KEY))
        })?;

        let mut parameters = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in credentials.iter().filter(|(key, _)| *key != FILENAME_KEY) {
            parameters.append_pair(key, &value.to_string());
        }
        let parameters = parameters.finish();

        let options = if parameters.is_empty() {
            SqliteConnectOptions::new()
        } else {
            SqliteConnectOptions::from_str(&format!("sqlite://?{}", parameters))
                .map_err(|error| DatabaseError::Connection(error.to_string()))?
        };

        Ok(options.filename(filename))
    }
}

#[async_trait]
impl Driver for SqliteDriver {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Connection>, DatabaseError> {
        let connection = Self::connect_options(credentials)?
            .connect()
            .await
            .map_err(|error| DatabaseError::Connection(error.to_string()))?;

        Ok(Box::new(SqliteSession { connection }))
    }
}

/// One open SQLite connection
pub struct SqliteSession {
    connection: SqliteConnection,
}

#[async_trait]
impl Connection for SqliteSession {
    async fn fetch_all(&mut self, statement: &Statement) -> Result<ResultSet, DatabaseError> {
        // Prepare first so the column list is known even when no row comes back
        let prepared = (&mut self.connection).prepare(&statement.sql).await?;
        let columns = prepared
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        let mut query = prepared.query();
        for parameter in &statement.params {
            query = query.bind(parameter.as_str());
        }
        let rows = query.fetch_all(&mut self.connection).await?;

        let rows = rows
            .iter()
            .map(row_values)
            .collect::<Result<Vec<Row>, DatabaseError>>()?;

        Ok(ResultSet::new(columns, rows))
    }

    async fn close(self: Box<Self>) -> Result<(), DatabaseError> {
        self.connection
            .close()
            .await
            .map_err(|error| DatabaseError::Connection(error.to_string()))
    }
}

fn row_values(row: &SqliteRow) -> Result<Row, DatabaseError> {
    (0..row.len())
        .map(|index| extract_column_value(row, index))
        .collect()
}

/// Extract a column value from a SQLite row
///
/// SQLite types values, not columns, so the storage class of each value
/// decides the variant.
fn extract_column_value(row: &SqliteRow, index: usize) -> Result<Value, DatabaseError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();

    match type_name.as_str() {
        "INTEGER" | "BIGINT" => {
            if let Ok(value) = row.try_get::<i64, _>(index) {
                return Ok(Value::Integer(value));
            }
        }
        "REAL" | "FLOAT" | "DOUBLE" => {
            if let Ok(value) = row.try_get::<f64, _>(index) {
                return Ok(Value::Float(value));
            }
        }
        "BOOLEAN" => {
            if let Ok(value) = row.try_get::<bool, _>(index) {
                return Ok(Value::Boolean(value));
            }
        }
        "BLOB" => {
            if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
                return Ok(Value::Bytes(value));
            }
        }
        _ => {
            // TEXT plus declared-only types (DATE, DATETIME, NUMERIC) stored as text
            if let Ok(value) = row.try_get::<String, _>(index) {
                return Ok(Value::Text(value));
            }
        }
    }

    // Fallback: try common types in order
    if let Ok(value) = row.try_get::<i64, _>(index) {
        return Ok(Value::Integer(value));
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Ok(Value::Float(value));
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Ok(Value::Text(value));
    }
    if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
        return Ok(Value::Bytes(value));
    }

    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_connect_options_from_filename() {
        let credentials = Credentials::new().with("filename", "/var/data/warehouse.db");
        let options = SqliteDriver::connect_options(&credentials).unwrap();
        assert_eq!(options.get_filename(), Path::new("/var/data/warehouse.db"));
    }

    #[test]
    fn test_connect_options_keep_filename_verbatim() {
        for filename in ["/data/what?.db", "/data/a%20b.db", "/data/#1.db"] {
            let credentials = Credentials::new().with("filename", filename);
            let options = SqliteDriver::connect_options(&credentials).unwrap();
            assert_eq!(options.get_filename(), Path::new(filename));
        }
    }

    #[test]
    fn test_connect_options_accept_extra_fields() {
        let credentials = Credentials::new()
            .with("filename", "/data/what?.db")
            .with("mode", "ro")
            .with("immutable", true);
        let options = SqliteDriver::connect_options(&credentials).unwrap();
        assert_eq!(options.get_filename(), Path::new("/data/what?.db"));
    }

    #[test]
    fn test_connect_options_require_filename() {
        let credentials = Credentials::new().with("host", "localhost");
        assert!(matches!(
            SqliteDriver::connect_options(&credentials),
            Err(DatabaseError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_connects_to_files_with_url_characters_in_name() {
        let directory = tempfile::tempdir().unwrap();

        for name in ["what?.db", "a%20b.db"] {
            let path = directory.path().join(name);
            let mut seed = SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true)
                .connect()
                .await
                .unwrap();
            sqlx::query("CREATE TABLE marker (name TEXT)")
                .execute(&mut seed)
                .await
                .unwrap();
            sqlx::query("INSERT INTO marker (name) VALUES (?)")
                .bind(name)
                .execute(&mut seed)
                .await
                .unwrap();
            seed.close().await.unwrap();

            let credentials = Credentials::new().with("filename", path.to_str().unwrap());
            let mut connection = SqliteDriver::new().connect(&credentials).await.unwrap();
            let result = connection
                .fetch_all(&Statement::new("SELECT name FROM marker"))
                .await
                .unwrap();
            assert_eq!(result.rows, vec![vec![Value::Text(name.to_string())]]);
            connection.close().await.unwrap();
        }

        assert!(!directory.path().join("a b.db").exists());
    }

    #[tokio::test]
    async fn test_unknown_field_rejected_by_driver() {
        let credentials = Credentials::new()
            .with("filename", ":memory:")
            .with("logmech", "LDAP");
        let error = SqliteDriver::new().connect(&credentials).await.err().unwrap();
        assert!(matches!(error, DatabaseError::Connection(_)));
    }

    #[tokio::test]
    async fn test_fetch_all_decodes_storage_classes() {
        let credentials = Credentials::new().with("filename", ":memory:");
        let mut connection = SqliteDriver::new().connect(&credentials).await.unwrap();

        let result = connection
            .fetch_all(
                &Statement::new("SELECT 1 AS i, 2.5 AS f, 'x' AS t, NULL AS n, x'0102' AS b, ? AS p")
                    .bind("bound"),
            )
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["i", "f", "t", "n", "b", "p"]);
        assert_eq!(
            result.rows,
            vec![vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::Text("x".to_string()),
                Value::Null,
                Value::Bytes(vec![1, 2]),
                Value::Text("bound".to_string()),
            ]]
        );

        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_query_error_carries_driver_message() {
        let credentials = Credentials::new().with("filename", ":memory:");
        let mut connection = SqliteDriver::new().connect(&credentials).await.unwrap();

        let error = connection
            .fetch_all(&Statement::new("SELECT * FROM \"main\".\"missing\""))
            .await
            .unwrap_err();

        match error {
            DatabaseError::Query(message) => assert!(message.contains("missing"), "{}", message),
            other => panic!("unexpected error: {other:?}"),
        }
        connection.close().await.unwrap();
    }
}
