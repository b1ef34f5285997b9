//! PostgreSQL driver implementation
//!
//! Opens a single `PgConnection` per scope. In this dialect a "database" in
//! the browsing API is a schema of the connected database.

use crate::credentials::Credentials;
use crate::database::traits::{Connection, DatabaseError, Driver};
use crate::schema::{ResultSet, Row, Value};
use crate::sql::{Dialect, Statement};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::types::{Oid, PgInterval, PgMoney, PgTimeTz};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow, PgValueFormat};
use sqlx::types::ipnetwork::IpNetwork;
use sqlx::types::BigDecimal;
use sqlx::{
    Column as _, ConnectOptions, Connection as _, Executor, Row as _, Statement as _, TypeInfo,
    ValueRef,
};
use std::str::FromStr;
use url::Url;

/// Credential fields that become parts of the connection URL
const URL_KEYS: [&str; 7] = ["host", "port", "user", "username", "password", "database", "dbname"];

/// PostgreSQL driver
///
/// Credentials: `host` is required; `port`, `user`, `password` and
/// `database` fill the URL, every other field (`sslmode`,
/// `application_name`, ...) is passed to sqlx as a URL parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl PostgresDriver {
    pub fn new() -> Self {
        Self
    }

    /// Build a `postgres://` connection URL from the credentials
    fn connection_url(credentials: &Credentials) -> Result<Url, DatabaseError> {
        let invalid = |field: &str| DatabaseError::Connection(format!("invalid `{}` credential", field));

        let host = credentials
            .text("host")
            .ok_or_else(|| DatabaseError::Connection("missing `host` credential".to_string()))?;

        let mut url = Url::parse("postgres://localhost").map_err(|_| invalid("host"))?;
        url.set_host(Some(&host)).map_err(|_| invalid("host"))?;

        if let Some(port) = credentials.text("port") {
            let port: u16 = port.parse().map_err(|_| invalid("port"))?;
            url.set_port(Some(port)).map_err(|_| invalid("port"))?;
        }
        if let Some(user) = credentials.text("user").or_else(|| credentials.text("username")) {
            url.set_username(&user).map_err(|_| invalid("user"))?;
        }
        if let Some(password) = credentials.text("password") {
            url.set_password(Some(&password)).map_err(|_| invalid("password"))?;
        }
        if let Some(database) = credentials.text("database").or_else(|| credentials.text("dbname")) {
            url.set_path(&database);
        }

        let extra: Vec<(&str, String)> = credentials
            .iter()
            .filter(|(key, _)| !URL_KEYS.contains(key))
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        if !extra.is_empty() {
            url.query_pairs_mut().extend_pairs(extra);
        }

        Ok(url)
    }
}

#[async_trait]
impl Driver for PostgresDriver {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Connection>, DatabaseError> {
        let url = Self::connection_url(credentials)?;
        let options = PgConnectOptions::from_str(url.as_str())
            .map_err(|error| DatabaseError::Connection(error.to_string()))?;
        let connection = options
            .connect()
            .await
            .map_err(|error| DatabaseError::Connection(error.to_string()))?;

        Ok(Box::new(PostgresSession { connection }))
    }
}

/// One open PostgreSQL connection
pub struct PostgresSession {
    connection: PgConnection,
}

#[async_trait]
impl Connection for PostgresSession {
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

fn row_values(row: &PgRow) -> Result<Row, DatabaseError> {
    (0..row.len())
        .map(|index| extract_column_value(row, index))
        .collect()
}

/// Convert one PostgreSQL column value according to its reported type
///
/// A value that cannot be decoded as its reported type is kept in an opaque
/// form rather than failing the whole result set.
fn extract_column_value(row: &PgRow, index: usize) -> Result<Value, DatabaseError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = row.column(index).type_info().name().to_string();

    match decode_value(row, index, &type_name) {
        Ok(value) => Ok(value),
        Err(_) => Ok(opaque_value(row, index)),
    }
}

/// Decode a non-null value by type name
fn decode_value(row: &PgRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "BOOL" => Value::Boolean(row.try_get(index)?),
        "INT2" => Value::Integer(row.try_get::<i16, _>(index)?.into()),
        "INT4" => Value::Integer(row.try_get::<i32, _>(index)?.into()),
        "INT8" => Value::Integer(row.try_get(index)?),
        "OID" => Value::Integer(row.try_get::<Oid, _>(index)?.0.into()),
        "FLOAT4" => Value::Float(row.try_get::<f32, _>(index)?.into()),
        "FLOAT8" => Value::Float(row.try_get(index)?),
        "NUMERIC" => Value::Decimal(numeric_text(row, index)?),
        // lc_monetary with two fractional digits
        "MONEY" => Value::Decimal(row.try_get::<PgMoney, _>(index)?.to_bigdecimal(2).to_string()),
        "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "BPCHAR" => Value::Text(row.try_get(index)?),
        "BYTEA" => Value::Bytes(row.try_get(index)?),
        "DATE" => Value::Date(row.try_get::<NaiveDate, _>(index)?),
        "TIME" => Value::Time(row.try_get::<NaiveTime, _>(index)?),
        "TIMETZ" => {
            let time: PgTimeTz = row.try_get(index)?;
            Value::Text(format!("{}{}", time.time, time.offset))
        }
        "TIMESTAMP" => Value::Timestamp(row.try_get::<NaiveDateTime, _>(index)?),
        "TIMESTAMPTZ" => Value::TimestampTz(row.try_get::<DateTime<Utc>, _>(index)?),
        "INTERVAL" => Value::Text(interval_text(&row.try_get::<PgInterval, _>(index)?)),
        "INET" => Value::Text(network_text(row.try_get(index)?, true)),
        "CIDR" => Value::Text(network_text(row.try_get(index)?, false)),
        "JSON" | "JSONB" => Value::Text(row.try_get::<serde_json::Value, _>(index)?.to_string()),
        "UUID" => Value::Text(row.try_get::<uuid::Uuid, _>(index)?.to_string()),
        "BOOL[]" => Value::Text(array_text(row.try_get::<Vec<Option<bool>>, _>(index)?)),
        "INT2[]" => Value::Text(array_text(row.try_get::<Vec<Option<i16>>, _>(index)?)),
        "INT4[]" => Value::Text(array_text(row.try_get::<Vec<Option<i32>>, _>(index)?)),
        "INT8[]" => Value::Text(array_text(row.try_get::<Vec<Option<i64>>, _>(index)?)),
        "FLOAT4[]" => Value::Text(array_text(row.try_get::<Vec<Option<f32>>, _>(index)?)),
        "FLOAT8[]" => Value::Text(array_text(row.try_get::<Vec<Option<f64>>, _>(index)?)),
        "TEXT[]" | "VARCHAR[]" | "NAME[]" | "BPCHAR[]" => {
            Value::Text(array_text(row.try_get::<Vec<Option<String>>, _>(index)?))
        }
        _ => Value::Text(row.try_get::<String, _>(index)?),
    };

    Ok(value)
}

/// NUMERIC as exact decimal text at the column's display scale, including
/// `NaN` and the infinities
fn numeric_text(row: &PgRow, index: usize) -> Result<String, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    let header = match raw.format() {
        PgValueFormat::Binary => raw.as_bytes().ok().and_then(numeric_header),
        PgValueFormat::Text => None,
    };
    if let Some(special) = header.and_then(|(sign, _)| numeric_special(sign)) {
        return Ok(special.to_string());
    }

    let value: BigDecimal = row.try_get(index)?;
    Ok(match header {
        Some((_, scale)) => value.with_scale(i64::from(scale)).to_string(),
        None => value.to_string(),
    })
}

/// `(sign, dscale)` words of a binary NUMERIC header
fn numeric_header(bytes: &[u8]) -> Option<(u16, u16)> {
    let word = |at: usize| Some(u16::from_be_bytes([*bytes.get(at)?, *bytes.get(at + 1)?]));
    Some((word(4)?, word(6)?))
}

fn numeric_special(sign: u16) -> Option<&'static str> {
    match sign {
        0xC000 => Some("NaN"),
        0xD000 => Some("Infinity"),
        0xF000 => Some("-Infinity"),
        _ => None,
    }
}

/// Raw value of a type with no decoder
///
/// Printable UTF-8 (enum labels, domains over text, xml) becomes text,
/// anything else is passed through as bytes.
fn opaque_value(row: &PgRow, index: usize) -> Value {
    match row.try_get_raw(index).map(|raw| raw.as_bytes().map(<[u8]>::to_vec)) {
        Ok(Ok(bytes)) => bytes_value(bytes),
        _ => Value::Null,
    }
}

fn bytes_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(text) if !text.chars().any(|c| c.is_control() && !c.is_whitespace()) => Value::Text(text),
        Ok(text) => Value::Bytes(text.into_bytes()),
        Err(error) => Value::Bytes(error.into_bytes()),
    }
}

/// Interval in PostgreSQL's default output style, e.g. `1 year 2 mons 3 days 04:05:06`
fn interval_text(interval: &PgInterval) -> String {
    fn unit(count: i32, name: &str) -> Option<String> {
        match count {
            0 => None,
            1 | -1 => Some(format!("{} {}", count, name)),
            _ => Some(format!("{} {}s", count, name)),
        }
    }

    let mut parts: Vec<String> = [
        unit(interval.months / 12, "year"),
        unit(interval.months % 12, "mon"),
        unit(interval.days, "day"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if interval.microseconds != 0 || parts.is_empty() {
        let sign = if interval.microseconds < 0 { "-" } else { "" };
        let micros = interval.microseconds.unsigned_abs();
        let seconds = micros / 1_000_000;
        let mut time = format!(
            "{}{:02}:{:02}:{:02}",
            sign,
            seconds / 3600,
            seconds / 60 % 60,
            seconds % 60
        );
        let fraction = micros % 1_000_000;
        if fraction != 0 {
            time.push_str(format!(".{:06}", fraction).trim_end_matches('0'));
        }
        parts.push(time);
    }

    parts.join(" ")
}

/// `inet` drops a full-length prefix, `cidr` always shows it
fn network_text(network: IpNetwork, inet: bool) -> String {
    let full = if network.is_ipv4() { 32 } else { 128 };
    if inet && network.prefix() == full {
        network.ip().to_string()
    } else {
        network.to_string()
    }
}

/// One-dimensional array in PostgreSQL literal form, e.g. `{1,2,NULL}`
fn array_text<T: std::fmt::Display>(items: Vec<Option<T>>) -> String {
    let elements: Vec<String> = items
        .into_iter()
        .map(|item| match item {
            None => "NULL".to_string(),
            Some(item) => {
                let text = item.to_string();
                let needs_quotes = text.is_empty()
                    || text.eq_ignore_ascii_case("null")
                    || text
                        .chars()
                        .any(|c| c.is_whitespace() || matches!(c, ',' | '{' | '}' | '"' | '\\'));
                if needs_quotes {
                    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
                } else {
                    text
                }
            }
        })
        .collect();
    format!("{{{}}}", elements.join(","))
}
