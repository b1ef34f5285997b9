//! SQL statement construction
//!
//! Every statement the browser sends to a warehouse is rendered here. User
//! supplied database, table and column names are identifiers: they cannot be
//! bound as parameters, so they are quoted with [`quote_identifier`] and
//! interpolated. Values (catalog filters, lookup keys) are never interpolated;
//! they travel in [`Statement::params`] and are bound by the driver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier quote character shared by every supported dialect
const QUOTE: char = '"';

/// A database, table or column name rendered as a quoted SQL identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedIdentifier(String);

impl QuotedIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuotedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quote an identifier (database, table or column name)
///
/// The name is wrapped in double quotes. An embedded double quote is doubled,
/// so the name can never terminate the quoted identifier early. No other
/// character validation is done; whether the name exists is up to the
/// warehouse.
pub fn quote_identifier(name: &str) -> QuotedIdentifier {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(QUOTE);
    for character in name.chars() {
        if character == QUOTE {
            quoted.push(QUOTE);
        }
        quoted.push(character);
    }
    quoted.push(QUOTE);
    QuotedIdentifier(quoted)
}

/// A SQL text plus the values to bind to its placeholders, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<String>,
}

impl Statement {
    /// Statement without bound parameters
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a value to bind to the next placeholder
    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// SQL dialect spoken by a warehouse
///
/// The dialect decides the catalog queries, the random-sample syntax and the
/// placeholder style. All dialects quote identifiers with double quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Teradata,
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Teradata => "teradata",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Teradata | Dialect::Sqlite => "?".to_string(),
        }
    }

    /// Catalog query listing database names, one column, ascending
    pub fn list_databases(&self) -> Statement {
        match self {
            Dialect::Teradata => Statement::new("SELECT DatabaseName FROM DBC.DatabasesV ORDER BY 1"),
            Dialect::Postgres => Statement::new(
                "SELECT schema_name::text AS schema_name FROM information_schema.schemata ORDER BY 1",
            ),
            Dialect::Sqlite => Statement::new("SELECT name FROM pragma_database_list ORDER BY 1"),
        }
    }

    /// Catalog query listing `(name, kind, comment)` for one database, ascending by name
    ///
    /// The database name is a filter value here, so it is bound rather than quoted.
    pub fn list_tables(&self, database: &str) -> Statement {
        let sql = match self {
            Dialect::Teradata => format!(
                "SELECT TableName, TableKind, CommentString FROM DBC.TablesV WHERE DatabaseName = {} ORDER BY 1",
                self.placeholder(1)
            ),
            Dialect::Postgres => format!(
                "SELECT c.relname::text AS table_name, c.relkind::text AS table_kind, \
                 obj_description(c.oid, 'pg_class') AS table_comment \
                 FROM pg_catalog.pg_class c \
                 JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
                 WHERE n.nspname::text = {} AND c.relkind IN ('r', 'v', 'm', 'f', 'p') ORDER BY 1",
                self.placeholder(1)
            ),
            Dialect::Sqlite => format!(
                "SELECT name, type, NULL AS comment FROM pragma_table_list \
                 WHERE schema = {} AND name NOT LIKE 'sqlite_%' ORDER BY 1",
                self.placeholder(1)
            ),
        };
        Statement::new(sql).bind(database)
    }

    /// Bounded random sample of a table
    ///
    /// `limit` is an integer chosen by the caller, never free text. Sampling
    /// itself is left to the engine, so two calls return independent samples.
    pub fn sample(&self, database: &str, table: &str, limit: u32) -> Statement {
        let source = qualified_table(database, table);
        let sql = match self {
            Dialect::Teradata => format!("SELECT * FROM {} SAMPLE {}", source, limit),
            Dialect::Postgres => format!("SELECT * FROM {} ORDER BY random() LIMIT {}", source, limit),
            Dialect::Sqlite => format!("SELECT * FROM {} ORDER BY RANDOM() LIMIT {}", source, limit),
        };
        Statement::new(sql)
    }

    /// Point lookup of every row whose `key_column` equals `key_value`
    ///
    /// No LIMIT: callers need the full match count to tell a unique key from
    /// a duplicated one.
    pub fn find(&self, database: &str, table: &str, key_column: &str, key_value: &str) -> Statement {
        let source = qualified_table(database, table);
        let column = quote_identifier(key_column);
        let sql = match self {
            // Lookup values arrive as text; compare as text so typed columns match.
            Dialect::Postgres => format!(
                "SELECT * FROM {} WHERE {}::text = {}",
                source,
                column,
                self.placeholder(1)
            ),
            Dialect::Teradata | Dialect::Sqlite => format!(
                "SELECT * FROM {} WHERE {} = {}",
                source,
                column,
                self.placeholder(1)
            ),
        };
        Statement::new(sql).bind(key_value)
    }

    /// Warehouse version/information query shown on the status page
    pub fn system_info(&self) -> Statement {
        match self {
            Dialect::Teradata => Statement::new("SELECT * FROM DBC.DBCInfoV"),
            Dialect::Postgres => Statement::new("SELECT version() AS version"),
            Dialect::Sqlite => Statement::new("SELECT sqlite_version() AS version"),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn qualified_table(database: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(database), quote_identifier(table))
}
