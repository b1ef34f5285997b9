//! Driver and connection traits
//!
//! These traits define what the browser needs from a warehouse driver:
//! open one connection from credentials, run a statement with bound
//! parameters, and close the connection.

use crate::credentials::Credentials;
use crate::schema::ResultSet;
use crate::sql::{Dialect, Statement};
use async_trait::async_trait;
use thiserror::Error;

/// A warehouse driver that can open connections
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Dialect used to render statements for this warehouse
    fn dialect(&self) -> Dialect;

    /// Open a new connection
    ///
    /// # Arguments
    ///
    /// * `credentials` - Every credential field, passed through verbatim. Unknown
    ///   fields are the driver's to accept or reject.
    ///
    /// # Returns
    ///
    /// A live connection, or [`DatabaseError::Connection`] on network/auth failure
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Connection>, DatabaseError>;
}

/// A live session with a warehouse
#[async_trait]
pub trait Connection: Send {
    /// Execute a statement and materialize its whole result
    ///
    /// # Arguments
    ///
    /// * `statement` - SQL text plus the values to bind, in placeholder order
    ///
    /// # Returns
    ///
    /// Column names from the statement descriptors (present even when no row
    /// matched) and every row the statement produced
    async fn fetch_all(&mut self, statement: &Statement) -> Result<ResultSet, DatabaseError>;

    /// Close the session
    async fn close(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// Database error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    /// Credentials missing or empty at the first connection attempt
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or authentication failure while opening a connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Failure while executing a statement or fetching its rows
    #[error("Query error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Query(error.to_string())
    }
}
