//! # skewer
//!
//! A lightweight database-introspection and record-browsing service for a
//! relational data warehouse.
//!
//! ## Features
//!
//! - List databases and the tables inside a database
//! - Draw a fresh random sample of rows from a table
//! - Look up a record by one key column, with the total match count
//! - Request-scoped connections: one lazily opened connection per request,
//!   closed exactly once
//! - Identifiers are always quoted, lookup values are always bound
//! - Bundled SQLite and PostgreSQL drivers; any warehouse (Teradata included)
//!   plugs in through the [`Driver`] trait
//!
//! ## Security Warning
//!
//! - No authentication/authorization built-in
//! - Exposes the full catalog and table contents to whoever can reach it
//! - Meant for trusted operators only
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::Router;
//! use skewer::{config, SkewerLayer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let credentials = config::load_config();
//!
//!     let app = Router::new().merge(SkewerLayer::postgres("/skewer", credentials).into_router());
//!
//!     // Serve the application...
//! }
//! ```

// Public modules
pub mod api;
pub mod catalog;
pub mod config;
pub mod credentials;
pub mod database;
pub mod layer;
pub mod lookup;
pub mod sampler;
pub mod schema;
pub mod sql;

// Public exports
pub use config::{load_config, ConfigError};
pub use credentials::{CredentialValue, Credentials};
pub use layer::SkewerLayer;
pub use schema::{RecordMatch, ResultSet, Row, TableInfo, Value};
pub use sql::{quote_identifier, Dialect, Statement};

// Re-export database types
pub use database::{Connection, ConnectionProvider, DatabaseError, Driver, Scope};

#[cfg(feature = "sqlite")]
pub use database::sqlite::SqliteDriver;

#[cfg(feature = "postgres")]
pub use database::postgres::PostgresDriver;

// Error type
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
