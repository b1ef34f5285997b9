//! Database access layer
//!
//! This module provides the driver abstraction, request-scoped connection
//! handling and the bundled sqlx drivers.

pub mod provider;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(test)]
pub(crate) mod mock;

// Re-export the main types
pub use provider::{ConnectionProvider, Scope};
pub use traits::{Connection, DatabaseError, Driver};
