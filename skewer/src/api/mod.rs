//! REST API endpoints
//!
//! This module contains all API endpoint handlers for the warehouse browser.
//! Each request runs in its own connection scope.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::database::{ConnectionProvider, DatabaseError};

pub mod rows;
pub mod tables;

// Re-export handlers for convenience
pub use rows::{find_record_handler, sample_rows_handler};
pub use tables::{list_databases_handler, list_tables_handler, status_handler};

/// Create the API router with all endpoints
///
/// # Arguments
///
/// * `provider` - Connection provider shared by all requests
///
/// # Returns
///
/// An Axum Router configured with all API routes
pub fn create_api_router(provider: ConnectionProvider) -> Router {
    // Note: Axum 0.8 uses {param} syntax instead of :param
    Router::new()
        .route("/status", get(status_handler))
        .route("/databases", get(list_databases_handler))
        .route("/databases/{database}/tables", get(list_tables_handler))
        .route(
            "/databases/{database}/tables/{table}/sample",
            get(sample_rows_handler),
        )
        .route(
            "/databases/{database}/tables/{table}/record",
            get(find_record_handler),
        )
        .with_state(provider)
}

/// HTTP status for a failed data-access call
pub(crate) fn error_status(error: &DatabaseError) -> StatusCode {
    match error {
        DatabaseError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        DatabaseError::Connection(_) => StatusCode::BAD_GATEWAY,
        DatabaseError::Query(_) => StatusCode::BAD_REQUEST,
    }
}
