//! Status, database listing and table listing endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use futures::FutureExt;

use crate::api::error_status;
use crate::catalog;
use crate::database::ConnectionProvider;
use crate::schema::{DatabasesResponse, StatusResponse, TablesResponse};

/// Handler for GET /api/status
///
/// Reports whether credentials were loaded and, if the warehouse is
/// reachable, its information rows. Always answers 200; failures are
/// described in `error`.
pub async fn status_handler(State(provider): State<ConnectionProvider>) -> Response {
    let config_loaded = provider.has_credentials();

    let response = match provider.within(|scope| catalog::system_info(scope).boxed()).await {
        Ok(system_info) => StatusResponse {
            config_loaded,
            system_info: Some(system_info),
            error: None,
        },
        Err(error) => {
            tracing::warn!(%error, "failed to read warehouse information");
            StatusResponse {
                config_loaded,
                system_info: None,
                error: Some(error.to_string()),
            }
        }
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for GET /api/databases
///
/// Returns every database name, ascending.
pub async fn list_databases_handler(State(provider): State<ConnectionProvider>) -> Response {
    match provider.within(|scope| catalog::list_databases(scope).boxed()).await {
        Ok(databases) => (
            StatusCode::OK,
            Json(DatabasesResponse {
                databases,
                error: None,
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(%error, "failed to list databases");
            (
                error_status(&error),
                Json(DatabasesResponse {
                    databases: Vec::new(),
                    error: Some(error.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for GET /api/databases/{database}/tables
///
/// Returns the tables of one database with their kind and comment.
///
/// # Arguments
///
/// * `provider` - Connection provider from state
/// * `database` - Name of the database to list
pub async fn list_tables_handler(
    State(provider): State<ConnectionProvider>,
    Path(database): Path<String>,
) -> Response {
    let name = database.clone();
    let result = provider
        .within(move |scope| async move { catalog::list_tables(scope, &name).await }.boxed())
        .await;

    match result {
        Ok(tables) => (
            StatusCode::OK,
            Json(TablesResponse {
                database,
                tables,
                error: None,
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(%database, %error, "failed to list tables");
            (
                error_status(&error),
                Json(TablesResponse {
                    database,
                    tables: Vec::new(),
                    error: Some(error.to_string()),
                }),
            )
                .into_response()
        }
    }
}
