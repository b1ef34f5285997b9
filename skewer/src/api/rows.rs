//! Row sampling and record lookup endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use futures::FutureExt;
use serde::Deserialize;

use crate::api::error_status;
use crate::database::ConnectionProvider;
use crate::lookup;
use crate::sampler::{self, DEFAULT_SAMPLE_SIZE};
use crate::schema::{RecordResponse, SampleResponse};

/// Maximum allowed sample size to prevent excessive memory usage
pub const MAX_SAMPLE_SIZE: u32 = 500;

/// Query parameters for sampling rows
#[derive(Debug, Clone, Deserialize)]
pub struct SampleQuery {
    /// Number of rows to draw
    #[serde(default = "default_sample_size")]
    pub limit: u32,
}

fn default_sample_size() -> u32 {
    DEFAULT_SAMPLE_SIZE
}

/// Query parameters for a record lookup
#[derive(Debug, Clone, Deserialize)]
pub struct RecordQuery {
    /// Key column to match on
    pub column: String,

    /// Value the key column must equal
    pub value: String,
}

/// Handler for GET /api/databases/{database}/tables/{table}/sample
///
/// Draws a fresh random sample from a table.
///
/// Query parameters:
/// - limit: Rows to draw (default: 100, clamped to 1..=500)
///
/// There is no offset: every call is an independent sample.
pub async fn sample_rows_handler(
    State(provider): State<ConnectionProvider>,
    Path((database, table)): Path<(String, String)>,
    Query(query): Query<SampleQuery>,
) -> Response {
    let limit = query.limit.clamp(1, MAX_SAMPLE_SIZE);

    let (database_name, table_name) = (database.clone(), table.clone());
    let result = provider
        .within(move |scope| {
            async move { sampler::sample(scope, &database_name, &table_name, limit).await }.boxed()
        })
        .await;

    match result {
        Ok(sample) => (
            StatusCode::OK,
            Json(SampleResponse {
                database,
                table,
                limit,
                columns: sample.columns,
                rows: sample.rows,
                error: None,
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(%database, %table, %error, "failed to sample rows");
            (
                error_status(&error),
                Json(SampleResponse {
                    database,
                    table,
                    limit,
                    columns: Vec::new(),
                    rows: Vec::new(),
                    error: Some(error.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for GET /api/databases/{database}/tables/{table}/record
///
/// Looks up the rows whose `column` equals `value` and returns the first one
/// with the total match count.
///
/// Query parameters:
/// - column: Key column name
/// - value: Key value, always bound as a parameter
///
/// No match is a successful response with `row: null` and `matchCount: 0`.
pub async fn find_record_handler(
    State(provider): State<ConnectionProvider>,
    Path((database, table)): Path<(String, String)>,
    Query(query): Query<RecordQuery>,
) -> Response {
    let (database_name, table_name) = (database.clone(), table.clone());
    let (column, value) = (query.column.clone(), query.value.clone());
    let result = provider
        .within(move |scope| {
            async move { lookup::find(scope, &database_name, &table_name, &column, &value).await }
                .boxed()
        })
        .await;

    match result {
        Ok(record) => {
            let unique = record.is_unique();
            (
                StatusCode::OK,
                Json(RecordResponse {
                    database,
                    table,
                    column: query.column,
                    value: query.value,
                    columns: record.columns,
                    row: record.row,
                    match_count: record.match_count,
                    unique,
                    error: None,
                }),
            )
                .into_response()
        }
        Err(error) => {
            // Identifiers only; the key value is never logged
            tracing::warn!(%database, %table, column = %query.column, %error, "failed to look up record");
            (
                error_status(&error),
                Json(RecordResponse {
                    database,
                    table,
                    column: query.column,
                    value: query.value,
                    columns: Vec::new(),
                    row: None,
                    match_count: 0,
                    unique: false,
                    error: Some(error.to_string()),
                }),
            )
                .into_response()
        }
    }
}
