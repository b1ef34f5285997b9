//! SkewerLayer - Main Axum integration layer
//!
//! This module provides the main entry point for mounting the warehouse
//! browser API into an Axum application.

use crate::api::create_api_router;
use crate::credentials::Credentials;
use crate::database::{ConnectionProvider, Driver};
use axum::Router;
use tower_http::cors::CorsLayer;

#[cfg(feature = "sqlite")]
use crate::database::sqlite::SqliteDriver;

#[cfg(feature = "postgres")]
use crate::database::postgres::PostgresDriver;

/// Main layer for integrating the warehouse browser into an Axum application
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use skewer::{Credentials, SkewerLayer};
///
/// let credentials = Credentials::new().with("filename", "warehouse.db");
/// let browser = SkewerLayer::sqlite("/skewer", credentials);
/// let app: Router = Router::new().merge(browser.into_router());
/// ```
pub struct SkewerLayer {
    base_path: String,
    provider: ConnectionProvider,
}

impl SkewerLayer {
    /// Create a new browser at the given base path
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the API will be mounted (e.g., "/skewer")
    /// * `provider` - Connection provider for the warehouse
    pub fn new(base_path: impl Into<String>, provider: ConnectionProvider) -> Self {
        Self {
            base_path: base_path.into(),
            provider,
        }
    }

    /// Create a browser for any driver
    pub fn with_driver<D: Driver>(base_path: impl Into<String>, driver: D, credentials: Credentials) -> Self {
        Self::new(base_path, ConnectionProvider::new(driver, credentials))
    }

    /// The provider serving this layer's requests
    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// The returned router includes:
    /// - API endpoints at `{base_path}/api/*`
    /// - Permissive CORS middleware for development
    pub fn into_router(self) -> Router {
        let base_path = self.base_path.trim_end_matches('/');
        let api_router = create_api_router(self.provider);

        Router::new()
            .nest(&format!("{}/api", base_path), api_router)
            .layer(
                CorsLayer::permissive(), // Permissive CORS for development
            )
    }
}

#[cfg(feature = "sqlite")]
impl SkewerLayer {
    /// Create a new browser for SQLite
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the API will be mounted
    /// * `credentials` - Must contain `filename`
    pub fn sqlite(base_path: impl Into<String>, credentials: Credentials) -> Self {
        Self::with_driver(base_path, SqliteDriver::new(), credentials)
    }
}

#[cfg(feature = "postgres")]
impl SkewerLayer {
    /// Create a new browser for PostgreSQL
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the API will be mounted
    /// * `credentials` - Must contain `host`
    pub fn postgres(base_path: impl Into<String>, credentials: Credentials) -> Self {
        Self::with_driver(base_path, PostgresDriver::new(), credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::mock::{text, MockDriver};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn layer(driver: &MockDriver) -> SkewerLayer {
        SkewerLayer::with_driver(
            "/skewer/",
            driver.clone(),
            Credentials::new().with("host", "test-host"),
        )
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_databases_route() {
        let driver = MockDriver::new();
        driver.respond(&["DatabaseName"], vec![vec![text("HR")], vec![text("SALES")]]);

        let (status, body) = get_json(layer(&driver).into_router(), "/skewer/api/databases").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["databases"], serde_json::json!(["HR", "SALES"]));
        assert!(body["error"].is_null());
        assert_eq!((driver.opened(), driver.closed()), (1, 1));
    }

    #[tokio::test]
    async fn test_sample_route_clamps_limit() {
        let driver = MockDriver::new();

        let (status, body) = get_json(
            layer(&driver).into_router(),
            "/skewer/api/databases/HR/tables/Employees/sample?limit=100000",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["limit"], 500);
        assert_eq!(
            driver.statements()[0].sql,
            "SELECT * FROM \"HR\".\"Employees\" SAMPLE 500"
        );
    }

    #[tokio::test]
    async fn test_record_route_reports_no_match() {
        let driver = MockDriver::new();
        driver.respond(&["Id", "Name"], vec![]);

        let (status, body) = get_json(
            layer(&driver).into_router(),
            "/skewer/api/databases/SALES/tables/Customers/record?column=Id&value=404",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["columns"], serde_json::json!(["Id", "Name"]));
        assert!(body["row"].is_null());
        assert_eq!(body["matchCount"], 0);
        assert_eq!(body["unique"], false);
        assert_eq!(driver.statements()[0].params, vec!["404".to_string()]);
    }

    #[tokio::test]
    async fn test_query_error_degrades_to_empty_result() {
        let driver = MockDriver::new();
        driver.fail_next("[Error 3807] Object 'HR.Nope' does not exist.");

        let (status, body) = get_json(
            layer(&driver).into_router(),
            "/skewer/api/databases/HR/tables/Nope/sample",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["rows"], serde_json::json!([]));
        assert!(body["error"].as_str().unwrap().contains("does not exist"));
        assert_eq!((driver.opened(), driver.closed()), (1, 1));
    }

    #[tokio::test]
    async fn test_status_without_credentials() {
        let driver = MockDriver::new();
        let router = SkewerLayer::with_driver("/skewer", driver.clone(), Credentials::default()).into_router();

        let (status, body) = get_json(router, "/skewer/api/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["configLoaded"], false);
        assert!(body["systemInfo"].is_null());
        assert!(body["error"].as_str().unwrap().contains("configuration"));
        assert_eq!(driver.opened(), 0);
    }
}
