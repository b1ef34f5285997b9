use std::env;
use std::path::PathBuf;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use futures::FutureExt;
use skewer::{catalog, config, ConnectionProvider, Credentials, SkewerLayer};
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
const DEFAULT_BASE_PATH: &str = "/skewer";

#[derive(Clone)]
struct ApplicationState {
    provider: ConnectionProvider,
}

#[tokio::main]
async fn main() -> skewer::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let credentials = match env::var_os("SKEWER_CONFIG") {
        Some(path) => config::load_config_from(&PathBuf::from(path)),
        None => config::load_config(),
    };
    if credentials.is_empty() {
        tracing::warn!("no warehouse credentials loaded, data endpoints will answer 503");
    }

    let listen = env::var("SKEWER_LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN.to_string());
    let base_path = env::var("SKEWER_BASE_PATH").unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string());
    let backend = env::var("SKEWER_BACKEND").unwrap_or_else(|_| "postgres".to_string());

    let app = build_app(build_layer(&backend, &base_path, credentials));

    let listener = tokio::net::TcpListener::bind(&listen).await?;

    tracing::info!(%listen, %backend, "server running");
    tracing::info!("warehouse browser available at http://{}{}", listen, base_path);

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app(browser: SkewerLayer) -> Router {
    let application_state = ApplicationState {
        provider: browser.provider().clone(),
    };

    // The browser router is stateless and carries its own CORS layer, so it is
    // merged after with_state()
    Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .with_state(application_state)
        .merge(browser.into_router())
}

fn build_layer(backend: &str, base_path: &str, credentials: Credentials) -> SkewerLayer {
    match backend {
        "sqlite" => SkewerLayer::sqlite(base_path, credentials),
        "postgres" => SkewerLayer::postgres(base_path, credentials),
        other => {
            tracing::warn!(backend = %other, "unknown backend, falling back to postgres");
            SkewerLayer::postgres(base_path, credentials)
        }
    }
}

async fn root_handler() -> &'static str {
    "Welcome to the skewer warehouse browser"
}

async fn health_handler(
    State(state): State<ApplicationState>,
) -> Result<(StatusCode, &'static str), StatusCode> {
    // Verify warehouse connectivity
    state
        .provider
        .within(|scope| catalog::system_info(scope).boxed())
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok((StatusCode::OK, "Server is healthy"))
}
