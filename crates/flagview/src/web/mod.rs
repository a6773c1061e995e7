//! HTTP front end: the list page, the detail page and a health check.
//!
//! Every request loads and merges the flag documents afresh on a blocking
//! worker. Requests share nothing but the immutable [`AppState`].

pub mod render;

use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::{Config, RenderConfig};
use crate::error::{Error, Result};
use crate::store::FlagStore;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Contents of [`AppState`].
#[derive(Debug)]
pub struct AppStateInner {
    /// Where flags are loaded from.
    pub store: FlagStore,
    /// Rendering options.
    pub render: RenderConfig,
    started: Instant,
}

impl AppState {
    /// Create the state for a store and rendering options.
    #[must_use]
    pub fn new(store: FlagStore, render: RenderConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                render,
                started: Instant::now(),
            }),
        }
    }

    /// Build the state from the full configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(FlagStore::from_config(&config.data), config.render.clone())
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/feature-flags", get(list_flags))
        .route("/feature-flags/{name}", get(flag_detail))
        .route("/health", get(health))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the flag pages until Ctrl+C or SIGTERM.
///
/// A missing data directory is reported at startup but does not prevent the
/// server from running; each request reports it again as a server error.
///
/// # Errors
///
/// Returns [`Error::Server`] if the address cannot be bound or the server
/// stops with an error.
pub async fn serve(config: &Config) -> Result<()> {
    let address = config.socket_addr();
    let state = AppState::from_config(config);

    if !state.store.dir().is_dir() {
        warn!(
            dir = %state.store.dir().display(),
            "Feature flag directory does not exist; requests will fail until it is created"
        );
    }

    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| Error::server(format!("failed to bind {address}: {e}")))?;

    info!(address = %address, "Serving feature flags on http://{address}/feature-flags");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::server(format!("HTTP server failed: {e}")))?;

    info!("Server shutdown complete");
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(default)]
    q: String,
}

async fn index() -> Redirect {
    Redirect::to("/feature-flags")
}

async fn list_flags(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> std::result::Result<Html<String>, PageError> {
    let store = state.store.clone();
    let flags = run_blocking(move || store.flags()).await?;

    debug!(total = flags.len(), query = %params.q, "Rendering flag list");
    Ok(Html(render::list_page(&flags, &params.q, &state.render)))
}

async fn flag_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> std::result::Result<Response, PageError> {
    let store = state.store.clone();
    let lookup = name.clone();
    let flag = run_blocking(move || store.find(&lookup)).await?;

    match flag {
        Some(flag) => Ok(Html(render::detail_page(&flag, &state.render)).into_response()),
        None => {
            debug!(name = %name, "Feature flag not found");
            Ok((
                StatusCode::NOT_FOUND,
                Html(render::not_found_page(Some(&name))),
            )
                .into_response())
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime: u64,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started.elapsed().as_secs(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}

async fn fallback() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(render::not_found_page(None)))
}

/// Run a store operation on the blocking pool.
async fn run_blocking<T, F>(op: F) -> std::result::Result<T, PageError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| PageError(Error::server(format!("load task failed: {e}"))))?
        .map_err(PageError)
}

/// A load failure rendered as a 500 page.
#[derive(Debug)]
struct PageError(Error);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Failed to load feature flags");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(render::error_page(&self.0.to_string())),
        )
            .into_response()
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample_dir;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app_for(dir: &std::path::Path) -> Router {
        crate::logging::init_test_logging();
        router(AppState::new(FlagStore::new(dir), RenderConfig::default()))
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, Response<Body>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        (response.status(), response)
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_list_page_shows_merged_flags() {
        let dir = sample_dir();

        let (status, response) = send(app_for(dir.path()), "/feature-flags").await;
        let body = body_text(response).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("EnableCheckout"));
        assert!(body.contains("DarkMode"));
        assert!(body.contains("2 flags"));
        assert!(body.contains("2 definitions"));
    }

    #[tokio::test]
    async fn test_list_page_server_side_query() {
        let dir = sample_dir();

        let (status, response) = send(app_for(dir.path()), "/feature-flags?q=API").await;
        let body = body_text(response).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(">1 flags<"));
        assert!(body.contains("value=\"API\""));
        assert!(body.contains("data-name=\"darkmode\" data-projects=\"shop.web\" hidden>"));
    }

    #[tokio::test]
    async fn test_list_page_query_keeps_every_card() {
        let dir = sample_dir();

        let (_, response) = send(app_for(dir.path()), "/feature-flags?q=API").await;
        let body = body_text(response).await;

        assert_eq!(body.matches("data-flag ").count(), 2);
        assert!(body.contains("EnableCheckout"));
        assert!(body.contains("DarkMode"));
    }

    #[tokio::test]
    async fn test_detail_page() {
        let dir = sample_dir();

        let (status, response) = send(app_for(dir.path()), "/feature-flags/EnableCheckout").await;
        let body = body_text(response).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>EnableCheckout</h1>"));
        assert!(body.contains("2 projects"));
        assert!(body.contains("2 references"));
        assert!(body.contains("Shop.Web"));
        assert!(body.contains("Shop.Api"));
    }

    #[tokio::test]
    async fn test_detail_page_decodes_escaped_name() {
        let dir = sample_dir();
        std::fs::write(
            dir.path().join("c-odd.json"),
            r#"[{ "Name": "Beta Feature/X", "Definitions": [{ "ProjectName": "P1" }] }]"#,
        )
        .unwrap();

        let (status, response) =
            send(app_for(dir.path()), "/feature-flags/Beta%20Feature%2FX").await;
        let body = body_text(response).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Beta Feature/X</h1>"));
    }

    #[tokio::test]
    async fn test_detail_page_unknown_flag_is_not_found() {
        let dir = sample_dir();

        let (status, response) = send(app_for(dir.path()), "/feature-flags/Nope").await;
        let body = body_text(response).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Not Found"));
        assert!(body.contains("Nope"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let (status, response) = send(app_for(&missing), "/feature-flags").await;
        let body = body_text(response).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("not found"));
    }

    #[tokio::test]
    async fn test_malformed_document_fails_whole_page() {
        let dir = sample_dir();
        std::fs::write(dir.path().join("c-broken.json"), "{ not json").unwrap();

        let (status, response) = send(app_for(dir.path()), "/feature-flags").await;
        let body = body_text(response).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("c-broken.json"));
        assert!(!body.contains("EnableCheckout"));
    }

    #[tokio::test]
    async fn test_index_redirects_to_list() {
        let dir = sample_dir();

        let (status, response) = send(app_for(dir.path()), "/").await;

        assert!(status.is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/feature-flags"
        );
    }

    #[tokio::test]
    async fn test_health() {
        let dir = sample_dir();

        let (status, response) = send(app_for(dir.path()), "/health").await;
        let cache = response.headers().get(header::CACHE_CONTROL).cloned();
        let body = body_text(response).await;

        assert_eq!(status, StatusCode::OK);
        assert!(cache.is_some());
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "up");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let dir = sample_dir();

        let (status, _) = send(app_for(dir.path()), "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
