//! HTTP transport: the adapt endpoint, liveness routes, and permissive CORS.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use a11y_adapt::Adapter;

use crate::error::{ServerError, ServerResult};
use crate::types::{AdaptRequest, AdaptResponse, HealthResponse, LegacyAdaptResponse};

/// Rendered pages with inlined assets run well past axum's 2 MiB default.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared server state passed to all handlers via axum State.
pub struct AppState {
    pub adapter: Arc<Adapter>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/adapt", post(handle_adapt))
        .route("/adaptar", post(handle_adapt_legacy))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // Requests come from a browser extension content script on arbitrary origins.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The HTTP server.
pub struct HttpServer {
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(adapter: Adapter) -> Self {
        Self {
            state: Arc::new(AppState {
                adapter: Arc::new(adapter),
            }),
        }
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> ServerResult<()> {
        let app = router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("a11y-adapt listening on http://{addr}");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn handle_root() -> &'static str {
    "a11y-adapt accessibility adapter is running"
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        profiles: Adapter::profiles()
            .iter()
            .map(|p| p.id.to_string())
            .collect(),
    })
}

async fn handle_adapt(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AdaptRequest>, JsonRejection>,
) -> Response {
    match run_adapt(&state, body).await {
        Ok(html_corrected) => Json(AdaptResponse { html_corrected }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_adapt_legacy(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AdaptRequest>, JsonRejection>,
) -> Response {
    match run_adapt(&state, body).await {
        Ok(html_corrigido) => Json(LegacyAdaptResponse { html_corrigido }).into_response(),
        Err(e) => e.into_response_keyed("erro"),
    }
}

/// Validate the request, then run the pipeline on a blocking worker.
///
/// The parsed document is single-owner and not `Send`, so the pipeline runs
/// on its own thread with a handle back into the runtime for network I/O.
/// A panic inside the pipeline surfaces as a join error and becomes a 500;
/// nothing of the partially mutated document is returned.
async fn run_adapt(
    state: &AppState,
    body: Result<Json<AdaptRequest>, JsonRejection>,
) -> ServerResult<String> {
    let Json(request) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let config = request.effective_config();
    let html = request
        .html_content
        .filter(|html| !html.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("missing 'html_content'".into()))?;
    let profile = request
        .profile
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("missing 'profile'".into()))?;

    tracing::info!(
        "Adapting {} bytes of HTML for profile '{profile}'",
        html.len()
    );

    let adapter = state.adapter.clone();
    let runtime = tokio::runtime::Handle::current();
    let html = tokio::task::spawn_blocking(move || {
        runtime.block_on(adapter.adapt_html(&html, &profile, &config))
    })
    .await
    .map_err(|e| ServerError::Internal(format!("adaptation task failed: {e}")))??;

    Ok(html)
}
