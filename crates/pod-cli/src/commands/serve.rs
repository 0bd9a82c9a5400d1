//! Serve command: HTTP host for the retrieval handler.
//!
//! Caller identity is read from headers set by the authorizer in front of
//! this service; it is trusted as-is.

use std::sync::Arc;
use anyhow::Context;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{info, warn};

use pod_config::PodConfig;
use pod_core::error::PodResult;
use pod_core::types::{Caller, ResponseEnvelope};
use pod_core::utils::decode_package_name;
use pod_handler::RetrievalHandler;

/// Header carrying the caller's display name
pub const USERNAME_HEADER: &str = "x-pod-username";
/// Header carrying the caller's avatar URL
pub const AVATAR_HEADER: &str = "x-pod-avatar";

#[derive(Clone)]
pub struct AppState {
    config: Arc<PodConfig>,
}

impl AppState {
    pub fn new(config: PodConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/registry/{name}", get(get_package))
        .route("/registry/{scope}/{name}", get(get_scoped_package))
        .with_state(state)
}

pub async fn execute(config: PodConfig) -> anyhow::Result<()> {
    let bind = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Listening on {}", bind);
    axum::serve(listener, router(AppState::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Path prefix of the package route
const REGISTRY_PREFIX: &str = "/registry/";

// Names are read from the raw path so decoding and validation match `invoke`
async fn get_package(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    match package_name(&uri) {
        Ok(name) => serve_package(&state, &name, &headers).await,
        Err(error) => envelope_response(ResponseEnvelope::from_error(&error)),
    }
}

/// `@scope/name` requested without encoding the slash
async fn get_scoped_package(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    match package_name(&uri) {
        Ok(name) if name.starts_with('@') => serve_package(&state, &name, &headers).await,
        Ok(_) => envelope_response(ResponseEnvelope::error(404, "Not found")),
        Err(error) => envelope_response(ResponseEnvelope::from_error(&error)),
    }
}

/// Decode the package name from the undecoded request path
pub fn package_name(uri: &Uri) -> PodResult<String> {
    let raw = uri.path().strip_prefix(REGISTRY_PREFIX).unwrap_or_default();
    decode_package_name(raw)
}

async fn serve_package(state: &AppState, name: &str, headers: &HeaderMap) -> Response {
    let caller = caller_from_headers(headers);

    // Collaborators are built per request; nothing is shared between them
    let envelope = match RetrievalHandler::from_config(&state.config) {
        Ok(handler) => handler.get(name, &caller).await,
        Err(error) => {
            warn!("Failed to build handler: {}", error);
            ResponseEnvelope::error(500, error.to_string())
        }
    };

    envelope_response(envelope)
}

/// Caller identity attached by the fronting authorizer
pub fn caller_from_headers(headers: &HeaderMap) -> Caller {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    Caller::new(read(USERNAME_HEADER), read(AVATAR_HEADER))
}

fn envelope_response(envelope: ResponseEnvelope) -> Response {
    let status = StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        envelope.body,
    )
        .into_response()
}
