use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::session::{
    download_result_handler, get_session_handler, select_image_handler, set_mode_handler,
    trigger_upscale_handler,
};
use crate::config::AppConfig;
use crate::pipeline::collaborator::{
    GeminiImageCollaborator, SharedImageCollaborator, UnconfiguredImageCollaborator,
};
use crate::pipeline::orchestrator::{SharedSession, UpscaleOrchestrator};
use crate::pipeline::session::UpscaleSession;
use crate::pipeline::MAX_SOURCE_IMAGE_BYTES;

#[derive(Clone)]
pub struct AppState {
    pub service_name: &'static str,
    pub service_version: &'static str,
    pub started_unix_ms: u128,
    pub session: SharedSession,
    pub orchestrator: Arc<UpscaleOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<UpscaleOrchestrator>) -> Self {
        Self {
            service_name: "obatech-upscale-core",
            service_version: env!("CARGO_PKG_VERSION"),
            started_unix_ms: now_unix_ms(),
            session: Arc::new(Mutex::new(UpscaleSession::new())),
            orchestrator,
        }
    }
}

/// Wires the orchestrator from explicit configuration. Without a credential
/// the placeholder collaborator is mounted; the orchestrator's fail-fast
/// check means it is never actually called.
pub fn default_orchestrator(config: &AppConfig) -> Arc<UpscaleOrchestrator> {
    let collaborator: SharedImageCollaborator = match config.collaborator_api_key.as_deref() {
        Some(key) => Arc::new(
            GeminiImageCollaborator::new(key, config.collaborator_model.clone())
                .with_base_url(config.collaborator_base_url.clone()),
        ),
        None => Arc::new(UnconfiguredImageCollaborator),
    };
    Arc::new(UpscaleOrchestrator::new(
        config.collaborator_api_key.as_deref(),
        collaborator,
    ))
}

pub fn build_router(config: &AppConfig) -> Router {
    build_router_with_orchestrator(default_orchestrator(config))
}

/// Injection point for tests: swap the collaborator behind the orchestrator
/// without touching the HTTP surface.
pub fn build_router_with_orchestrator(orchestrator: Arc<UpscaleOrchestrator>) -> Router {
    let state = AppState::new(orchestrator);
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/session", get(get_session_handler))
        .route("/api/session/image", post(select_image_handler))
        .route("/api/session/mode", put(set_mode_handler))
        .route("/api/session/upscale", post(trigger_upscale_handler))
        .route("/api/session/result/download", get(download_result_handler))
        // Axum's default body limit (2 MB) is below the crate's 10 MiB source
        // ceiling; allow for base64 + JSON envelope overhead on top of it.
        .layer(DefaultBodyLimit::max(2 * MAX_SOURCE_IMAGE_BYTES as usize))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, config: AppConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = build_router(&config);
    info!(
        bind = %addr,
        credential_configured = config.collaborator_api_key.is_some(),
        model = %config.collaborator_model,
        "starting obatech-upscale-core HTTP surface"
    );
    axum::serve(listener, app).await
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "status": "ok",
            "service": state.service_name,
            "version": state.service_version,
            "started_unix_ms": state.started_unix_ms,
        })),
    )
}

fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis())
}
