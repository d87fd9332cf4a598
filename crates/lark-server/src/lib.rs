//! Lark server library logic.
//!
//! Builds the axum application: session lifecycle and monitoring endpoints,
//! the static control panel, and the shared state wiring the voice adapters
//! to per-session tutoring orchestration.

pub mod api_sessions;
pub mod config;
pub mod session;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use lark_voice::{RoomService, SpeechSynthesizer, TranscriberService};
use serde_json::{json, Value};
use session::SessionRegistry;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Maximum request body size (256 KiB). Utterances and session requests are
/// tiny; anything larger is hostile.
const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// LiveKit room management (rooms, join tokens, participants).
    pub room_service: Arc<RoomService>,
    /// Speech synthesis fallback chain.
    pub synthesizer: Arc<SpeechSynthesizer>,
    /// Speech-to-text wrapper fed by room audio.
    pub transcriber: Arc<TranscriberService>,
    /// Live sessions keyed by session id.
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn from_config(config: &config::Config) -> Self {
        Self {
            room_service: Arc::new(RoomService::new(config.livekit.clone())),
            synthesizer: Arc::new(SpeechSynthesizer::new(config.speech.clone())),
            transcriber: Arc::new(TranscriberService::new(
                &config.stt.model,
                &config.stt.binary,
            )),
            sessions: SessionRegistry::new(),
        }
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route(
            "/api/sessions",
            post(api_sessions::start_session_handler).get(api_sessions::list_sessions_handler),
        )
        .route(
            "/api/sessions/{sessionId}",
            get(api_sessions::get_session_handler).delete(api_sessions::stop_session_handler),
        )
        .route(
            "/api/sessions/{sessionId}/messages",
            get(api_sessions::messages_handler),
        )
        .route(
            "/api/sessions/{sessionId}/token",
            get(api_sessions::token_handler),
        )
        .route(
            "/api/sessions/{sessionId}/utterance",
            post(api_sessions::utterance_handler),
        );

    // Serve the control panel if the directory exists.
    // Configured via LARK_STATIC_DIR env var; defaults to "static".
    let static_dir = std::env::var("LARK_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
    let router = if std::path::Path::new(&static_dir).join("index.html").exists() {
        tracing::info!(path = %static_dir, "serving control panel static files");
        let index = format!("{}/index.html", static_dir);
        router.fallback_service(ServeDir::new(&static_dir).fallback(ServeFile::new(index)))
    } else {
        tracing::info!(path = %static_dir, "control panel directory not found, skipping static file serving");
        router
    };

    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::Extension(Arc::new(state)))
}
