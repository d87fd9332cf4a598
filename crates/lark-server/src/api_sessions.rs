//! Session lifecycle and monitoring API handlers.

use crate::session::{TutorSession, UtteranceOutcome};
use crate::AppState;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lark_types::{SpokenMessage, TutorStatus};
use lark_voice::TutorRoomClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Request body for starting a tutoring session.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    #[serde(rename = "childName")]
    pub child_name: String,
}

/// Response body for a started session.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "roomName")]
    pub room_name: String,
    #[serde(rename = "childName")]
    pub child_name: String,
    /// False when LiveKit is not configured and the session runs text-only.
    #[serde(rename = "voiceConnected")]
    pub voice_connected: bool,
}

/// Summary row for the session list.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "childName")]
    pub child_name: String,
    #[serde(rename = "roomName")]
    pub room_name: String,
    pub active: bool,
}

/// Response body for session status inspection.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "childName")]
    pub child_name: String,
    #[serde(rename = "roomName")]
    pub room_name: String,
    pub active: bool,
    /// Conversational memory snapshot.
    pub memory: TutorStatus,
    /// The last few lines the tutor spoke.
    #[serde(rename = "recentMessages")]
    pub recent_messages: Vec<SpokenMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<SpokenMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub identity: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    /// The browser-facing LiveKit URL to connect to.
    pub url: String,
}

/// Request body for a text-mode utterance. The transcription loop feeds the
/// same path internally.
#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
}

fn lookup(state: &AppState, session_id: &str) -> Result<Arc<TutorSession>, ApiError> {
    state
        .sessions
        .get(session_id)
        .ok_or_else(|| ApiError::NotFound(format!("session not found: {}", session_id)))
}

/// Handler for `POST /api/sessions`.
///
/// Creates the room, issues the tutor's join token, connects the room
/// client, and speaks the greeting. Without a configured LiveKit deployment
/// the session starts in text-only mode.
pub async fn start_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let child_name = payload.child_name.trim().to_string();
    if child_name.is_empty() {
        return Err(ApiError::BadRequest(
            "childName must not be empty".to_string(),
        ));
    }

    let session_id = Uuid::new_v4().to_string();
    let room_name = format!("phonics-{}", session_id);
    let session = Arc::new(TutorSession::new(
        session_id.clone(),
        child_name.clone(),
        room_name.clone(),
        Arc::clone(&state.synthesizer),
    ));

    let mut voice_connected = false;
    if state.room_service.is_enabled() {
        state.room_service.create_room(&room_name).await.map_err(|e| {
            ApiError::InternalServerError(format!("failed to create room: {}", e))
        })?;

        let tutor_identity = format!("tutor-{}", &session_id[..8]);
        let token = state
            .room_service
            .generate_join_token(&room_name, &tutor_identity, "Lark")
            .map_err(|e| {
                ApiError::InternalServerError(format!("failed to generate join token: {}", e))
            })?;

        let client = TutorRoomClient::connect(
            state.room_service.get_url(),
            &token,
            &room_name,
            Arc::clone(&state.transcriber),
        )
        .await
        .map_err(|e| ApiError::InternalServerError(format!("failed to join room: {}", e)))?;

        TutorSession::attach_voice(&session, client).await;
        voice_connected = true;
    }

    state.sessions.insert(Arc::clone(&session));

    let greeting = session.greeting();
    session.speak(&greeting).await;

    info!(session_id = %session_id, child = %child_name, voice = voice_connected, "tutoring session started");

    Ok(Json(StartSessionResponse {
        session_id,
        room_name,
        child_name,
        voice_connected,
    }))
}

/// Handler for `GET /api/sessions`.
pub async fn list_sessions_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<SessionSummary>> {
    let sessions = state
        .sessions
        .list()
        .into_iter()
        .map(|s| SessionSummary {
            session_id: s.id.clone(),
            child_name: s.child_name.clone(),
            room_name: s.room_name.clone(),
            active: s.is_active(),
        })
        .collect();
    Json(sessions)
}

/// Handler for `GET /api/sessions/{sessionId}`.
pub async fn get_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session = lookup(&state, &session_id)?;

    Ok(Json(SessionStatusResponse {
        session_id: session.id.clone(),
        child_name: session.child_name.clone(),
        room_name: session.room_name.clone(),
        active: session.is_active(),
        memory: session.tutor_status(),
        recent_messages: session.recent_messages(5),
    }))
}

/// Handler for `DELETE /api/sessions/{sessionId}`.
pub async fn stop_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = lookup(&state, &session_id)?;
    session.stop().await;
    state.sessions.remove(&session_id);

    info!(session_id = %session_id, "tutoring session removed");
    Ok(Json(serde_json::json!({ "status": "stopped" })))
}

/// Handler for `GET /api/sessions/{sessionId}/messages`.
pub async fn messages_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let session = lookup(&state, &session_id)?;
    Ok(Json(MessagesResponse {
        messages: session.recent_messages(10),
    }))
}

/// Handler for `GET /api/sessions/{sessionId}/token`.
///
/// Issues a join token for the child's browser client.
pub async fn token_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = lookup(&state, &session_id)?;

    if !state.room_service.is_enabled() {
        return Err(ApiError::BadRequest(
            "LiveKit is not configured; this session is text-only".to_string(),
        ));
    }

    let identity = query
        .identity
        .unwrap_or_else(|| format!("child-{}", &session.id[..8]));
    let name = query.name.unwrap_or_else(|| session.child_name.clone());

    let token = state
        .room_service
        .generate_join_token(&session.room_name, &identity, &name)
        .map_err(|e| ApiError::InternalServerError(format!("failed to generate token: {}", e)))?;

    Ok(Json(TokenResponse {
        token,
        url: state.room_service.get_public_url().to_string(),
    }))
}

/// Handler for `POST /api/sessions/{sessionId}/utterance`.
///
/// Text-mode entry into the conversation router; the reply is also spoken
/// through the synthesis chain.
pub async fn utterance_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<UtteranceRequest>,
) -> Result<Json<UtteranceOutcome>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let session = lookup(&state, &session_id)?;
    let outcome = session.process_utterance(&payload.text).await;
    session.speak(&outcome.reply).await;

    Ok(Json(outcome))
}
