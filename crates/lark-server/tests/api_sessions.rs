//! End-to-end API tests for the session control surface.
//!
//! All tests run without a LiveKit deployment: the room service is left
//! unconfigured, so sessions start in text-only mode.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use lark_server::config::Config;
use lark_server::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    app(AppState::from_config(&Config::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn start_session(app: &Router, child_name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/sessions",
        Some(json!({ "childName": child_name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "start failed: {}", body);
    body["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn start_session_runs_text_only_without_livekit() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({ "childName": "Emma" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["voiceConnected"], false);
    assert_eq!(body["childName"], "Emma");
    assert!(body["roomName"].as_str().unwrap().starts_with("phonics-"));
}

#[tokio::test]
async fn greeting_is_spoken_on_start() {
    let app = test_app();
    let id = start_session(&app, "Emma").await;

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{}/messages", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let greeting = messages[0]["text"].as_str().unwrap();
    assert!(greeting.contains("Emma"));
    assert!(greeting.contains("phonics tutor"));
}

#[tokio::test]
async fn blank_child_name_is_rejected() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({ "childName": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("childName"));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = test_app();
    let (status, _) = send(&app, "GET", "/api/sessions/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/sessions/nope/utterance",
        Some(json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn single_letter_utterance_returns_phonics_feedback() {
    let app = test_app();
    let id = start_session(&app, "Emma").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/utterance", id),
        Some(json!({ "text": "b" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phonics_reply"], true);
    assert!(body["reply"].as_str().unwrap().contains('B'));
}

#[tokio::test]
async fn focus_letter_utterance_spawns_activity() {
    let app = test_app();
    let id = start_session(&app, "Emma").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/utterance", id),
        Some(json!({ "text": "can we practice letter c" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phonics_reply"], false);
    assert!(body["activity"].as_str().unwrap().contains('C'));
    assert!(!body["reply"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn empty_utterance_is_rejected() {
    let app = test_app();
    let id = start_session(&app, "Emma").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/utterance", id),
        Some(json!({ "text": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_reports_memory_window_and_totals() {
    let app = test_app();
    let id = start_session(&app, "Emma").await;

    for text in ["my name is mia", "what next", "okay then", "b", "one more thing"] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/sessions/{}/utterance", id),
            Some(json!({ "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);

    let memory = &body["memory"];
    assert_eq!(memory["total_exchange_count"], 5);
    assert_eq!(memory["exchanges"].as_array().unwrap().len(), 3);
    assert_eq!(memory["settings"]["child_name"], "Mia");

    // The greeting plus five replies, capped to the last five for status.
    assert_eq!(body["recentMessages"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn token_endpoint_requires_livekit() {
    let app = test_app();
    let id = start_session(&app, "Emma").await;

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{}/token", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("LiveKit"));
}

#[tokio::test]
async fn stopping_a_session_removes_it() {
    let app = test_app();
    let id = start_session(&app, "Emma").await;

    let (status, body) = send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stopped");

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_are_independent() {
    let app = test_app();
    let first = start_session(&app, "Emma").await;
    let second = start_session(&app, "Noah").await;

    let (_, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/utterance", first),
        Some(json!({ "text": "teach me letter d" })),
    )
    .await;

    let (_, body) = send(&app, "GET", &format!("/api/sessions/{}", second), None).await;
    assert_eq!(body["memory"]["total_exchange_count"], 0);
    assert!(body["memory"]["current_activity"].is_null());

    let (_, body) = send(&app, "GET", "/api/sessions", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}
