//! Common test utilities for integration tests.
//!
//! Builders for answer-stream bodies and a session wired to a wiremock
//! server.

#![allow(dead_code)]

use ragchat::adapters::mock::RecordingObserver;
use ragchat::session::{ChatSession, SessionContext};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// API key accepted by the fake server.
pub const TEST_KEY: &str = "123";

pub fn content_line(chunk: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"type": "content", "response_chunk": chunk})
    )
}

pub fn done_line(conversation_id: Option<&str>) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"type": "done", "conversation_id": conversation_id})
    )
}

pub fn error_line(message: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"type": "error", "response_chunk": message})
    )
}

/// A streamed answer body made of the given lines.
pub fn stream_body(lines: &[String]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(lines.concat().into_bytes(), "text/plain")
}

/// A FastAPI-style error response.
pub fn detail_error(status: u16, detail: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({"detail": detail}))
}

/// Mount `response` for any authorized `POST /chat`.
pub async fn mount_chat(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("Authorization", format!("Bearer {}", TEST_KEY).as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// A session holding the test key.
pub fn session() -> ChatSession<RecordingObserver> {
    ChatSession::new(
        SessionContext::new().with_credential(TEST_KEY),
        RecordingObserver::new(),
    )
}
