//! End-to-end chat exchanges against a fake assistant server.
//!
//! These tests drive `ChatSession::send` through the real reqwest adapter
//! and a wiremock server speaking the `/chat` streaming protocol.

mod common;

use common::*;
use ragchat::error::NetworkError;
use ragchat::session::{ExchangeOutcome, ExchangeState, Sender, EMPTY_ANSWER_TEXT};
use ragchat::transport::AssistantClient;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_exchange_streams_and_records_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({
            "query": "What is RAG?",
            "conversation_id": null
        })))
        .respond_with(stream_body(&[
            content_line("Retrieval "),
            content_line("augmented "),
            content_line("generation"),
            done_line(Some("conv-1")),
        ]))
        .expect(1)
        .mount(&server)
        .await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session
        .send(&client, "What is RAG?", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ExchangeOutcome::Answered {
            text: "Retrieval augmented generation".to_string(),
            conversation_id: Some("conv-1".to_string()),
            empty: false,
            malformed_events: 0,
        }
    );
    assert_eq!(session.state(), ExchangeState::Idle);
    assert_eq!(session.context().conversation_id(), Some("conv-1"));

    let history = session.history().entries();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender(), Sender::User);
    assert_eq!(history[0].content(), "What is RAG?");
    assert_eq!(history[1].sender(), Sender::Assistant);
    assert!(!history[1].is_error());

    // Partial renders grow monotonically before the final one
    let renders = &session.observer().renders;
    assert_eq!(renders.len(), 4);
    assert_eq!(renders[0].0, "Retrieval ");
    assert_eq!(renders[2].0, "Retrieval augmented generation");
    assert!(renders[3].1);
}

#[tokio::test]
async fn test_follow_up_sends_conversation_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({"query": "first", "conversation_id": null})))
        .respond_with(stream_body(&[content_line("one"), done_line(Some("conv-7"))]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({"query": "second", "conversation_id": "conv-7"})))
        .respond_with(stream_body(&[content_line("two"), done_line(None)]))
        .expect(1)
        .mount(&server)
        .await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    session.send(&client, "first", CancellationToken::new()).await.unwrap();
    let outcome = session.send(&client, "second", CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, ExchangeOutcome::Answered { ref text, .. } if text == "two"));
    // A done event without an id keeps the current conversation
    assert_eq!(session.context().conversation_id(), Some("conv-7"));
    assert_eq!(session.history().len(), 4);
}

#[tokio::test]
async fn test_new_conversation_after_clearing() {
    let server = MockServer::start().await;
    mount_chat(&server, stream_body(&[done_line(Some("conv-1"))])).await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();
    session.send(&client, "hello", CancellationToken::new()).await.unwrap();
    session.context_mut().clear_conversation();
    session.send(&client, "again", CancellationToken::new()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert!(second["conversation_id"].is_null());
}

#[tokio::test]
async fn test_rejected_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(detail_error(401, "Invalid API key"))
        .mount(&server)
        .await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    let expected = NetworkError::HttpStatus {
        status: 401,
        message: "Invalid API key".to_string(),
    };
    assert_eq!(
        outcome,
        ExchangeOutcome::Failed {
            message: expected.user_message(),
            malformed_events: 0,
        }
    );
    let last = session.history().last().unwrap();
    assert!(last.is_error());
    assert!(session.is_idle());
}

#[tokio::test]
async fn test_service_unavailable() {
    let server = MockServer::start().await;
    mount_chat(&server, detail_error(503, "RAG service unavailable")).await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    assert!(outcome.is_error());
    assert!(session.history().last().unwrap().content().contains("unavailable"));
}

#[tokio::test]
async fn test_server_error_event_replaces_partial_answer() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        stream_body(&[
            content_line("The answer is"),
            error_line("Error processing query: model timeout"),
        ]),
    )
    .await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        ExchangeOutcome::Failed {
            message: "Error processing query: model timeout".to_string(),
            malformed_events: 0,
        }
    );
    let last = session.history().last().unwrap();
    assert_eq!(last.content(), "Error processing query: model timeout");
    assert!(last.is_error());
}

#[tokio::test]
async fn test_malformed_lines_are_skipped() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        stream_body(&[
            ": comment line\n".to_string(),
            "data: {broken json\n\n".to_string(),
            content_line("still "),
            "data: {\"type\":\"progress\",\"pct\":50}\n\n".to_string(),
            "data: {\"response_chunk\":\"no type\"}\n\n".to_string(),
            content_line("works"),
            done_line(Some("conv-2")),
        ]),
    )
    .await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        ExchangeOutcome::Answered {
            text: "still works".to_string(),
            conversation_id: Some("conv-2".to_string()),
            empty: false,
            malformed_events: 3,
        }
    );
}

#[tokio::test]
async fn test_empty_answer_gets_fallback_text() {
    let server = MockServer::start().await;
    mount_chat(&server, stream_body(&[done_line(None)])).await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, ExchangeOutcome::Answered { empty: true, .. }));
    assert_eq!(session.history().last().unwrap().content(), EMPTY_ANSWER_TEXT);
}

#[tokio::test]
async fn test_empty_answer_with_conversation_id() {
    let server = MockServer::start().await;
    mount_chat(&server, stream_body(&[done_line(Some("x"))])).await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        ExchangeOutcome::Answered {
            text: EMPTY_ANSWER_TEXT.to_string(),
            conversation_id: Some("x".to_string()),
            empty: true,
            malformed_events: 0,
        }
    );
    assert_eq!(session.context().conversation_id(), Some("x"));
    assert!(!session.history().last().unwrap().is_error());
}

#[tokio::test]
async fn test_error_followed_by_done_is_a_failure() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        stream_body(&[
            content_line("partial"),
            format!(
                "data: {}\n\n",
                serde_json::json!({
                    "type": "error",
                    "response_chunk": "Error processing query: boom",
                    "message": "boom"
                })
            ),
            done_line(Some("c")),
        ]),
    )
    .await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        ExchangeOutcome::Failed {
            message: "Error processing query: boom".to_string(),
            malformed_events: 0,
        }
    );
    let last = session.history().last().unwrap();
    assert!(last.is_error());
    assert_eq!(last.content(), "Error processing query: boom");
    assert_eq!(session.context().conversation_id(), None);
}

#[tokio::test]
async fn test_stream_ending_without_done_is_a_failure() {
    let server = MockServer::start().await;
    mount_chat(&server, stream_body(&[content_line("half an ans")])).await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        ExchangeOutcome::Failed {
            message: NetworkError::StreamEndedEarly.user_message(),
            malformed_events: 0,
        }
    );
    assert!(session.is_idle());
}

#[tokio::test]
async fn test_unreachable_server_then_recovery() {
    let client = AssistantClient::new("http://127.0.0.1:1");
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();
    assert!(outcome.is_error());
    assert!(session.is_idle());

    let server = MockServer::start().await;
    mount_chat(&server, stream_body(&[content_line("back"), done_line(None)])).await;
    let client = AssistantClient::new(server.uri());

    let outcome = session.send(&client, "retry", CancellationToken::new()).await.unwrap();
    assert!(matches!(outcome, ExchangeOutcome::Answered { ref text, .. } if text == "back"));
    assert_eq!(session.history().len(), 4);
}

#[tokio::test]
async fn test_multibyte_text_survives_streaming() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        stream_body(&[
            content_line("Grüße "),
            content_line("日本語 "),
            content_line("🦀"),
            done_line(None),
        ]),
    )
    .await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();

    let outcome = session.send(&client, "hello", CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, ExchangeOutcome::Answered { ref text, .. } if text == "Grüße 日本語 🦀"));
}

#[tokio::test]
async fn test_missing_key_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = AssistantClient::new(server.uri());
    let mut session = session();
    session.context_mut().clear_credential();

    let result = session.send(&client, "hello", CancellationToken::new()).await;

    assert!(result.is_err());
    assert!(session.history().is_empty());
}
