//! RAG assistant API client.
//!
//! This module provides the client for the assistant backend: the streaming
//! `/chat` endpoint plus the `/health`, `/config` and `/update-config`
//! endpoints used for status and administration.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::NetworkError;
use crate::sse::{decode_event_stream, EventStream};
use crate::traits::{Headers, HttpClient, HttpError, Response};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Body of a `POST /chat` request.
///
/// `conversation_id` is serialized as `null` when absent, which starts a new
/// conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub query: String,
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            query: query.into(),
            conversation_id,
        }
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub models_loaded: bool,
    #[serde(default)]
    pub message: String,
    /// Server time as Unix seconds
    #[serde(default)]
    pub timestamp: f64,
}

impl HealthStatus {
    /// The server reports itself healthy and ready to answer.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.models_loaded
    }
}

/// Response of `GET /config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub ollama_model: Option<String>,
    #[serde(default)]
    pub ollama_base_url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: serde_json::Value,
}

/// Client for the assistant backend.
///
/// Generic over the [`HttpClient`] so tests can script responses.
#[derive(Debug, Clone)]
pub struct AssistantClient<C = ReqwestHttpClient> {
    base_url: String,
    http: C,
}

impl AssistantClient<ReqwestHttpClient> {
    /// Create a client for `base_url` with default HTTP settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, ReqwestHttpClient::new())
    }

    /// Create a client from resolved configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, NetworkError> {
        let http = match config.connect_timeout() {
            Some(timeout) => ReqwestHttpClient::with_connect_timeout(timeout)?,
            None => ReqwestHttpClient::new(),
        };
        Ok(Self::with_http_client(config.base_url.clone(), http))
    }
}

impl Default for AssistantClient<ReqwestHttpClient> {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl<C: HttpClient> AssistantClient<C> {
    pub fn with_http_client(base_url: impl Into<String>, http: C) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(credential: Option<&str>) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if let Some(credential) = credential {
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", credential),
            );
        }
        headers
    }

    /// Send a prompt and return the decoded answer stream.
    ///
    /// A non-2xx status fails before any event is produced, with the
    /// server's `detail` text as the message.
    pub async fn stream_chat(
        &self,
        credential: &str,
        request: &ChatRequest,
    ) -> Result<EventStream, NetworkError> {
        let url = self.endpoint("/chat");
        let body = serde_json::to_string(request).map_err(|e| NetworkError::Other {
            message: format!("Failed to encode chat request: {}", e),
        })?;

        info!(
            url = %url,
            conversation_id = ?request.conversation_id,
            "Sending chat request"
        );
        let bytes = self
            .http
            .post_stream(&url, &body, &Self::headers(Some(credential)))
            .await
            .map_err(into_network_error)?;

        Ok(decode_event_stream(bytes))
    }

    /// Query `GET /health`. No credential is needed.
    pub async fn health_check(&self) -> Result<HealthStatus, NetworkError> {
        let url = self.endpoint("/health");
        let response = self
            .http
            .get(&url, &Self::headers(None))
            .await
            .map_err(into_network_error)?;
        check_status(&response)?;

        let status: HealthStatus = parse_json(&response)?;
        debug!(status = %status.status, models_loaded = status.models_loaded, "Health check");
        Ok(status)
    }

    /// Fetch the server's model configuration.
    pub async fn fetch_config(&self, credential: &str) -> Result<ServerConfig, NetworkError> {
        let url = self.endpoint("/config");
        let response = self
            .http
            .get(&url, &Self::headers(Some(credential)))
            .await
            .map_err(into_network_error)?;
        check_status(&response)?;
        parse_json(&response)
    }

    /// Push new settings to the server. Returns its acknowledgement message.
    pub async fn update_config(
        &self,
        credential: &str,
        settings: &serde_json::Value,
    ) -> Result<String, NetworkError> {
        let url = self.endpoint("/update-config");
        let body = settings.to_string();
        info!(url = %url, "Updating server configuration");

        let response = self
            .http
            .post(&url, &body, &Self::headers(Some(credential)))
            .await
            .map_err(into_network_error)?;
        check_status(&response)?;

        let ack: MessageBody = parse_json(&response)?;
        Ok(ack.message)
    }
}

fn into_network_error(err: HttpError) -> NetworkError {
    match err {
        HttpError::ServerError { status, message } => NetworkError::HttpStatus {
            status,
            message: extract_detail(&message),
        },
        other => other.into(),
    }
}

fn check_status(response: &Response) -> Result<(), NetworkError> {
    if response.is_success() {
        return Ok(());
    }
    let body = response.text().unwrap_or_default();
    Err(NetworkError::HttpStatus {
        status: response.status,
        message: extract_detail(&body),
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(response: &Response) -> Result<T, NetworkError> {
    response.json().map_err(|e| NetworkError::InvalidResponse {
        message: e.to_string(),
    })
}

/// Pull the human-readable `detail` out of an error body.
///
/// Falls back to the trimmed body when it is not `{"detail": ...}`.
pub(crate) fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorDetail>(body) {
        Ok(ErrorDetail {
            detail: serde_json::Value::String(text),
        }) => text,
        Ok(ErrorDetail { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::sse::StreamEvent;
    use bytes::Bytes;
    use futures::StreamExt;

    const BASE: &str = "http://rag.test";

    fn client(http: &MockHttpClient) -> AssistantClient<MockHttpClient> {
        AssistantClient::with_http_client(BASE, http.clone())
    }

    fn json_response(status: u16, body: serde_json::Value) -> MockResponse {
        MockResponse::Success(Response::new(status, Bytes::from(body.to_string())))
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = AssistantClient::with_http_client("http://rag.test/", MockHttpClient::new());
        assert_eq!(client.base_url(), "http://rag.test");
        assert_eq!(client.endpoint("/chat"), "http://rag.test/chat");
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(
            AssistantClient::<ReqwestHttpClient>::default().base_url(),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_chat_request_serializes_null_conversation() {
        let json = serde_json::to_value(ChatRequest::new("hi", None)).unwrap();
        assert_eq!(json, serde_json::json!({"query": "hi", "conversation_id": null}));
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(extract_detail(r#"{"detail":"Invalid API key"}"#), "Invalid API key");
        assert_eq!(extract_detail("  upstream down \n"), "upstream down");
        assert_eq!(
            extract_detail(r#"{"detail":[{"msg":"field required"}]}"#),
            r#"[{"msg":"field required"}]"#
        );
    }

    #[tokio::test]
    async fn test_stream_chat_decodes_events() {
        let http = MockHttpClient::new();
        http.set_response(
            &format!("{}/chat", BASE),
            MockResponse::Stream(vec![Bytes::from(
                "data: {\"type\":\"content\",\"response_chunk\":\"hi\"}\n\n",
            )]),
        );

        let mut events = client(&http)
            .stream_chat("123", &ChatRequest::new("q", Some("t1".to_string())))
            .await
            .unwrap();

        assert_eq!(
            events.next().await,
            Some(Ok(StreamEvent::Content {
                chunk: "hi".to_string()
            }))
        );
        let request = &http.get_requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "http://rag.test/chat");
        assert_eq!(
            request.body.as_deref(),
            Some(r#"{"query":"q","conversation_id":"t1"}"#)
        );
    }

    #[tokio::test]
    async fn test_stream_chat_rejected_credential() {
        let http = MockHttpClient::new();
        http.set_response(
            &format!("{}/chat", BASE),
            MockResponse::StreamError(HttpError::ServerError {
                status: 401,
                message: r#"{"detail":"Invalid API key"}"#.to_string(),
            }),
        );

        let err = match client(&http)
            .stream_chat("bad", &ChatRequest::new("q", None))
            .await
        {
            Err(err) => err,
            Ok(_) => panic!("Expected an error"),
        };

        assert_eq!(
            err,
            NetworkError::HttpStatus {
                status: 401,
                message: "Invalid API key".to_string()
            }
        );
        assert!(err.requires_reauth());
    }

    #[tokio::test]
    async fn test_stream_chat_connection_refused() {
        let http = MockHttpClient::new();
        http.set_response(
            &format!("{}/chat", BASE),
            MockResponse::StreamError(HttpError::ConnectionFailed("refused".to_string())),
        );

        let result = client(&http)
            .stream_chat("123", &ChatRequest::new("q", None))
            .await;

        assert!(matches!(result, Err(NetworkError::ConnectionFailed { .. })));
    }

    #[tokio::test]
    async fn test_health_check() {
        let http = MockHttpClient::new();
        http.set_response(
            &format!("{}/health", BASE),
            json_response(
                200,
                serde_json::json!({
                    "status": "healthy",
                    "models_loaded": true,
                    "message": "RAG API is running",
                    "timestamp": 1718000000.5
                }),
            ),
        );

        let status = client(&http).health_check().await.unwrap();

        assert!(status.is_healthy());
        assert_eq!(status.message, "RAG API is running");
        assert!(!http.get_requests()[0].headers.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn test_health_check_models_not_loaded() {
        let http = MockHttpClient::new();
        http.set_default_response(json_response(
            200,
            serde_json::json!({"status": "healthy", "models_loaded": false}),
        ));

        let status = client(&http).health_check().await.unwrap();
        assert!(!status.is_healthy());
    }

    #[tokio::test]
    async fn test_health_check_invalid_body() {
        let http = MockHttpClient::new();
        http.set_default_response(MockResponse::Success(Response::new(
            200,
            Bytes::from("<html>"),
        )));

        let err = client(&http).health_check().await.unwrap_err();
        assert!(matches!(err, NetworkError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_config() {
        let http = MockHttpClient::new();
        http.set_response(
            &format!("{}/config", BASE),
            json_response(
                200,
                serde_json::json!({
                    "ollama_model": "llama3",
                    "ollama_base_url": "http://localhost:11434",
                    "host": "0.0.0.0",
                    "port": 8000
                }),
            ),
        );

        let config = client(&http).fetch_config("123").await.unwrap();

        assert_eq!(config.ollama_model.as_deref(), Some("llama3"));
        assert_eq!(config.port, Some(8000));
        assert_eq!(
            http.get_requests()[0].headers.get("Authorization").map(String::as_str),
            Some("Bearer 123")
        );
    }

    #[tokio::test]
    async fn test_fetch_config_unauthorized() {
        let http = MockHttpClient::new();
        http.set_default_response(json_response(
            401,
            serde_json::json!({"detail": "Invalid API key"}),
        ));

        let err = client(&http).fetch_config("bad").await.unwrap_err();
        assert_eq!(
            err,
            NetworkError::HttpStatus {
                status: 401,
                message: "Invalid API key".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_update_config() {
        let http = MockHttpClient::new();
        http.set_response(
            &format!("{}/update-config", BASE),
            json_response(
                200,
                serde_json::json!({"message": "Configuration updated successfully"}),
            ),
        );

        let settings = serde_json::json!({"ollama_model": "mistral"});
        let message = client(&http).update_config("123", &settings).await.unwrap();

        assert_eq!(message, "Configuration updated successfully");
        let request = &http.get_requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.body.as_deref(), Some(r#"{"ollama_model":"mistral"}"#));
    }
}
