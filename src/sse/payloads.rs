//! Wire payload deserialization structs
//!
//! Internal structs used to deserialize the JSON object carried on each
//! `data:` line. The server echoes `conversation_id`, `status` and
//! `processing_time` on some events; those fields are accepted and ignored.

use serde::Deserialize;

/// Payload of a `content` event
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentPayload {
    pub response_chunk: String,
}

/// Payload of a `done` event
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DonePayload {
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Payload of an `error` event
///
/// The text is normally in `response_chunk`; some servers use `message`,
/// and some send both. `response_chunk` wins.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub response_chunk: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorPayload {
    pub fn into_text(self) -> Option<String> {
        self.response_chunk
            .filter(|m| !m.trim().is_empty())
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}
