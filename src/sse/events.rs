//! Stream event types and definitions
//!
//! Contains the StreamEvent enum produced by the decoder, the classification
//! of a single framed line, and the decode error type.

use thiserror::Error;

/// Typed events from the assistant's answer stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental fragment of the answer text
    Content { chunk: String },
    /// Stream completed successfully
    Done { conversation_id: Option<String> },
    /// Stream failed; the message replaces any partial answer
    Error { message: String },
}

impl StreamEvent {
    /// Returns true for `Done` and `Error`, which end the stream's effect.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }

    /// Returns the event type name as a string for logging.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StreamEvent::Content { .. } => "content",
            StreamEvent::Done { .. } => "done",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// Convenience accessor for `Content` fragments.
    pub fn as_chunk(&self) -> Option<&str> {
        match self {
            StreamEvent::Content { chunk } => Some(chunk.as_str()),
            _ => None,
        }
    }
}

/// Classification of a single framed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Empty or whitespace-only line (frame separator)
    Empty,
    /// `data:` line with its payload (trimmed)
    Data(String),
    /// Anything else: comments, keep-alives, stray text
    Noise(String),
}

/// Errors raised while decoding a `data:` payload.
///
/// Every variant is a malformed event: the line is dropped and decoding
/// continues with the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseParseError {
    /// Payload is not valid JSON
    #[error("Invalid JSON payload: {reason}")]
    InvalidJson { reason: String },
    /// Payload has no string `type` discriminator
    #[error("Event payload has no type discriminator")]
    MissingType,
    /// Discriminator is not one of content, done, error
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
    /// Known type but required fields are missing or mistyped
    #[error("Invalid payload for '{event_type}' event: {reason}")]
    InvalidPayload { event_type: String, reason: String },
}
