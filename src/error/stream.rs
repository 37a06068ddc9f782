//! Streaming-related error types.
//!
//! Item errors of the decoded event stream. A malformed line is reported
//! and skipped; a transport failure ends the stream.

use thiserror::Error;

use super::network::NetworkError;
use crate::sse::SseParseError;

/// Error yielded in place of an event by the decoded event stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A `data:` line could not be decoded. Never fatal.
    #[error("Malformed event: {0}")]
    Malformed(#[from] SseParseError),

    /// The byte stream failed. No further items follow.
    #[error("Transport failure: {0}")]
    Transport(#[from] NetworkError),
}

impl StreamError {
    /// Whether the stream is over after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StreamError::Transport(_))
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Malformed(_) => {
                "Received invalid data from the server; it was skipped.".to_string()
            }
            StreamError::Transport(err) => err.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Malformed(SseParseError::InvalidJson { .. }) => "E_STREAM_JSON",
            StreamError::Malformed(SseParseError::MissingType) => "E_STREAM_NOTYPE",
            StreamError::Malformed(SseParseError::UnknownEventType(_)) => "E_STREAM_UNKNOWN",
            StreamError::Malformed(SseParseError::InvalidPayload { .. }) => "E_STREAM_PAYLOAD",
            StreamError::Transport(err) => err.error_code(),
        }
    }
}
