//! Terminal event parsers (done, error)

use crate::sse::events::{SseParseError, StreamEvent};
use crate::sse::payloads::{DonePayload, ErrorPayload};

/// Shown when an `error` event carries no message of its own
pub const UNSPECIFIED_ERROR_TEXT: &str = "The assistant reported an error.";

/// Parse a `done` event; a missing `conversation_id` is treated as null.
pub(super) fn parse_done_event(
    event_type: &str,
    value: serde_json::Value,
) -> Result<StreamEvent, SseParseError> {
    let payload: DonePayload =
        serde_json::from_value(value).map_err(|e| SseParseError::InvalidPayload {
            event_type: event_type.to_string(),
            reason: e.to_string(),
        })?;

    Ok(StreamEvent::Done {
        conversation_id: payload.conversation_id,
    })
}

/// Parse an `error` event
pub(super) fn parse_error_event(
    event_type: &str,
    value: serde_json::Value,
) -> Result<StreamEvent, SseParseError> {
    let payload: ErrorPayload =
        serde_json::from_value(value).map_err(|e| SseParseError::InvalidPayload {
            event_type: event_type.to_string(),
            reason: e.to_string(),
        })?;

    let message = payload
        .into_text()
        .unwrap_or_else(|| UNSPECIFIED_ERROR_TEXT.to_string());

    Ok(StreamEvent::Error { message })
}
