//! Content event parser

use crate::sse::events::{SseParseError, StreamEvent};
use crate::sse::payloads::ContentPayload;

/// Parse a `content` event; `response_chunk` is required.
pub(super) fn parse_content_event(
    event_type: &str,
    value: serde_json::Value,
) -> Result<StreamEvent, SseParseError> {
    let payload: ContentPayload =
        serde_json::from_value(value).map_err(|e| SseParseError::InvalidPayload {
            event_type: event_type.to_string(),
            reason: e.to_string(),
        })?;

    Ok(StreamEvent::Content {
        chunk: payload.response_chunk,
    })
}
