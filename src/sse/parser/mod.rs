//! Event decoding logic
//!
//! Contains the EventDecoder that turns framed lines into typed events,
//! as well as the line classification and payload dispatch functions.

mod content;
mod terminal;

use crate::sse::events::{SseLine, SseParseError, StreamEvent};

use content::parse_content_event;
use terminal::{parse_done_event, parse_error_event};

/// Prefix marking an event payload line
pub const DATA_PREFIX: &str = "data:";

/// Classify a single framed line
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
        return SseLine::Data(rest.trim().to_string());
    }

    // Comments (": keep-alive") and anything else without the prefix
    SseLine::Noise(line.to_string())
}

/// Decode the JSON object carried on a `data:` line into a typed event
pub fn parse_sse_event(data: &str) -> Result<StreamEvent, SseParseError> {
    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| SseParseError::InvalidJson {
            reason: e.to_string(),
        })?;

    let event_type = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or(SseParseError::MissingType)?
        .to_string();

    match event_type.as_str() {
        "content" => parse_content_event(&event_type, value),
        "done" => parse_done_event(&event_type, value),
        "error" => parse_error_event(&event_type, value),
        _ => Err(SseParseError::UnknownEventType(event_type)),
    }
}

/// Line-at-a-time decoder.
///
/// Each framed line yields zero or one event. Malformed payloads are
/// returned as errors and counted, but never poison the decoder: the next
/// line is decoded independently.
#[derive(Debug, Default)]
pub struct EventDecoder {
    malformed: usize,
}

impl EventDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one framed line.
    ///
    /// Returns:
    /// - `Ok(Some(event))` - the line carried a well-formed event
    /// - `Ok(None)` - separator or protocol noise, nothing to emit
    /// - `Err(error)` - the line had the prefix but a malformed payload
    pub fn feed_line(&mut self, line: &str) -> Result<Option<StreamEvent>, SseParseError> {
        match parse_sse_line(line) {
            SseLine::Empty => Ok(None),
            SseLine::Noise(text) => {
                tracing::trace!("Ignoring non-event line: {}", text);
                Ok(None)
            }
            SseLine::Data(data) => match parse_sse_event(&data) {
                Ok(event) => Ok(Some(event)),
                Err(e) => {
                    self.malformed += 1;
                    Err(e)
                }
            },
        }
    }

    /// Number of malformed lines seen since creation or the last reset
    pub fn malformed_count(&self) -> usize {
        self.malformed
    }

    /// Reset the decoder state
    pub fn reset(&mut self) {
        self.malformed = 0;
    }
}
