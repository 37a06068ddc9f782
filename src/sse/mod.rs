//! Answer stream decoding
//!
//! The server streams its answer as text lines. Event lines look like:
//! - `data: {"type":"content","response_chunk":"..."}`
//! - `data: {"type":"done","conversation_id":"..."}`
//! - `data: {"type":"error","response_chunk":"..."}`
//!
//! Empty lines separate events; any other line is ignored.
//!
//! # Module structure
//! - `framer` - Bytes to complete lines (LineFramer)
//! - `events` - Event type definitions (StreamEvent, SseLine, SseParseError)
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Line decoding (EventDecoder, parse_sse_line, parse_sse_event)
//! - `stream` - Async composition over a byte stream (decode_event_stream)

mod events;
mod framer;
mod parser;
mod payloads;
mod stream;

// Re-export public types
pub use events::{SseLine, SseParseError, StreamEvent};
pub use framer::LineFramer;
pub use parser::{parse_sse_event, parse_sse_line, EventDecoder, DATA_PREFIX};
pub use stream::{decode_event_stream, EventStream};
