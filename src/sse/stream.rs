//! Byte stream to event stream.
//!
//! Composes [`LineFramer`] and [`EventDecoder`] over an async byte stream.
//! Events come out in exactly the order their lines were framed. A malformed
//! line yields `Err(StreamError::Malformed)` and decoding carries on; a
//! failing byte stream yields one `Err(StreamError::Transport)` and ends.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

use super::framer::LineFramer;
use super::parser::EventDecoder;
use super::StreamEvent;
use crate::error::StreamError;
use crate::traits::HttpError;

/// Ordered stream of decoded events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, StreamError>> + Send>>;

struct DecodeState<S> {
    bytes: Pin<Box<S>>,
    framer: LineFramer,
    decoder: EventDecoder,
    lines: VecDeque<String>,
    finished: bool,
}

/// Decode a response body into typed events.
pub fn decode_event_stream<S>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<Bytes, HttpError>> + Send + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        framer: LineFramer::new(),
        decoder: EventDecoder::new(),
        lines: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            // Drain lines framed from earlier chunks before reading more
            if let Some(line) = state.lines.pop_front() {
                match state.decoder.feed_line(&line) {
                    Ok(Some(event)) => return Some((Ok(event), state)),
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::warn!("Dropping malformed event line: {}", e);
                        return Some((Err(StreamError::Malformed(e)), state));
                    }
                }
            }

            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.lines.extend(state.framer.push(&chunk));
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(StreamError::Transport(e.into())), state));
                }
                None => {
                    state.finished = true;
                    let dropped = state.framer.finish();
                    if dropped > 0 {
                        tracing::warn!(
                            "Response ended with {} bytes of unterminated data; discarded",
                            dropped
                        );
                    }
                    return None;
                }
            }
        }
    }))
}
