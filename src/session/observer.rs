//! Presentation callbacks.
//!
//! The session never formats anything. It reports the current text and the
//! history appends through [`SessionObserver`], and the front-end decides how
//! to show them.

use super::history::HistoryEntry;

/// Text to display for the live exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderUpdate<'a> {
    /// Answer so far, sent after every content fragment
    Partial { text: &'a str },
    /// Final text, sent once when the exchange is finalized
    Final { text: &'a str, is_error: bool },
}

/// Receiver of session side effects. Both methods default to no-ops.
pub trait SessionObserver {
    fn render(&mut self, _update: RenderUpdate<'_>) {}

    fn history_appended(&mut self, _entry: &HistoryEntry) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}
