//! Recording session observer for testing.

use crate::session::{HistoryEntry, RenderUpdate, SessionObserver};

/// Observer that keeps every callback for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// `(text, is_final, is_error)` per render call
    pub renders: Vec<(String, bool, bool)>,
    /// History entries in the order they were appended
    pub entries: Vec<HistoryEntry>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the last render, if any.
    pub fn last_text(&self) -> Option<&str> {
        self.renders.last().map(|(text, _, _)| text.as_str())
    }
}

impl SessionObserver for RecordingObserver {
    fn render(&mut self, update: RenderUpdate<'_>) {
        let record = match update {
            RenderUpdate::Partial { text } => (text.to_string(), false, false),
            RenderUpdate::Final { text, is_error } => (text.to_string(), true, is_error),
        };
        self.renders.push(record);
    }

    fn history_appended(&mut self, entry: &HistoryEntry) {
        self.entries.push(entry.clone());
    }
}
