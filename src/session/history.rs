//! Append-only log of finalized exchanges.

use serde::Serialize;

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Immutable record of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    sender: Sender,
    content: String,
    /// Unix timestamp in milliseconds
    timestamp: i64,
    is_error: bool,
}

impl HistoryEntry {
    /// A user prompt, stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content.into(), false)
    }

    /// An assistant answer (or error text), stamped now.
    pub fn assistant(content: impl Into<String>, is_error: bool) -> Self {
        Self::new(Sender::Assistant, content.into(), is_error)
    }

    fn new(sender: Sender, content: String, is_error: bool) -> Self {
        Self {
            sender,
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_error,
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Chronological, append-only history.
///
/// Only [`ChatSession`](super::ChatSession) appends to it.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
