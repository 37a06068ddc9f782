//! One prompt/answer cycle.

use std::fmt;

/// Lifecycle of an exchange. `Idle` means no exchange is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    /// Prompt accepted, no content received yet
    Sending,
    /// At least one content fragment received
    Streaming,
    /// Terminal event or failure is being resolved
    Finalizing,
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangeState::Idle => "idle",
            ExchangeState::Sending => "sending",
            ExchangeState::Streaming => "streaming",
            ExchangeState::Finalizing => "finalizing",
        };
        f.write_str(name)
    }
}

/// The live exchange. Exists between `begin` and finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    prompt: String,
    conversation_id: Option<String>,
    pub(crate) accumulated_text: String,
    pub(crate) state: ExchangeState,
    pub(crate) is_error: bool,
    pub(crate) malformed_events: usize,
}

impl ChatExchange {
    pub(crate) fn new(prompt: String, conversation_id: Option<String>) -> Self {
        Self {
            prompt,
            conversation_id,
            accumulated_text: String::new(),
            state: ExchangeState::Sending,
            is_error: false,
            malformed_events: 0,
        }
    }

    /// The prompt as sent.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Conversation identity sent with the request.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Answer text received so far.
    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Lines that could not be decoded during this exchange.
    pub fn malformed_events(&self) -> usize {
        self.malformed_events
    }
}

/// How a finalized exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// `done` received. `text` is the full answer, or the fallback text when
    /// `empty` is set.
    Answered {
        text: String,
        conversation_id: Option<String>,
        empty: bool,
        malformed_events: usize,
    },
    /// Server `error` event or transport failure.
    Failed {
        message: String,
        malformed_events: usize,
    },
    /// Aborted by the caller. Nothing was recorded.
    Cancelled,
}

impl ExchangeOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ExchangeOutcome::Failed { .. })
    }
}
