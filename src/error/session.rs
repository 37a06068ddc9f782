//! Local rejections of the chat session.
//!
//! These are raised before any network call is made and leave the session
//! untouched, so the caller can simply fix the condition and try again.

use thiserror::Error;

use crate::session::ExchangeState;

/// Reasons a prompt was rejected without being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No credential has been set for this session.
    #[error("No API key is set")]
    MissingCredential,

    /// The prompt is empty or whitespace-only.
    #[error("Prompt is empty")]
    EmptyPrompt,

    /// Another exchange is still in flight.
    #[error("An answer is still streaming (state: {state})")]
    Busy { state: ExchangeState },
}

impl SessionError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::MissingCredential => {
                "Please set your API key before sending a message.".to_string()
            }
            SessionError::EmptyPrompt => "Please enter a question.".to_string(),
            SessionError::Busy { .. } => {
                "Please wait for the current answer to finish.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::MissingCredential => "E_SESSION_NOKEY",
            SessionError::EmptyPrompt => "E_SESSION_EMPTY",
            SessionError::Busy { .. } => "E_SESSION_BUSY",
        }
    }
}
