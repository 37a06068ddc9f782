//! Unified error type for the ragchat client.
//!
//! `RagError` consolidates the domain-specific errors so the front-end and
//! the ambient layers (configuration, credential storage) can report them
//! uniformly.

use thiserror::Error;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::session::SessionError;
use super::stream::StreamError;
use crate::traits::CredentialsError;

/// Unified error type.
#[derive(Debug, Error)]
pub enum RagError {
    /// Transport failures (connections, HTTP status, interrupted bodies).
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Event stream errors.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Local rejections of a prompt.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Credential storage errors.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RagError::Network(err) => network_category(err),
            RagError::Stream(StreamError::Malformed(_)) => ErrorCategory::Protocol,
            RagError::Stream(StreamError::Transport(err)) => network_category(err),
            RagError::Session(SessionError::MissingCredential) => ErrorCategory::Auth,
            RagError::Session(_) => ErrorCategory::User,
            RagError::Credentials(_) => ErrorCategory::System,
            RagError::Config(_) => ErrorCategory::Configuration,
            RagError::Io(_) => ErrorCategory::System,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            RagError::Network(err) => err.is_retryable(),
            RagError::Stream(StreamError::Transport(err)) => err.is_retryable(),
            _ => false,
        }
    }

    /// Check if this error requires a new credential.
    pub fn requires_reauth(&self) -> bool {
        match self {
            RagError::Network(err) => err.requires_reauth(),
            RagError::Stream(StreamError::Transport(err)) => err.requires_reauth(),
            RagError::Session(SessionError::MissingCredential) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            RagError::Network(err) => err.user_message(),
            RagError::Stream(err) => err.user_message(),
            RagError::Session(err) => err.user_message(),
            RagError::Credentials(err) => format!("Could not access stored credentials: {}", err),
            RagError::Config(message) => format!("Invalid configuration: {}", message),
            RagError::Io(err) => format!("File system error: {}", err),
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    /// Two-line terminal report: what went wrong, then what to do about it.
    pub fn report(&self) -> String {
        format!(
            "{}: {}\n  {}",
            self.category().description(),
            self.user_message(),
            self.recovery_hint()
        )
    }
}

fn network_category(err: &NetworkError) -> ErrorCategory {
    match err {
        NetworkError::HttpStatus { status: 401, .. } | NetworkError::HttpStatus { status: 403, .. } => {
            ErrorCategory::Auth
        }
        NetworkError::HttpStatus { status, .. } if *status >= 500 => ErrorCategory::Server,
        NetworkError::HttpStatus { .. } => ErrorCategory::User,
        NetworkError::InvalidResponse { .. } => ErrorCategory::Protocol,
        NetworkError::InvalidUrl { .. } => ErrorCategory::Configuration,
        _ => ErrorCategory::Network,
    }
}
