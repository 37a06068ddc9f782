//! Network-related error types.
//!
//! These are the transport failures of an exchange: the request could not be
//! issued, the server answered with a non-2xx status, or the response body
//! broke off before a terminal event arrived.

use std::fmt;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { message: String },

    /// Request timed out.
    Timeout { message: String },

    /// HTTP status error (non-2xx response). `message` is the server's
    /// `detail` text when it sent one.
    HttpStatus { status: u16, message: String },

    /// The response body failed while it was being read.
    StreamInterrupted { message: String },

    /// The response body closed without a `done` or `error` event.
    StreamEndedEarly,

    /// A non-streaming response could not be decoded.
    InvalidResponse { message: String },

    /// The configured base URL is not usable.
    InvalidUrl { url: String },

    /// Request was cancelled.
    Cancelled,

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::StreamInterrupted { .. } => true,
            NetworkError::StreamEndedEarly => true,
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::InvalidUrl { .. } => false,
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// True when the server rejected the credential.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, NetworkError::HttpStatus { status: 401, .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the server. Please check that it is running.".to_string()
            }
            NetworkError::Timeout { .. } => {
                "The request timed out. The server may be slow or unreachable.".to_string()
            }
            NetworkError::HttpStatus { status, message } => match *status {
                401 => "The API key was rejected. Please set a valid key.".to_string(),
                403 => "Access denied.".to_string(),
                503 => "The assistant service is unavailable. Please try again later.".to_string(),
                400 if !message.is_empty() => format!("The request was rejected: {}", message),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ if !message.is_empty() => format!("HTTP error {}: {}", status, message),
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            NetworkError::StreamInterrupted { .. } => {
                "The connection was lost while the answer was streaming.".to_string()
            }
            NetworkError::StreamEndedEarly => {
                "The answer stream ended before it was complete.".to_string()
            }
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server.".to_string()
            }
            NetworkError::InvalidUrl { url } => format!("Invalid server URL: {}", url),
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::StreamInterrupted { .. } => "E_NET_STREAM",
            NetworkError::StreamEndedEarly => "E_NET_EOF",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::InvalidUrl { .. } => "E_NET_URL",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { message } => {
                write!(f, "Connection failed: {}", message)
            }
            NetworkError::Timeout { message } => write!(f, "Request timed out: {}", message),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::StreamInterrupted { message } => {
                write!(f, "Response stream interrupted: {}", message)
            }
            NetworkError::StreamEndedEarly => {
                write!(f, "Response stream ended without a terminal event")
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::InvalidUrl { url } => write!(f, "Invalid URL: {}", url),
            NetworkError::Cancelled => write!(f, "Request cancelled"),
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<HttpError> for NetworkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed { message },
            HttpError::Timeout(message) => NetworkError::Timeout { message },
            HttpError::ServerError { status, message } => {
                NetworkError::HttpStatus { status, message }
            }
            HttpError::Cancelled => NetworkError::Cancelled,
            HttpError::Io(message) => NetworkError::StreamInterrupted { message },
            HttpError::InvalidUrl(url) => NetworkError::InvalidUrl { url },
            HttpError::Other(message) => NetworkError::Other { message },
        }
    }
}
