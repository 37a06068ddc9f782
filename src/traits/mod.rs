//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, streaming POST)
//! - [`CredentialsProvider`] - Credentials storage and retrieval

pub mod credentials;
pub mod http;

pub use credentials::{Credentials, CredentialsError, CredentialsProvider};
pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
