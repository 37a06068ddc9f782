//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with scripted responses
//! - [`InMemoryCredentials`] - In-memory credential storage
//! - [`RecordingObserver`] - Session observer that records callbacks

pub mod credentials;
pub mod http;
pub mod observer;

pub use credentials::{FailOn, InMemoryCredentials};
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use observer::RecordingObserver;
