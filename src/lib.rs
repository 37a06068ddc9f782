//! ragchat - a streaming terminal client for a retrieval-augmented
//! question answering service
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod health;
pub mod session;
pub mod sse;
pub mod traits;
pub mod transport;
