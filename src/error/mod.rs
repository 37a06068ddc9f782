//! Unified error handling architecture for ragchat.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Domain-specific Errors**: Network (transport failures), Stream
//!   (malformed events), Session (local rejections)
//! - **Unified Error Type**: `RagError` consolidates all error types
//! - **Result Type Alias**: `RagResult<T>` for consistent return types
//!
//! # Error Categories
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, interrupted stream | Yes |
//! | Auth | Missing or rejected API key | No |
//! | Server | Backend errors (5xx) | Yes |
//! | Protocol | Malformed events | No |
//! | User | Empty prompt, busy session | No |
//! | System | Filesystem errors | No |
//! | Configuration | Config issues | No |

mod category;
mod network;
mod rag_error;
mod result;
mod session;
mod stream;

// Re-export all public types
pub use category::ErrorCategory;
pub use network::NetworkError;
pub use rag_error::RagError;
pub use result::RagResult;
pub use session::SessionError;
pub use stream::StreamError;
