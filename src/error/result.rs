//! Result type alias for ragchat operations.

use super::rag_error::RagError;

/// Type alias for Results using RagError.
///
/// # Example
///
/// ```ignore
/// use ragchat::error::RagResult;
///
/// fn load_settings() -> RagResult<ClientConfig> {
///     ClientConfig::load()
/// }
/// ```
pub type RagResult<T> = Result<T, RagError>;
