//! Session-wide state.
//!
//! [`SessionContext`] holds what outlives a single exchange: the credential,
//! the last conversation identity assigned by the server, and the advisory
//! connectivity flag. It is created with the session and handed to
//! [`ChatSession`](super::ChatSession), which owns it from then on.

/// Explicit session context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    credential: Option<String>,
    conversation_id: Option<String>,
    connected: bool,
}

impl SessionContext {
    /// Create an empty context: no credential, no conversation, offline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style constructor with a credential already set.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.set_credential(credential);
        self
    }

    /// The current credential, if any.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Whether a credential is present.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Replace the credential.
    ///
    /// A new credential starts a new conversation, so the stored
    /// conversation identity is cleared. A blank value clears the credential.
    pub fn set_credential(&mut self, credential: impl Into<String>) {
        let credential = credential.into().trim().to_string();
        self.credential = if credential.is_empty() {
            None
        } else {
            Some(credential)
        };
        self.conversation_id = None;
    }

    /// Remove the credential. The conversation identity is kept.
    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    /// The last conversation identity assigned by the server.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Record the identity carried by a `done` event.
    pub(crate) fn set_conversation_id(&mut self, conversation_id: String) {
        self.conversation_id = Some(conversation_id);
    }

    /// Forget the conversation so the next prompt starts a new one.
    pub fn clear_conversation(&mut self) {
        self.conversation_id = None;
    }

    /// Advisory connectivity flag (display only).
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Set the connectivity flag.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}
