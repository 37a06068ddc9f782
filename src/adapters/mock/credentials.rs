//! In-memory credentials provider for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::traits::{Credentials, CredentialsError, CredentialsProvider};

/// Which operation should report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Load,
    Save,
    Clear,
}

/// In-memory credentials provider.
///
/// Clones share storage, so a test can keep one handle and give the other
/// to the code under test.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    stored: Arc<Mutex<Option<Credentials>>>,
    fail_on: Arc<Mutex<Option<FailOn>>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that already holds `api_key`.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let provider = Self::new();
        provider.set_credentials(Some(Credentials::with_api_key(api_key)));
        provider
    }

    /// Make one operation fail until reset with `None`.
    pub fn set_fail_on(&self, fail_on: Option<FailOn>) {
        *self.fail_on.lock().unwrap() = fail_on;
    }

    /// Current contents, bypassing the async trait.
    pub fn get_credentials(&self) -> Option<Credentials> {
        self.stored.lock().unwrap().clone()
    }

    pub fn set_credentials(&self, creds: Option<Credentials>) {
        *self.stored.lock().unwrap() = creds;
    }

    fn should_fail(&self, op: FailOn) -> bool {
        *self.fail_on.lock().unwrap() == Some(op)
    }
}

#[async_trait]
impl CredentialsProvider for InMemoryCredentials {
    async fn load(&self) -> Result<Option<Credentials>, CredentialsError> {
        if self.should_fail(FailOn::Load) {
            return Err(CredentialsError::LoadFailed("Mock load failure".to_string()));
        }
        Ok(self
            .get_credentials()
            .filter(|creds| creds.api_key().is_some()))
    }

    async fn save(&self, creds: &Credentials) -> Result<(), CredentialsError> {
        if self.should_fail(FailOn::Save) {
            return Err(CredentialsError::SaveFailed("Mock save failure".to_string()));
        }
        self.set_credentials(Some(creds.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        if self.should_fail(FailOn::Clear) {
            return Err(CredentialsError::ClearFailed("Mock clear failure".to_string()));
        }
        self.set_credentials(None);
        Ok(())
    }
}
