//! File-based credentials provider.
//!
//! Stores the API key as `{"api_key": "..."}` in
//! `~/.ragchat/credentials.json`. On Unix the file is created with mode
//! 0600 so the key is readable by its owner only.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::CONFIG_DIR;
use crate::traits::{Credentials, CredentialsError, CredentialsProvider};

/// The credentials file name.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// File-based credentials provider.
#[derive(Debug, Clone)]
pub struct FileCredentialsProvider {
    path: PathBuf,
}

impl FileCredentialsProvider {
    /// Provider at the default location under the home directory.
    pub fn new() -> Result<Self, CredentialsError> {
        let home = dirs::home_dir().ok_or_else(|| {
            CredentialsError::Other("Failed to determine home directory".to_string())
        })?;
        Ok(Self::at_path(home.join(CONFIG_DIR).join(CREDENTIALS_FILE)))
    }

    /// Provider backed by an explicit file.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialsProvider for FileCredentialsProvider {
    async fn load(&self) -> Result<Option<Credentials>, CredentialsError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CredentialsError::LoadFailed(e.to_string())),
        };

        let creds: Credentials = serde_json::from_str(&contents).map_err(|e| {
            warn!(path = %self.path.display(), "Credentials file is not valid JSON");
            CredentialsError::Serialization(e.to_string())
        })?;

        // A file with a blank key counts as empty
        Ok(creds.api_key().is_some().then_some(creds))
    }

    async fn save(&self, creds: &Credentials) -> Result<(), CredentialsError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CredentialsError::SaveFailed(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(creds)
            .map_err(|e| CredentialsError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| CredentialsError::SaveFailed(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, permissions)
                .await
                .map_err(|e| CredentialsError::SaveFailed(e.to_string()))?;
        }

        debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialsError::ClearFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider(temp_dir: &TempDir) -> FileCredentialsProvider {
        FileCredentialsProvider::at_path(temp_dir.path().join(CONFIG_DIR).join(CREDENTIALS_FILE))
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(provider(&temp_dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let provider = provider(&temp_dir);

        provider.save(&Credentials::with_api_key("123")).await.unwrap();
        let loaded = provider.load().await.unwrap().unwrap();

        assert_eq!(loaded.api_key(), Some("123"));
        assert!(provider.credentials_path().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let provider = provider(&temp_dir);
        provider.save(&Credentials::with_api_key("123")).await.unwrap();

        let mode = std::fs::metadata(provider.credentials_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_blank_key_loads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let provider = provider(&temp_dir);
        provider.save(&Credentials::with_api_key("  ")).await.unwrap();

        assert_eq!(provider.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let provider = provider(&temp_dir);
        std::fs::create_dir_all(provider.credentials_path().parent().unwrap()).unwrap();
        std::fs::write(provider.credentials_path(), "not valid json").unwrap();

        let result = provider.load().await;
        assert!(matches!(result, Err(CredentialsError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let provider = provider(&temp_dir);
        provider.save(&Credentials::with_api_key("123")).await.unwrap();

        provider.clear().await.unwrap();
        provider.clear().await.unwrap();

        assert_eq!(provider.load().await.unwrap(), None);
    }
}
