//! Secret service implementation.
//!
//! Reads `secret.json` once and caches it. `GEMINI_API_KEY` in the
//! environment takes precedence over the key stored in the file.

use crate::paths::StorybookPaths;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storybook_core::config::{GeminiConfig, SecretConfig};
use storybook_core::secret::SecretService;
use tokio::sync::RwLock;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// File-backed [`SecretService`].
///
/// # Example
///
/// ```ignore
/// use storybook_infrastructure::SecretServiceImpl;
/// use storybook_core::secret::SecretService;
///
/// let service = SecretServiceImpl::new(None)?;
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    file_path: PathBuf,
    env_api_key: Option<String>,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    /// Resolves `secret.json` under `base_path` (or the platform config
    /// directory) and captures `GEMINI_API_KEY` from the environment.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let file_path = StorybookPaths::new(base_path)
            .secret_file()
            .map_err(|e| anyhow::anyhow!("Failed to get secret path: {}", e))?;
        let env_api_key = std::env::var(API_KEY_ENV).ok();
        Ok(Self::with_file(file_path).with_env_api_key(env_api_key))
    }

    /// Reads secrets from an explicit file, without any environment override.
    pub fn with_file(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            env_api_key: None,
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    /// Replaces the environment override. Blank keys are ignored.
    pub fn with_env_api_key(mut self, api_key: Option<String>) -> Self {
        self.env_api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Drops the cached secrets so the next load re-reads the file.
    pub async fn invalidate_cache(&self) {
        *self.secrets.write().await = None;
    }

    async fn read_file(&self) -> Result<SecretConfig, String> {
        match tokio::fs::read_to_string(&self.file_path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                format!("Failed to parse {}: {}", self.file_path.display(), e)
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.file_path.display(), "No secret file, using defaults");
                Ok(SecretConfig::default())
            }
            Err(e) => Err(format!("Failed to read {}: {}", self.file_path.display(), e)),
        }
    }

    fn apply_env_override(&self, mut secrets: SecretConfig) -> SecretConfig {
        if let Some(api_key) = &self.env_api_key {
            let gemini = secrets.gemini.get_or_insert_with(GeminiConfig::default);
            gemini.api_key = api_key.clone();
        }
        secrets
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        if let Some(cached) = self.secrets.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.apply_env_override(self.read_file().await?);
        *self.secrets.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.file_path).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let service = SecretServiceImpl::with_file(dir.path().join("secret.json"));

        assert!(!service.secret_file_exists().await);
        let secrets = service.load_secrets().await.unwrap();
        assert_eq!(secrets, SecretConfig::default());
        assert!(secrets.usable_gemini().is_none());
    }

    #[tokio::test]
    async fn test_env_key_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini":{"api_key":"file-key","model_name":"m"}}"#).unwrap();

        let service = SecretServiceImpl::with_file(&path).with_env_api_key(Some("env-key".into()));
        let secrets = service.load_secrets().await.unwrap();

        let gemini = secrets.usable_gemini().unwrap();
        assert_eq!(gemini.api_key, "env-key");
        assert_eq!(gemini.model_name.as_deref(), Some("m"));
    }

    #[tokio::test]
    async fn test_blank_env_key_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let service = SecretServiceImpl::with_file(dir.path().join("secret.json"))
            .with_env_api_key(Some("   ".into()));

        let secrets = service.load_secrets().await.unwrap();
        assert!(secrets.gemini.is_none());
    }

    #[tokio::test]
    async fn test_cache_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini":{"api_key":"one"}}"#).unwrap();
        let service = SecretServiceImpl::with_file(&path);

        assert_eq!(service.load_secrets().await.unwrap().gemini.unwrap().api_key, "one");
        std::fs::write(&path, r#"{"gemini":{"api_key":"two"}}"#).unwrap();
        assert_eq!(service.load_secrets().await.unwrap().gemini.unwrap().api_key, "one");

        service.invalidate_cache().await;
        assert_eq!(service.load_secrets().await.unwrap().gemini.unwrap().api_key, "two");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SecretServiceImpl::with_file(&path).load_secrets().await.unwrap_err();
        assert!(err.contains("Failed to parse"));
    }
}
