//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` and caches it.

use crate::paths::StorybookPaths;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storybook_core::StoryError;
use storybook_core::config::RootConfig;
use tokio::sync::RwLock;

/// Loads and caches [`RootConfig`].
///
/// A missing file yields the defaults. A file that cannot be read or parsed
/// also yields the defaults, with a warning.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file_path: Option<PathBuf>,
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    pub fn new(base_path: Option<&Path>) -> Self {
        let file_path = match StorybookPaths::new(base_path).config_file() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Config path unavailable, using defaults: {}", e);
                None
            }
        };
        Self {
            file_path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it on first access.
    pub async fn get_config(&self) -> RootConfig {
        if let Some(cached) = self.config.read().await.as_ref() {
            return cached.clone();
        }

        let loaded = match self.load_config().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Falling back to default configuration: {}", e);
                RootConfig::default()
            }
        };
        *self.config.write().await = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub async fn invalidate_cache(&self) {
        *self.config.write().await = None;
    }

    async fn load_config(&self) -> storybook_core::Result<RootConfig> {
        let Some(path) = &self.file_path else {
            return Ok(RootConfig::default());
        };
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RootConfig::default()),
            Err(e) => Err(StoryError::from(e)),
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(None)
    }
}
