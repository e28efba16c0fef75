//! Path management for Storybook configuration files.
//!
//! Everything lives under one configuration directory, resolved with `dirs`
//! or pinned to an explicit base directory (tests, portable installs).
//!
//! ```text
//! ~/.config/storybook/
//! ├── config.toml    # Generation settings
//! └── secret.json    # API keys
//! ```

use std::path::{Path, PathBuf};
use storybook_core::config::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GeminiConfig, SecretConfig};

const APP_DIR: &str = "storybook";
const CONFIG_FILE: &str = "config.toml";
const SECRET_FILE: &str = "secret.json";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Neither a base directory nor a platform config directory is available.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves Storybook's configuration paths.
#[derive(Debug, Clone, Default)]
pub struct StorybookPaths {
    base: Option<PathBuf>,
}

impl StorybookPaths {
    /// `base` replaces the platform configuration directory when given.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// `<platform config dir>/storybook`, or the base directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    /// Path to `secret.json`. Keep it readable by the owner only.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(SECRET_FILE))
    }

    /// Writes a `secret.json` template unless one already exists.
    ///
    /// Returns the path and whether the file was created. On Unix the new
    /// file gets mode 600.
    pub fn ensure_secret_file(&self) -> std::io::Result<(PathBuf, bool)> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok((secret_path, false));
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_TEXT_MODEL.to_string()),
                image_model_name: Some(DEFAULT_IMAGE_MODEL.to_string()),
            }),
        };
        let template_json = serde_json::to_string_pretty(&template).map_err(std::io::Error::other)?;
        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!(path = %secret_path.display(), "Created secret template");
        Ok((secret_path, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorybookPaths::new(Some(dir.path()));

        assert_eq!(paths.config_dir().unwrap(), dir.path());
        assert_eq!(paths.config_file().unwrap(), dir.path().join("config.toml"));
        assert_eq!(paths.secret_file().unwrap(), dir.path().join("secret.json"));
    }

    #[test]
    fn test_default_dir_ends_with_app_name() {
        if let Ok(config_dir) = StorybookPaths::default().config_dir() {
            assert!(config_dir.ends_with("storybook"));
        }
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorybookPaths::new(Some(&dir.path().join("nested")));

        let (path, created) = paths.ensure_secret_file().unwrap();
        assert!(created);
        let written: SecretConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let gemini = written.gemini.unwrap();
        assert!(gemini.api_key.is_empty());
        assert_eq!(gemini.model_name.as_deref(), Some(DEFAULT_TEXT_MODEL));

        std::fs::write(&path, r#"{"gemini":{"api_key":"kept"}}"#).unwrap();
        let (_, created) = paths.ensure_secret_file().unwrap();
        assert!(!created);
        assert!(std::fs::read_to_string(&path).unwrap().contains("kept"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
