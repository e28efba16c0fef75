//! Configuration domain types.
//!
//! `SecretConfig` mirrors `secret.json`, `RootConfig` mirrors `config.toml`.
//! Loading lives in `storybook-infrastructure`.

use crate::gateway::ImageStyle;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Gemini API configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub image_model_name: Option<String>,
}

impl GeminiConfig {
    /// An empty key counts as no configuration.
    pub fn is_usable(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn text_model(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_TEXT_MODEL)
    }

    pub fn image_model(&self) -> &str {
        self.image_model_name.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL)
    }
}

/// Root structure of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

impl SecretConfig {
    /// The Gemini section if it carries a non-empty key.
    pub fn usable_gemini(&self) -> Option<&GeminiConfig> {
        self.gemini.as_ref().filter(|config| config.is_usable())
    }
}

/// `[generation]` section of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    pub image_style: ImageStyle,
    pub request_timeout_secs: u64,
    pub max_concurrent_images: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            image_style: ImageStyle::default(),
            request_timeout_secs: 60,
            max_concurrent_images: 6,
        }
    }
}

/// Root structure of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RootConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
}
