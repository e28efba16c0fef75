//! [`GenerationGateway`] backed by Gemini, with offline fallbacks.

use crate::error::AgentError;
use crate::fallback;
use crate::gemini_api_agent::GeminiApiAgent;
use crate::prompts;
use crate::story_parser::parse_story_structure;
use async_trait::async_trait;
use std::time::Duration;
use storybook_core::config::{GenerationConfig, SecretConfig};
use storybook_core::{GenerationGateway, ImageRequest, StoryStructure};

/// Gateway that talks to Gemini when a key is configured.
///
/// Without an agent every call answers from [`fallback`]. With one, any
/// failure is logged and answered the same way.
#[derive(Debug, Clone, Default)]
pub struct GeminiGateway {
    agent: Option<GeminiApiAgent>,
}

impl GeminiGateway {
    pub fn new(agent: GeminiApiAgent) -> Self {
        Self { agent: Some(agent) }
    }

    /// A gateway that never touches the network.
    pub fn offline() -> Self {
        Self { agent: None }
    }

    pub fn from_config(secrets: &SecretConfig, generation: &GenerationConfig) -> Self {
        match secrets.usable_gemini().and_then(GeminiApiAgent::from_config) {
            Some(agent) => {
                let agent =
                    agent.with_timeout(Duration::from_secs(generation.request_timeout_secs.max(1)));
                tracing::info!(
                    model = agent.model(),
                    image_model = agent.image_model(),
                    "Gemini gateway configured"
                );
                Self::new(agent)
            }
            None => {
                tracing::info!("No Gemini API key configured, generation runs offline");
                Self::offline()
            }
        }
    }

    pub fn is_online(&self) -> bool {
        self.agent.is_some()
    }

    async fn try_story(agent: &GeminiApiAgent, idea: &str) -> Result<StoryStructure, String> {
        let prompt = prompts::story_structure(idea).map_err(|e| e.to_string())?;
        let raw = agent.generate_text(&prompt).await.map_err(|e| e.to_string())?;
        parse_story_structure(&raw).map_err(|e| e.to_string())
    }

    async fn try_text(
        agent: &GeminiApiAgent,
        prompt: Result<String, AgentError>,
    ) -> Result<String, AgentError> {
        let text = agent.generate_text(&prompt?).await?;
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn generate_story_structure(&self, idea: &str) -> StoryStructure {
        let Some(agent) = &self.agent else {
            tracing::warn!("Offline: serving the demo story");
            return fallback::fallback_story();
        };

        tracing::info!(idea_len = idea.len(), "Generating story structure");
        match Self::try_story(agent, idea).await {
            Ok(story) => {
                tracing::info!(
                    title = %story.title,
                    pages = story.pages.len(),
                    "Story structure generated"
                );
                story
            }
            Err(e) => {
                tracing::warn!("Story generation failed, serving the demo story: {}", e);
                fallback::fallback_story()
            }
        }
    }

    async fn generate_image(&self, request: &ImageRequest) -> Option<String> {
        let agent = self.agent.as_ref()?;

        let prompt = match prompts::panel_image(request) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!("Image prompt could not be rendered: {}", e);
                return None;
            }
        };
        match agent.generate_image(&prompt).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(retryable = e.is_retryable(), "Image generation failed: {}", e);
                None
            }
        }
    }

    async fn generate_character_description(&self, prompt: &str) -> String {
        let Some(agent) = &self.agent else {
            return fallback::character_description(prompt);
        };
        match Self::try_text(agent, prompts::character_description(prompt)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Character description failed, using fallback: {}", e);
                fallback::character_description(prompt)
            }
        }
    }

    async fn enhance_prompt(&self, prompt: &str, context: Option<&str>) -> String {
        let Some(agent) = &self.agent else {
            return fallback::enhanced_prompt(prompt);
        };
        match Self::try_text(agent, prompts::enhance_prompt(prompt, context)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Prompt enhancement failed, using fallback: {}", e);
                fallback::enhanced_prompt(prompt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storybook_core::config::GeminiConfig;

    #[test]
    fn test_from_config_without_key_is_offline() {
        let gateway =
            GeminiGateway::from_config(&SecretConfig::default(), &GenerationConfig::default());
        assert!(!gateway.is_online());

        let secrets = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "key".into(),
                ..GeminiConfig::default()
            }),
        };
        assert!(GeminiGateway::from_config(&secrets, &GenerationConfig::default()).is_online());
    }

    #[tokio::test]
    async fn test_offline_image_is_none() {
        let gateway = GeminiGateway::offline();
        assert_eq!(gateway.generate_image(&ImageRequest::new("a fox")).await, None);
    }
}
