//! Generation gateway interface.
//!
//! The gateway is the boundary to the text/image generation service. Its
//! methods do not return errors: implementations absorb backend failures
//! and answer with the deterministic fallback story, a fallback string, or
//! `None` for images. Nothing in this crate calls a gateway; callers turn
//! its answers into [`PanelCommand`](crate::command::PanelCommand)s.

use crate::error::{Result, StoryError};
use crate::panel::PanelType;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Every story page is composed of exactly this many panels.
pub const PANELS_PER_PAGE: usize = 6;
/// Fewest pages accepted from a live model.
pub const MIN_PAGES: usize = 4;
/// Most pages accepted from a live model.
pub const MAX_PAGES: usize = 6;

/// Script for one panel of a generated page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PanelScript {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_description: Option<String>,
    /// Unrecognised layout hints from the model are dropped.
    #[serde(
        default,
        deserialize_with = "lenient_panel_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub panel_type: Option<PanelType>,
}

fn lenient_panel_type<'de, D>(deserializer: D) -> std::result::Result<Option<PanelType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|hint| hint.trim().to_ascii_lowercase().parse().ok()))
}

/// One generated page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StoryPage {
    pub title: String,
    pub panels: Vec<PanelScript>,
}

/// Generated story outline: a title and its pages.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StoryStructure {
    pub title: String,
    pub pages: Vec<StoryPage>,
}

impl StoryStructure {
    /// Checks the shape required of live-model output: a title,
    /// `MIN_PAGES..=MAX_PAGES` pages, `PANELS_PER_PAGE` panels each.
    pub fn validate(&self) -> Result<()> {
        self.validate_panels()?;
        if !(MIN_PAGES..=MAX_PAGES).contains(&self.pages.len()) {
            return Err(StoryError::malformed(format!(
                "expected {}-{} pages, got {}",
                MIN_PAGES,
                MAX_PAGES,
                self.pages.len()
            )));
        }
        Ok(())
    }

    /// Checks only the per-page shape (title present, six non-empty panels).
    ///
    /// This is the guarantee every story, including the fallback, gives
    /// downstream consumers.
    pub fn validate_panels(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(StoryError::malformed("story title is empty"));
        }
        if self.pages.is_empty() {
            return Err(StoryError::malformed("story has no pages"));
        }
        for (index, page) in self.pages.iter().enumerate() {
            if page.panels.len() != PANELS_PER_PAGE {
                return Err(StoryError::malformed(format!(
                    "page {} has {} panels, expected {}",
                    index + 1,
                    page.panels.len(),
                    PANELS_PER_PAGE
                )));
            }
            if page.panels.iter().any(|panel| panel.text.trim().is_empty()) {
                return Err(StoryError::malformed(format!(
                    "page {} has a panel without text",
                    index + 1
                )));
            }
        }
        Ok(())
    }

    pub fn panel_count(&self) -> usize {
        self.pages.iter().map(|page| page.panels.len()).sum()
    }
}

/// Illustration style requested from the image backend.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageStyle {
    #[default]
    Cartoon,
    Realistic,
    Watercolor,
    Sketch,
}

/// Input for a single image generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageRequest {
    pub prompt: String,
    pub character_description: Option<String>,
    pub scene_description: Option<String>,
    pub style: ImageStyle,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_descriptions(
        mut self,
        character_description: Option<String>,
        scene_description: Option<String>,
    ) -> Self {
        self.character_description = character_description;
        self.scene_description = scene_description;
        self
    }

    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = style;
        self
    }
}

/// Boundary to the generative text/image service.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Produces a story outline for `idea`. Falls back to a deterministic
    /// demo story when the backend is absent, fails, or answers malformed.
    async fn generate_story_structure(&self, idea: &str) -> StoryStructure;

    /// Produces artwork for one panel, or `None` when nothing could be
    /// generated. Callers must not substitute a placeholder for `None`.
    async fn generate_image(&self, request: &ImageRequest) -> Option<String>;

    async fn generate_character_description(&self, prompt: &str) -> String;

    async fn enhance_prompt(&self, prompt: &str, context: Option<&str>) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(panels: usize) -> StoryPage {
        StoryPage {
            title: "Page".into(),
            panels: (0..panels)
                .map(|i| PanelScript {
                    text: format!("panel {i}"),
                    ..PanelScript::default()
                })
                .collect(),
        }
    }

    fn story(pages: usize, panels: usize) -> StoryStructure {
        StoryStructure {
            title: "A story".into(),
            pages: (0..pages).map(|_| page(panels)).collect(),
        }
    }

    #[test]
    fn test_validate_accepts_required_shape() {
        for pages in MIN_PAGES..=MAX_PAGES {
            assert!(story(pages, PANELS_PER_PAGE).validate().is_ok());
        }
    }

    #[test]
    fn test_validate_rejects_wrong_panel_count() {
        let err = story(4, 5).validate().unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("page 1 has 5 panels"));
    }

    #[test]
    fn test_validate_rejects_page_count_out_of_range() {
        assert!(story(3, PANELS_PER_PAGE).validate().is_err());
        assert!(story(7, PANELS_PER_PAGE).validate().is_err());
        assert!(story(8, PANELS_PER_PAGE).validate_panels().is_ok());
    }

    #[test]
    fn test_structure_parses_camel_case() {
        let json = r#"{
            "title": "T",
            "pages": [{"title": "P", "panels": [
                {"text": "hi", "characterDescription": "c", "panelType": "wide"}
            ]}]
        }"#;
        let parsed: StoryStructure = serde_json::from_str(json).unwrap();
        let panel = &parsed.pages[0].panels[0];
        assert_eq!(panel.character_description.as_deref(), Some("c"));
        assert_eq!(panel.panel_type, Some(PanelType::Wide));
        assert_eq!(panel.scene_description, None);
    }

    #[test]
    fn test_unknown_panel_type_is_dropped() {
        let json = r#"[
            {"text": "a", "panelType": "splash"},
            {"text": "b", "panelType": 3},
            {"text": "c", "panelType": null},
            {"text": "d", "panelType": "Small"}
        ]"#;
        let panels: Vec<PanelScript> = serde_json::from_str(json).unwrap();
        let types: Vec<_> = panels.iter().map(|p| p.panel_type).collect();
        assert_eq!(types, vec![None, None, None, Some(PanelType::Small)]);
    }

    #[test]
    fn test_image_style_parsing() {
        use std::str::FromStr;
        assert_eq!(ImageStyle::from_str("watercolor").unwrap(), ImageStyle::Watercolor);
        assert_eq!(ImageStyle::default().to_string(), "cartoon");
    }
}
