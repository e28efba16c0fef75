//! Story generation use case.
//!
//! `StoryUseCase` drives a [`GenerationGateway`] and turns its answers into
//! [`PanelCommand`]s. It never touches a session: the caller decides whether
//! and when to dispatch what it returns, so a result that arrives after the
//! document was cleared is simply not applied.

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use std::sync::Arc;
use storybook_core::config::GenerationConfig;
use storybook_core::{
    GenerationGateway, ImageRequest, ImageStyle, Panel, PanelCommand, PanelDraft, PanelPatch,
    StoryStructure, SubPanel,
};

/// Prompt used for a page whose first panel has no text.
pub const EMPTY_PAGE_PROMPT: &str = "No text available";

/// A page of a generated story, artwork resolved.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletePage {
    /// 1-based
    pub page_number: u32,
    pub title: String,
    pub panels: Vec<SubPanel>,
}

/// A generated story with every panel's artwork attempted.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompleteStory {
    pub title: String,
    pub pages: Vec<CompletePage>,
}

impl CompleteStory {
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Number of panels that ended up with artwork.
    pub fn illustrated_panels(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|page| &page.panels)
            .filter(|panel| panel.has_image())
            .count()
    }
}

pub struct StoryUseCase {
    gateway: Arc<dyn GenerationGateway>,
    style: ImageStyle,
    max_concurrent_images: usize,
}

impl StoryUseCase {
    pub fn new(gateway: Arc<dyn GenerationGateway>, config: &GenerationConfig) -> Self {
        Self {
            gateway,
            style: config.image_style,
            max_concurrent_images: config.max_concurrent_images.max(1),
        }
    }

    pub fn style(&self) -> ImageStyle {
        self.style
    }

    /// Generates a story outline and the artwork for all of its panels.
    ///
    /// Image requests for every page are issued as one batch, at most
    /// `max_concurrent_images` at a time. A panel whose image fails keeps
    /// `image_url = None`.
    pub async fn generate_story(&self, idea: &str) -> CompleteStory {
        let structure = self.gateway.generate_story_structure(idea).await;
        tracing::info!(
            title = %structure.title,
            pages = structure.pages.len(),
            panels = structure.panel_count(),
            "Generating panel artwork"
        );

        let requests: Vec<ImageRequest> = structure
            .pages
            .iter()
            .flat_map(|page| &page.panels)
            .map(|panel| {
                ImageRequest::new(panel.text.clone())
                    .with_descriptions(
                        panel.character_description.clone(),
                        panel.scene_description.clone(),
                    )
                    .with_style(self.style)
            })
            .collect();

        let gateway = &self.gateway;
        let images: Vec<Option<String>> = stream::iter(requests)
            .map(|request| async move { gateway.generate_image(&request).await })
            .buffered(self.max_concurrent_images)
            .collect()
            .await;

        let story = assemble(structure, images);
        tracing::info!(
            illustrated = story.illustrated_panels(),
            "Story generation finished"
        );
        story
    }

    /// Commands that replace the document with `story`: `ClearAll`, then one
    /// `AddPanel` per page.
    pub fn story_commands(story: &CompleteStory) -> Vec<PanelCommand> {
        let mut commands = Vec::with_capacity(story.pages.len() + 1);
        commands.push(PanelCommand::ClearAll);
        commands.extend(story.pages.iter().map(|page| {
            let first = page.panels.first();
            let prompt = first
                .map(|panel| panel.text.trim())
                .filter(|text| !text.is_empty())
                .unwrap_or(EMPTY_PAGE_PROMPT);
            PanelCommand::AddPanel(PanelDraft {
                prompt: prompt.to_string(),
                character_description: first.and_then(|p| p.character_description.clone()),
                scene_description: first.and_then(|p| p.scene_description.clone()),
                image_url: first.and_then(|p| p.image_url.clone()),
                page_number: Some(page.page_number),
                title: Some(page.title.clone()),
                sub_panels: page.panels.clone(),
            })
        }));
        commands
    }

    /// Generates artwork for an existing panel.
    ///
    /// Returns the `UpdatePanel` command to dispatch, or `None` when no image
    /// was produced; the panel then stays as it is.
    pub async fn panel_image_command(&self, panel: &Panel) -> Option<PanelCommand> {
        let request = ImageRequest::new(panel.prompt.clone())
            .with_descriptions(
                panel.character_description.clone(),
                panel.scene_description.clone(),
            )
            .with_style(self.style);
        let image_url = self.gateway.generate_image(&request).await?;
        Some(PanelCommand::UpdatePanel {
            id: panel.id.clone(),
            patch: PanelPatch::new().image_url(Some(image_url)),
        })
    }

    /// Builds the `AddPanel` payload for a hand-written panel, optionally
    /// illustrated.
    pub async fn draft_panel(
        &self,
        prompt: &str,
        character_description: Option<String>,
        scene_description: Option<String>,
        with_image: bool,
    ) -> PanelDraft {
        let character_description = character_description.filter(|text| !text.trim().is_empty());
        let scene_description = scene_description.filter(|text| !text.trim().is_empty());

        let image_url = if with_image {
            let request = ImageRequest::new(prompt)
                .with_descriptions(character_description.clone(), scene_description.clone())
                .with_style(self.style);
            self.gateway.generate_image(&request).await
        } else {
            None
        };

        PanelDraft {
            prompt: prompt.to_string(),
            character_description,
            scene_description,
            image_url,
            ..PanelDraft::default()
        }
    }

    pub async fn describe_character(&self, prompt: &str) -> String {
        self.gateway.generate_character_description(prompt).await
    }

    pub async fn enhance_prompt(&self, prompt: &str, context: Option<&str>) -> String {
        self.gateway.enhance_prompt(prompt, context).await
    }
}

fn assemble(structure: StoryStructure, images: Vec<Option<String>>) -> CompleteStory {
    let mut images = images.into_iter();
    let pages = structure
        .pages
        .into_iter()
        .zip(1u32..)
        .map(|(page, page_number)| CompletePage {
            page_number,
            title: page.title,
            panels: page
                .panels
                .into_iter()
                .zip(1u32..)
                .map(|(panel, panel_number)| SubPanel {
                    text: panel.text,
                    character_description: panel.character_description,
                    scene_description: panel.scene_description,
                    panel_type: panel.panel_type,
                    image_url: images.next().flatten(),
                    panel_number: Some(panel_number),
                })
                .collect(),
        })
        .collect();

    CompleteStory {
        title: structure.title,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storybook_core::{PanelScript, StoryPage};

    fn structure() -> StoryStructure {
        StoryStructure {
            title: "T".into(),
            pages: (0..2)
                .map(|p| StoryPage {
                    title: format!("Page {}", p + 1),
                    panels: (0..3)
                        .map(|i| PanelScript {
                            text: format!("p{p}-{i}"),
                            ..PanelScript::default()
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_assemble_numbers_and_orders_images() {
        let images = (0..6)
            .map(|i| (i % 2 == 0).then(|| format!("img{i}")))
            .collect();
        let story = assemble(structure(), images);

        assert_eq!(story.total_pages(), 2);
        assert_eq!(story.pages[1].page_number, 2);
        let second = &story.pages[1].panels;
        assert_eq!(second[0].panel_number, Some(1));
        assert_eq!(second[2].panel_number, Some(3));
        assert_eq!(story.pages[0].panels[0].image_url.as_deref(), Some("img0"));
        assert_eq!(story.pages[0].panels[1].image_url, None);
        assert_eq!(second[0].image_url, None);
        assert_eq!(second[1].image_url.as_deref(), Some("img4"));
        assert_eq!(story.illustrated_panels(), 3);
    }

    #[test]
    fn test_story_commands_blank_first_panel() {
        let story = CompleteStory {
            title: "T".into(),
            pages: vec![CompletePage {
                page_number: 1,
                title: "Empty".into(),
                panels: vec![SubPanel::default()],
            }],
        };
        let commands = StoryUseCase::story_commands(&story);

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], PanelCommand::ClearAll);
        match &commands[1] {
            PanelCommand::AddPanel(draft) => {
                assert_eq!(draft.prompt, EMPTY_PAGE_PROMPT);
                assert_eq!(draft.title.as_deref(), Some("Empty"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
