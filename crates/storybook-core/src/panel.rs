//! Panel domain model.
//!
//! A `Panel` is one unit of story content. When a panel stands for a full
//! comic page it carries up to six `SubPanel` fragments in reading order.
//! Absence of an image is a normal state, never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Layout hint for a sub-panel within a comic page.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PanelType {
    /// Regular panel
    #[default]
    Main,
    /// Narrow inset panel
    Small,
    /// Full-width panel
    Wide,
}

/// One illustrated fragment of a comic page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubPanel {
    /// Dialogue or narration shown in this fragment
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_type: Option<PanelType>,
    /// Generated artwork (usually a `data:` URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 1-based position within the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_number: Option<u32>,
}

impl SubPanel {
    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }
}

/// A story panel as held in the document.
///
/// `id` and `created_at` are assigned once by the session's allocator and
/// never change. Every other field is editable through `PanelPatch`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    /// Unique identifier (`panel-<millis>-<random>`)
    pub id: String,
    /// Creation time; display metadata only, sequence order is authoritative
    pub created_at: DateTime<Utc>,
    /// Free-form description of the panel content
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_panels: Vec<SubPanel>,
}

impl Panel {
    /// Materializes a draft into a panel with the given identity.
    pub fn from_draft(draft: PanelDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            prompt: draft.prompt,
            character_description: draft.character_description,
            scene_description: draft.scene_description,
            image_url: draft.image_url,
            page_number: draft.page_number,
            title: draft.title,
            sub_panels: draft.sub_panels,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }

    /// Applies a shallow merge of `patch` onto this panel.
    ///
    /// Identity fields are not part of a patch and stay untouched.
    pub fn apply(&mut self, patch: &PanelPatch) {
        if let Some(prompt) = &patch.prompt {
            self.prompt = prompt.clone();
        }
        merge(&mut self.character_description, &patch.character_description);
        merge(&mut self.scene_description, &patch.scene_description);
        merge(&mut self.image_url, &patch.image_url);
        merge(&mut self.page_number, &patch.page_number);
        merge(&mut self.title, &patch.title);
        if let Some(sub_panels) = &patch.sub_panels {
            self.sub_panels = sub_panels.clone();
        }
    }
}

fn merge<T: Clone>(field: &mut Option<T>, update: &Option<Option<T>>) {
    if let Some(value) = update {
        *field = value.clone();
    }
}

/// ADD_PANEL payload: every panel field except `id` and `created_at`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PanelDraft {
    pub prompt: String,
    #[serde(default)]
    pub character_description: Option<String>,
    #[serde(default)]
    pub scene_description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sub_panels: Vec<SubPanel>,
}

impl PanelDraft {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_character_description(mut self, description: impl Into<String>) -> Self {
        self.character_description = Some(description.into());
        self
    }

    pub fn with_scene_description(mut self, description: impl Into<String>) -> Self {
        self.scene_description = Some(description.into());
        self
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_page(mut self, page_number: u32, title: impl Into<String>) -> Self {
        self.page_number = Some(page_number);
        self.title = Some(title.into());
        self
    }

    pub fn with_sub_panels(mut self, sub_panels: Vec<SubPanel>) -> Self {
        self.sub_panels = sub_panels;
        self
    }
}

/// UPDATE_PANEL payload.
///
/// `None` leaves a field untouched. For optional panel fields,
/// `Some(None)` clears the value and `Some(Some(v))` sets it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelPatch {
    pub prompt: Option<String>,
    pub character_description: Option<Option<String>>,
    pub scene_description: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub page_number: Option<Option<u32>>,
    pub title: Option<Option<String>>,
    pub sub_panels: Option<Vec<SubPanel>>,
}

impl PanelPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn character_description(mut self, description: Option<String>) -> Self {
        self.character_description = Some(description);
        self
    }

    pub fn scene_description(mut self, description: Option<String>) -> Self {
        self.scene_description = Some(description);
        self
    }

    pub fn image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = Some(image_url);
        self
    }

    pub fn page_number(mut self, page_number: Option<u32>) -> Self {
        self.page_number = Some(page_number);
        self
    }

    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = Some(title);
        self
    }

    pub fn sub_panels(mut self, sub_panels: Vec<SubPanel>) -> Self {
        self.sub_panels = Some(sub_panels);
        self
    }

    /// True when applying this patch cannot change any panel.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
