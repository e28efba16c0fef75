//! Prompt templates sent to the generation backend.

use crate::error::AgentError;
use minijinja::{Environment, context};
use storybook_core::ImageRequest;
use storybook_core::gateway::{MAX_PAGES, MIN_PAGES, PANELS_PER_PAGE};

const STORY_STRUCTURE: &str = r#"Create a complete children's comic book story based on this idea: "{{ idea }}"

Return only a JSON object with this structure:
{
  "title": "Story Title",
  "pages": [
    {
      "title": "Page Title",
      "panels": [
        {
          "text": "Dialogue or narration for this panel (1-2 sentences)",
          "characterDescription": "Character description for this specific panel",
          "sceneDescription": "Scene description for this specific panel",
          "panelType": "main" or "small" or "wide"
        }
      ]
    }
  ]
}

Requirements:
- Create {{ min_pages }}-{{ max_pages }} pages for a complete comic book
- Each page must have exactly {{ panels_per_page }} panels (two rows of three)
- Each panel should advance the story with dialogue or action
- Keep the characters consistent from panel to panel
- Make it suitable for children (ages 5-12), engaging and educational"#;

const PANEL_IMAGE: &str = r#"Create a beautiful children's storybook illustration.
{%- if character %} Character: {{ character }}.{% endif %}
{%- if scene %} Scene: {{ scene }}.{% endif %} Additional details: {{ prompt }}. Style: {{ style }}. Make it colorful, engaging, and suitable for children."#;

const CHARACTER_DESCRIPTION: &str = r#"Create a detailed character description for a children's storybook based on this prompt: "{{ prompt }}".
Include physical appearance, clothing, personality traits, and distinctive features.
Keep it concise but descriptive for consistent illustration generation."#;

const ENHANCE_PROMPT: &str = r#"Enhance this image generation prompt for a children's storybook: "{{ prompt }}".
{%- if context %}
Context: {{ context }}
{%- endif %}
Make it more descriptive, visual, and suitable for AI image generation.
Include details about lighting, composition, and visual style."#;

fn environment() -> Result<Environment<'static>, AgentError> {
    let mut env = Environment::new();
    env.add_template("story_structure", STORY_STRUCTURE)?;
    env.add_template("panel_image", PANEL_IMAGE)?;
    env.add_template("character_description", CHARACTER_DESCRIPTION)?;
    env.add_template("enhance_prompt", ENHANCE_PROMPT)?;
    Ok(env)
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, AgentError> {
    let env = environment()?;
    Ok(env.get_template(name)?.render(ctx)?)
}

pub fn story_structure(idea: &str) -> Result<String, AgentError> {
    render(
        "story_structure",
        context! {
            idea => idea.trim(),
            min_pages => MIN_PAGES,
            max_pages => MAX_PAGES,
            panels_per_page => PANELS_PER_PAGE,
        },
    )
}

pub fn panel_image(request: &ImageRequest) -> Result<String, AgentError> {
    render(
        "panel_image",
        context! {
            prompt => request.prompt.trim(),
            character => request.character_description.as_deref().map(str::trim),
            scene => request.scene_description.as_deref().map(str::trim),
            style => request.style.to_string(),
        },
    )
}

pub fn character_description(prompt: &str) -> Result<String, AgentError> {
    render("character_description", context! { prompt => prompt.trim() })
}

pub fn enhance_prompt(prompt: &str, context: Option<&str>) -> Result<String, AgentError> {
    render(
        "enhance_prompt",
        context! { prompt => prompt.trim(), context => context.map(str::trim) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use storybook_core::ImageStyle;

    #[test]
    fn test_story_structure_mentions_shape() {
        let prompt = story_structure("  a lost kitten  ").unwrap();
        assert!(prompt.contains(r#"based on this idea: "a lost kitten""#));
        assert!(prompt.contains("Create 4-6 pages"));
        assert!(prompt.contains("exactly 6 panels"));
    }

    #[test]
    fn test_panel_image_includes_optional_parts() {
        let request = ImageRequest::new("waving hello")
            .with_descriptions(Some("a tall giraffe".into()), None)
            .with_style(ImageStyle::Watercolor);
        let prompt = panel_image(&request).unwrap();

        assert!(prompt.contains("Character: a tall giraffe."));
        assert!(!prompt.contains("Scene:"));
        assert!(prompt.contains("Additional details: waving hello."));
        assert!(prompt.contains("Style: watercolor."));
    }

    #[test]
    fn test_enhance_prompt_context_is_optional() {
        let with = enhance_prompt("a castle", Some("at dusk")).unwrap();
        assert!(with.contains("Context: at dusk"));
        let without = enhance_prompt("a castle", None).unwrap();
        assert!(!without.contains("Context:"));
    }

    #[test]
    fn test_character_description_quotes_prompt() {
        let prompt = character_description("brave mouse").unwrap();
        assert!(prompt.contains(r#""brave mouse""#));
    }
}
