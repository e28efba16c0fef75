//! Turns raw model output into a validated [`StoryStructure`].

use regex::Regex;
use std::sync::LazyLock;
use storybook_core::{Result, StoryStructure};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:json)?\s*(.*?)\s*```$").expect("code fence pattern is valid")
});

/// Removes a surrounding Markdown code fence, if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    CODE_FENCE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |body| body.as_str())
}

/// Parses model output and checks it has the required story shape.
pub fn parse_story_structure(raw: &str) -> Result<StoryStructure> {
    let json = strip_code_fences(raw);
    let story: StoryStructure = serde_json::from_str(json)?;
    story.validate()?;
    Ok(story)
}
