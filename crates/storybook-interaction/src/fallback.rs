//! Deterministic content served when no generation backend is usable.

use storybook_core::gateway::PANELS_PER_PAGE;
use storybook_core::{PanelScript, PanelType, StoryPage, StoryStructure};

const STORY_TITLE: &str = "The Brave Little Robot";
const EMPTY_CHUNK: &str = "The end of this page!";

struct DemoPage {
    title: &'static str,
    text: &'static str,
    character: &'static str,
    scene: &'static str,
}

const DEMO_PAGES: [DemoPage; 8] = [
    DemoPage {
        title: "The Discovery",
        text: "In a small workshop, a brave little robot named Sparky was built by a kind inventor. Sparky had bright blue eyes and a curious nature that made him special.",
        character: "A small silver robot with bright blue LED eyes, copper accents, and a friendly digital smile. Wears a small red cape.",
        scene: "A cozy workshop filled with tools, gears, and warm golden light streaming through a window.",
    },
    DemoPage {
        title: "The Journey Begins",
        text: "One day, Sparky decided to explore the world beyond the workshop. He rolled out the door and into a magical garden filled with glowing flowers.",
        character: "The same small silver robot, now outside, looking around with wonder in his bright blue eyes.",
        scene: "A mystical garden with luminescent flowers, ancient oak trees, and floating orbs of soft light.",
    },
    DemoPage {
        title: "New Friends",
        text: "In the garden, Sparky met a wise old owl and a colorful butterfly. They became fast friends and showed him the wonders of nature.",
        character: "Sparky the robot with a wise owl wearing spectacles and a beautiful butterfly with rainbow wings.",
        scene: "The magical garden with the three friends sitting together under a glowing tree.",
    },
    DemoPage {
        title: "The Adventure",
        text: "Together, they discovered a hidden cave behind a waterfall. Inside, they found crystals that glowed with magical energy.",
        character: "Sparky, the owl, and butterfly exploring a mysterious cave with glowing crystals.",
        scene: "A hidden cave with sparkling crystals, a gentle waterfall, and mysterious shadows.",
    },
    DemoPage {
        title: "The Challenge",
        text: "Suddenly, the cave began to shake! A friendly dragon appeared, explaining that the crystals were losing their power and needed help.",
        character: "A gentle green dragon with kind eyes, Sparky and his friends looking up in amazement.",
        scene: "The cave interior with glowing crystals dimming, the dragon's scales reflecting the crystal light.",
    },
    DemoPage {
        title: "Working Together",
        text: "Sparky used his mechanical skills to fix the crystal generator, while his friends helped gather the right materials. Teamwork made everything possible!",
        character: "Sparky working on machinery, the owl organizing materials, the butterfly carrying small parts, and the dragon watching proudly.",
        scene: "The cave with the crystal generator glowing brightly, tools and materials scattered around.",
    },
    DemoPage {
        title: "Success!",
        text: "The crystals glowed brighter than ever! The dragon was grateful and invited everyone to a celebration in the garden.",
        character: "All four friends celebrating together, the crystals shining brilliantly around them.",
        scene: "The magical garden at night, with glowing crystals, fireflies, and a beautiful starry sky.",
    },
    DemoPage {
        title: "Home Sweet Home",
        text: "Sparky returned to the workshop, but now he knew he had friends in the magical garden. He would visit them often and share many more adventures.",
        character: "Sparky back in the workshop, looking out the window toward the garden with a happy expression.",
        scene: "The cozy workshop with the magical garden visible through the window, bathed in golden light.",
    },
];

/// The demo story. The idea is not used; every caller gets the same story.
pub fn fallback_story() -> StoryStructure {
    StoryStructure {
        title: STORY_TITLE.to_string(),
        pages: DEMO_PAGES.iter().map(demo_page).collect(),
    }
}

fn demo_page(page: &DemoPage) -> StoryPage {
    StoryPage {
        title: page.title.to_string(),
        panels: split_words(page.text, PANELS_PER_PAGE)
            .into_iter()
            .map(|text| PanelScript {
                text,
                character_description: Some(page.character.to_string()),
                scene_description: Some(page.scene.to_string()),
                panel_type: Some(PanelType::Main),
            })
            .collect(),
    }
}

/// Splits `text` into exactly `parts` runs of whole words whose sizes differ
/// by at most one. Runs that would be empty get a closing line instead.
pub fn split_words(text: &str, parts: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    (0..parts)
        .map(|i| {
            let start = i * words.len() / parts;
            let end = (i + 1) * words.len() / parts;
            if start == end {
                EMPTY_CHUNK.to_string()
            } else {
                words[start..end].join(" ")
            }
        })
        .collect()
}

pub fn character_description(prompt: &str) -> String {
    format!(
        "A character based on: {prompt}. Add more details about appearance, clothing, and personality."
    )
}

pub fn enhanced_prompt(prompt: &str) -> String {
    format!("{prompt}. Add more visual details, lighting, and atmosphere.")
}
