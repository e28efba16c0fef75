use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use storybook_application::StoryUseCase;
use storybook_core::config::SecretConfig;
use storybook_core::secret::SecretService;
use storybook_core::{Panel, StorySession};
use storybook_infrastructure::{ConfigService, SecretServiceImpl};
use storybook_interaction::GeminiGateway;

/// Wires configuration, secrets and the Gemini gateway into a use case.
///
/// Unreadable secrets are reported and treated as absent.
pub async fn load_usecase(config_dir: Option<&Path>) -> Result<StoryUseCase> {
    let config = ConfigService::new(config_dir).get_config().await;
    let secret_service = SecretServiceImpl::new(config_dir)?;
    let secrets = secret_service.load_secrets().await.unwrap_or_else(|e| {
        tracing::warn!("Ignoring secret file: {}", e);
        SecretConfig::default()
    });

    let gateway = GeminiGateway::from_config(&secrets, &config.generation);
    if !gateway.is_online() {
        eprintln!(
            "{}",
            "No Gemini API key found: using the demo story and skipping images.".bright_black()
        );
    }
    Ok(StoryUseCase::new(Arc::new(gateway), &config.generation))
}

/// `"3. A robot wakes up [page 1] (image)"`
pub fn panel_line(index: usize, panel: &Panel) -> String {
    let mut line = format!("{}. {}", index + 1, panel.prompt);
    if let Some(page) = panel.page_number {
        line.push_str(&format!(" [page {page}]"));
    }
    line.push_str(if panel.has_image() { " (image)" } else { " (no image)" });
    line
}

pub fn print_panels(session: &StorySession) {
    if session.panels().is_empty() {
        println!("{}", "No panels yet.".bright_black());
        return;
    }
    for (index, panel) in session.panels().iter().enumerate() {
        println!("{}", panel_line(index, panel));
    }
}

pub fn print_panel(index: usize, panel: &Panel) {
    println!("{}", panel_line(index, panel).bold());
    println!("  id: {}", panel.id.bright_black());
    println!("  created: {}", panel.created_at.to_rfc3339().bright_black());
    if let Some(title) = &panel.title {
        println!("  title: {title}");
    }
    if let Some(character) = &panel.character_description {
        println!("  character: {character}");
    }
    if let Some(scene) = &panel.scene_description {
        println!("  scene: {scene}");
    }
    for sub in &panel.sub_panels {
        let number = sub.panel_number.map(|n| n.to_string()).unwrap_or_default();
        let art = if sub.has_image() { "image" } else { "no image" };
        println!("    {number}: {} ({art})", sub.text);
    }
}

pub fn print_pages(session: &StorySession) {
    let pages = session.pages();
    if pages.is_empty() {
        println!("{}", "No panels yet.".bright_black());
        return;
    }
    for page in pages {
        let heading = match page.page_number {
            Some(number) => format!("Page {number}"),
            None => "Unpaged".to_string(),
        };
        let title = page
            .panels
            .iter()
            .find_map(|panel| panel.title.as_deref())
            .unwrap_or_default();
        println!("{} {}", heading.bright_magenta().bold(), title.bold());
        for panel in &page.panels {
            if panel.sub_panels.is_empty() {
                println!("  {}", panel.prompt);
            }
            for sub in &panel.sub_panels {
                let number = sub.panel_number.map(|n| n.to_string()).unwrap_or_default();
                println!("  {number:>2}. {}", sub.text);
            }
        }
    }
}
