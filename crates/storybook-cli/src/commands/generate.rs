use super::utils;
use anyhow::{Result, bail};
use colored::Colorize;
use std::path::Path;
use storybook_application::StoryUseCase;
use storybook_core::{PanelCommand, StorySession};

pub fn load_story(session: &mut StorySession, commands: Vec<PanelCommand>) {
    for command in commands {
        session.dispatch(command);
    }
}

pub async fn run(config_dir: Option<&Path>, idea: &str, json: bool) -> Result<()> {
    if idea.trim().is_empty() {
        bail!("Story idea must not be empty");
    }
    let usecase = utils::load_usecase(config_dir).await?;

    let mut session = StorySession::new();
    session.dispatch(PanelCommand::SetGenerating(true));
    let story = usecase.generate_story(idea).await;
    load_story(&mut session, StoryUseCase::story_commands(&story));
    session.dispatch(PanelCommand::SetGenerating(false));

    if json {
        println!("{}", serde_json::to_string_pretty(session.panels())?);
        return Ok(());
    }

    println!("{}", story.title.bright_magenta().bold());
    println!(
        "{}",
        format!(
            "{} pages, {} of {} panels illustrated",
            story.total_pages(),
            story.illustrated_panels(),
            story.pages.iter().map(|page| page.panels.len()).sum::<usize>()
        )
        .bright_black()
    );
    println!();
    utils::print_pages(&session);
    Ok(())
}
