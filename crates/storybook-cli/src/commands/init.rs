use anyhow::{Context, Result};
use std::path::Path;
use storybook_infrastructure::StorybookPaths;

pub fn run(config_dir: Option<&Path>) -> Result<()> {
    let (path, created) = StorybookPaths::new(config_dir)
        .ensure_secret_file()
        .context("Failed to write secret.json")?;

    if created {
        println!("Created {}", path.display());
        println!("Add your Gemini API key to it, or set GEMINI_API_KEY.");
    } else {
        println!("{} already exists, leaving it untouched.", path.display());
    }
    Ok(())
}
