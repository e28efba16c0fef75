use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "storybook")]
#[command(
    about = "Storybook - generate and edit illustrated multi-page stories",
    long_about = None
)]
struct Cli {
    /// Use this directory instead of ~/.config/storybook
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a complete story from an idea
    Generate {
        /// What the story should be about
        idea: String,
        /// Print the resulting document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a story interactively (undo/redo-capable)
    Edit,
    /// Write a secret.json template
    Init,
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Generate { idea, json } => {
            init_tracing("info");
            commands::generate::run(config_dir, &idea, json).await?
        }
        Commands::Edit => {
            init_tracing("warn");
            commands::edit::run(config_dir).await?
        }
        Commands::Init => {
            init_tracing("info");
            commands::init::run(config_dir)?
        }
    }

    Ok(())
}
