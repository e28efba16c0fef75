use super::{generate, utils};
use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::Path;
use storybook_application::StoryUseCase;
use storybook_core::{CommandOutcome, CommandStatus, PanelCommand, PanelPatch, StorySession};

const COMMANDS: &[(&str, &str)] = &[
    ("add", "add <prompt>                 append a panel"),
    ("update", "update <n> <prompt>          replace a panel's prompt"),
    ("scene", "scene <n> [text]             set or clear a panel's scene"),
    ("character", "character [text]             set or show the character"),
    ("describe", "describe <idea>              generate the character"),
    ("enhance", "enhance <n>                  enrich a panel's prompt"),
    ("image", "image <n>                    illustrate a panel"),
    ("delete", "delete <n>                   remove a panel"),
    ("move", "move <from> <to>             reorder panels"),
    ("generate", "generate <idea>              replace everything with a new story"),
    ("undo", "undo                         step back"),
    ("redo", "redo                         step forward"),
    ("save", "save                         record a checkpoint"),
    ("list", "list                         list panels"),
    ("show", "show <n>                     panel details"),
    ("story", "story                        panels grouped by page"),
    ("clear", "clear                        remove everything, forget history"),
    ("help", "help                         this text"),
    ("quit", "quit                         leave"),
];

/// One line of editor input. Panel positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EditCommand {
    Add(String),
    Update(usize, String),
    Scene(usize, Option<String>),
    Character(Option<String>),
    Describe(String),
    Enhance(usize),
    Image(usize),
    Delete(usize),
    Move(usize, usize),
    Generate(String),
    Undo,
    Redo,
    Save,
    List,
    Show(usize),
    Story,
    Clear,
    Help,
    Quit,
}

fn position(arg: Option<&str>, name: &str) -> Result<usize, String> {
    let raw = arg.ok_or_else(|| format!("{name} needs a panel number"))?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{raw}' is not a panel number")),
    }
}

fn text(rest: &str, name: &str) -> Result<String, String> {
    let rest = rest.trim();
    if rest.is_empty() {
        Err(format!("{name} needs some text"))
    } else {
        Ok(rest.to_string())
    }
}

fn optional_text(rest: &str) -> Option<String> {
    Some(rest.trim().to_string()).filter(|t| !t.is_empty())
}

fn split_first(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim_start()),
        None => (input, ""),
    }
}

fn parse(line: &str) -> Result<EditCommand, String> {
    let (word, rest) = split_first(line);
    let (arg, tail) = split_first(rest);
    let arg = Some(arg).filter(|a| !a.is_empty());

    let command = match word.to_lowercase().as_str() {
        "add" => EditCommand::Add(text(rest, "add")?),
        "update" => EditCommand::Update(position(arg, "update")?, text(tail, "update")?),
        "scene" => EditCommand::Scene(position(arg, "scene")?, optional_text(tail)),
        "character" => EditCommand::Character(optional_text(rest)),
        "describe" => EditCommand::Describe(text(rest, "describe")?),
        "enhance" => EditCommand::Enhance(position(arg, "enhance")?),
        "image" => EditCommand::Image(position(arg, "image")?),
        "delete" | "rm" => EditCommand::Delete(position(arg, "delete")?),
        "move" | "mv" => {
            let (to, _) = split_first(tail);
            let to = Some(to).filter(|t| !t.is_empty());
            EditCommand::Move(position(arg, "move")?, position(to, "move")?)
        }
        "generate" => EditCommand::Generate(text(rest, "generate")?),
        "undo" => EditCommand::Undo,
        "redo" => EditCommand::Redo,
        "save" => EditCommand::Save,
        "list" | "ls" => EditCommand::List,
        "show" => EditCommand::Show(position(arg, "show")?),
        "story" | "pages" => EditCommand::Story,
        "clear" => EditCommand::Clear,
        "help" | "?" => EditCommand::Help,
        "quit" | "exit" => EditCommand::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
    };
    Ok(command)
}

/// The document order after moving the panel at `from` to `to` (both 1-based).
fn moved_order(session: &StorySession, from: usize, to: usize) -> Result<PanelCommand, String> {
    let len = session.panels().len();
    if from > len || to > len {
        return Err(format!("There are {len} panels"));
    }
    let mut order = session.panels().to_vec();
    let panel = order.remove(from - 1);
    order.insert(to - 1, panel);
    Ok(PanelCommand::ReorderPanels(order))
}

fn panel_id(session: &StorySession, n: usize) -> Result<String, String> {
    session
        .panel_at(n - 1)
        .map(|panel| panel.id.clone())
        .ok_or_else(|| format!("No panel {n}; there are {}", session.panels().len()))
}

fn report(outcome: &CommandOutcome) {
    let message = match &outcome.status {
        CommandStatus::Committed => format!("ok ({} panels)", outcome.snapshot.len()),
        CommandStatus::PanelNotFound { id } => format!("panel {id} no longer exists"),
        CommandStatus::ReorderRejected(mismatch) => format!("reorder rejected: {mismatch}"),
        CommandStatus::HistoryReset => "cleared".to_string(),
        CommandStatus::Undone => format!("undone ({} panels)", outcome.snapshot.len()),
        CommandStatus::Redone => format!("redone ({} panels)", outcome.snapshot.len()),
        CommandStatus::NothingToUndo => "nothing to undo".to_string(),
        CommandStatus::NothingToRedo => "nothing to redo".to_string(),
        CommandStatus::SessionUpdated => "ok".to_string(),
    };
    if outcome.status.is_anomaly() {
        println!("{}", message.yellow());
    } else {
        println!("{}", message.bright_black());
    }
}

fn print_help() {
    for (_, usage) in COMMANDS {
        println!("  {usage}");
    }
}

/// Executes one command. Returns `false` when the editor should exit.
async fn execute(
    session: &mut StorySession,
    usecase: &StoryUseCase,
    command: EditCommand,
) -> Result<bool, String> {
    let outcome = match command {
        EditCommand::Add(prompt) => {
            let character = Some(session.character_description().to_string());
            let draft = usecase.draft_panel(&prompt, character, None, false).await;
            session.dispatch(PanelCommand::AddPanel(draft))
        }
        EditCommand::Update(n, prompt) => session.dispatch(PanelCommand::UpdatePanel {
            id: panel_id(session, n)?,
            patch: PanelPatch::new().prompt(prompt),
        }),
        EditCommand::Scene(n, scene) => session.dispatch(PanelCommand::UpdatePanel {
            id: panel_id(session, n)?,
            patch: PanelPatch::new().scene_description(scene),
        }),
        EditCommand::Character(Some(description)) => {
            session.dispatch(PanelCommand::SetCharacterDescription(description))
        }
        EditCommand::Character(None) => {
            match session.character_description() {
                "" => println!("{}", "No character set.".bright_black()),
                description => println!("{description}"),
            }
            return Ok(true);
        }
        EditCommand::Describe(idea) => {
            let description = usecase.describe_character(&idea).await;
            println!("{}", description.bright_blue());
            session.dispatch(PanelCommand::SetCharacterDescription(description))
        }
        EditCommand::Enhance(n) => {
            let id = panel_id(session, n)?;
            let prompt = session.panel_at(n - 1).map(|p| p.prompt.clone()).unwrap_or_default();
            let context = Some(session.character_description()).filter(|c| !c.is_empty());
            let enhanced = usecase.enhance_prompt(&prompt, context).await;
            println!("{}", enhanced.bright_blue());
            session.dispatch(PanelCommand::UpdatePanel {
                id,
                patch: PanelPatch::new().prompt(enhanced),
            })
        }
        EditCommand::Image(n) => {
            let panel = session
                .panel_at(n - 1)
                .cloned()
                .ok_or_else(|| format!("No panel {n}"))?;
            session.dispatch(PanelCommand::SetGenerating(true));
            let command = usecase.panel_image_command(&panel).await;
            session.dispatch(PanelCommand::SetGenerating(false));
            match command {
                Some(command) => session.dispatch(command),
                None => return Err("No image could be generated".to_string()),
            }
        }
        EditCommand::Delete(n) => {
            session.dispatch(PanelCommand::DeletePanel(panel_id(session, n)?))
        }
        EditCommand::Move(from, to) => session.dispatch(moved_order(session, from, to)?),
        EditCommand::Generate(idea) => {
            session.dispatch(PanelCommand::SetGenerating(true));
            let story = usecase.generate_story(&idea).await;
            generate::load_story(session, StoryUseCase::story_commands(&story));
            session.dispatch(PanelCommand::SetGenerating(false));
            println!("{}", story.title.bright_magenta().bold());
            utils::print_pages(session);
            return Ok(true);
        }
        EditCommand::Undo => session.dispatch(PanelCommand::Undo),
        EditCommand::Redo => session.dispatch(PanelCommand::Redo),
        EditCommand::Save => session.dispatch(PanelCommand::SaveState),
        EditCommand::List => {
            utils::print_panels(session);
            return Ok(true);
        }
        EditCommand::Show(n) => {
            let panel = session.panel_at(n - 1).ok_or_else(|| format!("No panel {n}"))?;
            utils::print_panel(n - 1, panel);
            return Ok(true);
        }
        EditCommand::Story => {
            utils::print_pages(session);
            return Ok(true);
        }
        EditCommand::Clear => session.dispatch(PanelCommand::ClearAll),
        EditCommand::Help => {
            print_help();
            return Ok(true);
        }
        EditCommand::Quit => return Ok(false),
    };
    report(&outcome);
    Ok(true)
}

/// Completion, hints and highlighting for editor commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        if self.commands.iter().any(|cmd| cmd == word) {
            let sep = if line.len() > word.len() { " " } else { "" };
            Owned(format!("{}{sep}{rest}", word.bright_cyan()))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

pub async fn run(config_dir: Option<&Path>) -> Result<()> {
    let usecase = utils::load_usecase(config_dir).await?;
    let mut session = StorySession::new();
    tracing::debug!(session_id = session.id(), "Editor session started");

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Storybook editor ===".bright_magenta().bold());
    println!("{}", "Type 'help' for commands, 'quit' to exit.".bright_black());
    println!();

    loop {
        let prompt = format!(
            "story[{}{}{}]> ",
            session.panels().len(),
            if session.can_undo() { " u" } else { "" },
            if session.can_redo() { " r" } else { "" },
        );
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match parse(trimmed) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message.red());
                        continue;
                    }
                };
                match execute(&mut session, &usecase, command).await {
                    Ok(true) => {}
                    Ok(false) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Err(message) => println!("{}", message.red()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
