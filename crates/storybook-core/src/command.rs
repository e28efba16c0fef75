//! Panel commands and the pure transition function behind them.
//!
//! `transition` computes what a command does to the current document
//! without touching history; `StorySession::dispatch` applies the result.

use crate::id::IdAllocator;
use crate::panel::{Panel, PanelDraft, PanelPatch};
use std::collections::{HashMap, HashSet};
use strum::{EnumDiscriminants, EnumIter};

/// The closed set of operations accepted by a story session.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(CommandKind))]
#[strum_discriminants(derive(EnumIter, strum::Display, Hash))]
#[strum_discriminants(strum(serialize_all = "SCREAMING_SNAKE_CASE"))]
pub enum PanelCommand {
    /// Appends a new panel with a freshly allocated id and timestamp.
    AddPanel(PanelDraft),
    /// Shallow-merges `patch` into the panel with `id`.
    UpdatePanel { id: String, patch: PanelPatch },
    /// Removes the panel with the given id.
    DeletePanel(String),
    /// Rearranges the document into the order of the given panels.
    ///
    /// Only the ids of the payload are used; panel contents come from the
    /// document.
    ReorderPanels(Vec<Panel>),
    /// Commits the current document again as a checkpoint.
    SaveState,
    Undo,
    Redo,
    /// Empties the document and resets history.
    ClearAll,
    /// Session-scoped character note; not recorded in history.
    SetCharacterDescription(String),
    /// Session-scoped busy flag; not recorded in history.
    SetGenerating(bool),
}

impl PanelCommand {
    pub fn kind(&self) -> CommandKind {
        CommandKind::from(self)
    }
}

impl CommandKind {
    /// Whether a command of this kind always appends exactly one snapshot
    /// when it is accepted.
    pub fn appends_history(self) -> bool {
        match self {
            CommandKind::AddPanel
            | CommandKind::UpdatePanel
            | CommandKind::DeletePanel
            | CommandKind::ReorderPanels
            | CommandKind::SaveState => true,
            CommandKind::Undo
            | CommandKind::Redo
            | CommandKind::ClearAll
            | CommandKind::SetCharacterDescription
            | CommandKind::SetGenerating => false,
        }
    }
}

/// Direction of a history navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Undo,
    Redo,
}

/// Session-scoped state changes that bypass history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    CharacterDescription(String),
    Generating(bool),
}

/// Why a reorder payload was refused.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReorderMismatch {
    /// Ids present in the document but absent from the payload
    pub missing: Vec<String>,
    /// Ids in the payload that the document does not contain
    pub unexpected: Vec<String>,
    /// Ids that appear more than once in the payload
    pub duplicated: Vec<String>,
}

impl std::fmt::Display for ReorderMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reorder is not a permutation (missing: [{}], unexpected: [{}], duplicated: [{}])",
            self.missing.join(", "),
            self.unexpected.join(", "),
            self.duplicated.join(", ")
        )
    }
}

/// Result of running a command against the current document.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Commit `next`. `missing_id` is set when the command addressed an id
    /// that the document does not contain (the document is unchanged).
    Commit {
        next: Vec<Panel>,
        missing_id: Option<String>,
    },
    Navigate(Navigation),
    Reset,
    Session(SessionChange),
    Reject(ReorderMismatch),
}

/// Computes the effect of `command` on `current`.
///
/// Pure apart from id/timestamp allocation for `AddPanel`.
pub fn transition(current: &[Panel], command: PanelCommand, ids: &dyn IdAllocator) -> Transition {
    match command {
        PanelCommand::AddPanel(draft) => {
            let panel = Panel::from_draft(draft, ids.new_id(), ids.now());
            let mut next = current.to_vec();
            next.push(panel);
            Transition::Commit {
                next,
                missing_id: None,
            }
        }
        PanelCommand::UpdatePanel { id, patch } => {
            let mut found = false;
            let next = current
                .iter()
                .map(|panel| {
                    let mut panel = panel.clone();
                    if panel.id == id {
                        found = true;
                        panel.apply(&patch);
                    }
                    panel
                })
                .collect();
            Transition::Commit {
                next,
                missing_id: (!found).then_some(id),
            }
        }
        PanelCommand::DeletePanel(id) => {
            let next: Vec<Panel> = current.iter().filter(|p| p.id != id).cloned().collect();
            let found = next.len() != current.len();
            Transition::Commit {
                next,
                missing_id: (!found).then_some(id),
            }
        }
        PanelCommand::ReorderPanels(order) => match check_permutation(current, &order) {
            Ok(()) => Transition::Commit {
                next: reordered(current, &order),
                missing_id: None,
            },
            Err(mismatch) => Transition::Reject(mismatch),
        },
        PanelCommand::SaveState => Transition::Commit {
            next: current.to_vec(),
            missing_id: None,
        },
        PanelCommand::Undo => Transition::Navigate(Navigation::Undo),
        PanelCommand::Redo => Transition::Navigate(Navigation::Redo),
        PanelCommand::ClearAll => Transition::Reset,
        PanelCommand::SetCharacterDescription(text) => {
            Transition::Session(SessionChange::CharacterDescription(text))
        }
        PanelCommand::SetGenerating(flag) => Transition::Session(SessionChange::Generating(flag)),
    }
}

/// Clones the stored panels of `current` in the id order of `order`.
///
/// `order` must already have passed `check_permutation`.
fn reordered(current: &[Panel], order: &[Panel]) -> Vec<Panel> {
    let stored: HashMap<&str, &Panel> = current.iter().map(|p| (p.id.as_str(), p)).collect();
    order
        .iter()
        .filter_map(|panel| stored.get(panel.id.as_str()).map(|p| (*p).clone()))
        .collect()
}

/// Checks that `order` holds exactly the ids of `current`, each once.
pub fn check_permutation(current: &[Panel], order: &[Panel]) -> Result<(), ReorderMismatch> {
    let known: HashSet<&str> = current.iter().map(|p| p.id.as_str()).collect();

    let mut mismatch = ReorderMismatch::default();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for panel in order {
        let id = panel.id.as_str();
        let times = seen.entry(id).or_default();
        *times += 1;
        match (known.contains(id), *times) {
            (false, 1) => mismatch.unexpected.push(id.to_string()),
            (true, 2) => mismatch.duplicated.push(id.to_string()),
            _ => {}
        }
    }
    for panel in current {
        if !seen.contains_key(panel.id.as_str()) {
            mismatch.missing.push(panel.id.clone());
        }
    }

    if mismatch == ReorderMismatch::default() {
        Ok(())
    } else {
        Err(mismatch)
    }
}
