//! Story editing session.
//!
//! `StorySession` is the single owner of a document's history. It is built
//! once per editing session and handed by reference to whoever needs to
//! read or mutate the document. All mutation goes through [`StorySession::dispatch`].

use crate::command::{
    CommandKind, Navigation, PanelCommand, ReorderMismatch, SessionChange, Transition, transition,
};
use crate::history::{HistoryStore, Snapshot};
use crate::id::{ClockIdAllocator, IdAllocator};
use crate::panel::Panel;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// A new snapshot was appended to history.
    Committed,
    /// UPDATE/DELETE addressed an unknown id. The unchanged document was
    /// still committed.
    PanelNotFound { id: String },
    /// The reorder payload was not a permutation of the document; nothing
    /// was committed.
    ReorderRejected(ReorderMismatch),
    /// Document emptied and history reset to its seed.
    HistoryReset,
    Undone,
    Redone,
    NothingToUndo,
    NothingToRedo,
    /// Session-scoped state changed; history untouched.
    SessionUpdated,
}

impl CommandStatus {
    /// True for statuses a caller may want to surface to the user.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            CommandStatus::PanelNotFound { .. } | CommandStatus::ReorderRejected(_)
        )
    }
}

/// Outcome of [`StorySession::dispatch`]: the document to render plus a status.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub snapshot: Snapshot,
    pub status: CommandStatus,
}

/// Panels grouped for page-by-page display.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryPageView<'a> {
    /// `None` collects panels that carry no page number
    pub page_number: Option<u32>,
    pub panels: Vec<&'a Panel>,
}

/// A process-local editing session over one story document.
pub struct StorySession {
    id: String,
    history: HistoryStore,
    current: Snapshot,
    character_description: String,
    is_generating: bool,
    ids: Arc<dyn IdAllocator>,
}

impl StorySession {
    /// Creates an empty session using the wall-clock id allocator.
    pub fn new() -> Self {
        Self::with_allocator(Arc::new(ClockIdAllocator))
    }

    /// Creates an empty session that takes panel identities from `ids`.
    pub fn with_allocator(ids: Arc<dyn IdAllocator>) -> Self {
        let history = HistoryStore::new();
        let current = history.current();
        Self {
            id: Uuid::new_v4().to_string(),
            history,
            current,
            character_description: String::new(),
            is_generating: false,
            ids,
        }
    }

    /// Applies a command and returns the resulting document.
    ///
    /// Never fails: anomalies are reported through [`CommandStatus`].
    pub fn dispatch(&mut self, command: PanelCommand) -> CommandOutcome {
        let kind = command.kind();
        let status = match transition(&self.current, command, self.ids.as_ref()) {
            Transition::Commit { next, missing_id } => {
                self.history.commit(next);
                self.current = self.history.current();
                match missing_id {
                    Some(id) => CommandStatus::PanelNotFound { id },
                    None => CommandStatus::Committed,
                }
            }
            Transition::Navigate(Navigation::Undo) => {
                let moved = self.history.can_undo();
                self.current = self.history.undo();
                if moved {
                    CommandStatus::Undone
                } else {
                    CommandStatus::NothingToUndo
                }
            }
            Transition::Navigate(Navigation::Redo) => {
                let moved = self.history.can_redo();
                self.current = self.history.redo();
                if moved {
                    CommandStatus::Redone
                } else {
                    CommandStatus::NothingToRedo
                }
            }
            Transition::Reset => {
                self.history.reset();
                self.current = self.history.current();
                CommandStatus::HistoryReset
            }
            Transition::Session(SessionChange::CharacterDescription(text)) => {
                self.character_description = text;
                CommandStatus::SessionUpdated
            }
            Transition::Session(SessionChange::Generating(flag)) => {
                self.is_generating = flag;
                CommandStatus::SessionUpdated
            }
            Transition::Reject(mismatch) => CommandStatus::ReorderRejected(mismatch),
        };

        self.log_dispatch(kind, &status);
        CommandOutcome {
            snapshot: Arc::clone(&self.current),
            status,
        }
    }

    fn log_dispatch(&self, kind: CommandKind, status: &CommandStatus) {
        if status.is_anomaly() {
            tracing::warn!(
                session_id = %self.id,
                command = %kind,
                ?status,
                "Command applied with anomaly"
            );
        } else {
            tracing::debug!(
                session_id = %self.id,
                command = %kind,
                ?status,
                cursor = self.history.cursor(),
                history_len = self.history.len(),
                panels = self.current.len(),
                "Command dispatched"
            );
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current document, cheap to clone.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.current)
    }

    pub fn panels(&self) -> &[Panel] {
        &self.current
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.current.iter().find(|p| p.id == id)
    }

    /// Panel at a 0-based display position.
    pub fn panel_at(&self, index: usize) -> Option<&Panel> {
        self.current.get(index)
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn character_description(&self) -> &str {
        &self.character_description
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    /// Groups the document by page number, pages ascending, unnumbered
    /// panels last. Order within a page follows document order.
    pub fn pages(&self) -> Vec<StoryPageView<'_>> {
        let mut numbered: BTreeMap<u32, Vec<&Panel>> = BTreeMap::new();
        let mut loose = Vec::new();
        for panel in self.current.iter() {
            match panel.page_number {
                Some(page) => numbered.entry(page).or_default().push(panel),
                None => loose.push(panel),
            }
        }

        let mut pages: Vec<StoryPageView<'_>> = numbered
            .into_iter()
            .map(|(page, panels)| StoryPageView {
                page_number: Some(page),
                panels,
            })
            .collect();
        if !loose.is_empty() {
            pages.push(StoryPageView {
                page_number: None,
                panels: loose,
            });
        }
        pages
    }
}

impl Default for StorySession {
    fn default() -> Self {
        Self::new()
    }
}
