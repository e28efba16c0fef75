//! Core domain for Storybook.
//!
//! Holds the panel model and the undo/redo-capable document that the rest of
//! the workspace edits through a closed set of commands:
//!
//! - `panel`: `Panel`, `SubPanel`, `PanelDraft`, `PanelPatch`
//! - `id`: panel identifier/timestamp allocation
//! - `history`: linear snapshot log with a cursor
//! - `command`: `PanelCommand` and its pure transition function
//! - `session`: `StorySession`, the single owner of a document's history
//! - `gateway`: the text/image generation boundary (interface only)
//!
//! # Usage
//!
//! ```
//! use storybook_core::{PanelCommand, PanelDraft, StorySession};
//!
//! let mut session = StorySession::new();
//! session.dispatch(PanelCommand::AddPanel(PanelDraft::new("A robot wakes up")));
//! session.dispatch(PanelCommand::Undo);
//! assert!(session.panels().is_empty());
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod id;
pub mod panel;
pub mod secret;
pub mod session;

pub use command::{CommandKind, PanelCommand, ReorderMismatch};
pub use error::{Result, StoryError};
pub use gateway::{
    GenerationGateway, ImageRequest, ImageStyle, PANELS_PER_PAGE, PanelScript, StoryPage,
    StoryStructure,
};
pub use history::{HistoryStore, Snapshot};
pub use id::{ClockIdAllocator, IdAllocator};
pub use panel::{Panel, PanelDraft, PanelPatch, PanelType, SubPanel};
pub use session::{CommandOutcome, CommandStatus, StorySession};
