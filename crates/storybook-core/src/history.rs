//! Linear undo/redo history of panel snapshots.
//!
//! The log always holds at least one entry (the empty document) and the
//! cursor always points into it. Committing after an undo discards the redo
//! tail; branches are never merged.

use crate::panel::Panel;
use std::sync::Arc;

/// Immutable copy of the full panel sequence at one point in history.
pub type Snapshot = Arc<[Panel]>;

fn empty_snapshot() -> Snapshot {
    Arc::from(Vec::<Panel>::new())
}

/// Ordered log of snapshots plus a cursor selecting the current one.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    log: Vec<Snapshot>,
    cursor: usize,
}

impl HistoryStore {
    /// Creates a store seeded with a single empty snapshot.
    pub fn new() -> Self {
        Self {
            log: vec![empty_snapshot()],
            cursor: 0,
        }
    }

    /// Truncates everything after the cursor, appends `next` and moves the
    /// cursor onto it.
    pub fn commit(&mut self, next: impl Into<Snapshot>) {
        self.log.truncate(self.cursor + 1);
        self.log.push(next.into());
        self.cursor += 1;
    }

    /// Steps back one snapshot. At the start of history this is a no-op.
    pub fn undo(&mut self) -> Snapshot {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.current()
    }

    /// Steps forward one snapshot. At the end of history this is a no-op.
    pub fn redo(&mut self) -> Snapshot {
        if self.can_redo() {
            self.cursor += 1;
        }
        self.current()
    }

    pub fn current(&self) -> Snapshot {
        Arc::clone(&self.log[self.cursor])
    }

    /// Restores the freshly seeded state.
    pub fn reset(&mut self) {
        self.log.clear();
        self.log.push(empty_snapshot());
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of snapshots in the log (never zero).
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.log.len()
    }

    /// All snapshots in chronological order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.log
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
