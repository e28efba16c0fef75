use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use storybook_core::{
    CommandStatus, IdAllocator, PanelCommand, PanelDraft, PanelPatch, StorySession,
};

/// Deterministic allocator so scenario assertions can name ids.
#[derive(Default)]
struct SequentialIds {
    next: AtomicU64,
}

impl IdAllocator for SequentialIds {
    fn new_id(&self) -> String {
        format!("p{}", self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }
}

fn session() -> StorySession {
    StorySession::with_allocator(Arc::new(SequentialIds::default()))
}

fn prompts(session: &StorySession) -> Vec<String> {
    session.panels().iter().map(|p| p.prompt.clone()).collect()
}

#[test]
fn test_undo_then_new_edit_discards_redo_branch() {
    let mut session = session();

    session.dispatch(PanelCommand::AddPanel(PanelDraft::new("a")));
    session.dispatch(PanelCommand::AddPanel(PanelDraft::new("b")));
    assert_eq!(prompts(&session), vec!["a", "b"]);
    assert_eq!(session.history().cursor(), 2);

    session.dispatch(PanelCommand::Undo);
    assert_eq!(prompts(&session), vec!["a"]);
    assert_eq!(session.history().cursor(), 1);

    session.dispatch(PanelCommand::AddPanel(PanelDraft::new("c")));
    assert_eq!(prompts(&session), vec!["a", "c"]);
    assert_eq!(session.history().len(), 3);
    assert!(!session.can_redo());

    let logged: Vec<Vec<String>> = session
        .history()
        .snapshots()
        .iter()
        .map(|snapshot| snapshot.iter().map(|p| p.prompt.clone()).collect())
        .collect();
    assert_eq!(
        logged,
        vec![
            Vec::<String>::new(),
            vec!["a".to_string()],
            vec!["a".to_string(), "c".to_string()],
        ]
    );
}

#[test]
fn test_log_counts_history_appending_commands() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut session = session();
    let mut appended = 0usize;

    for _ in 0..500 {
        let ids: Vec<String> = session.panels().iter().map(|p| p.id.clone()).collect();
        let command = match rng.gen_range(0..7) {
            0 | 1 => PanelCommand::AddPanel(PanelDraft::new("panel")),
            2 if !ids.is_empty() => PanelCommand::UpdatePanel {
                id: ids[rng.gen_range(0..ids.len())].clone(),
                patch: PanelPatch::new().prompt("edited"),
            },
            3 if !ids.is_empty() => {
                PanelCommand::DeletePanel(ids[rng.gen_range(0..ids.len())].clone())
            }
            4 => {
                let mut order = session.panels().to_vec();
                order.reverse();
                PanelCommand::ReorderPanels(order)
            }
            5 => PanelCommand::Undo,
            _ => PanelCommand::Redo,
        };
        let appends = command.kind().appends_history();
        let navigates = matches!(command, PanelCommand::Undo | PanelCommand::Redo);

        let len_before = session.history().len();
        let cursor_before = session.history().cursor();
        let outcome = session.dispatch(command);

        if appends {
            assert_eq!(outcome.status, CommandStatus::Committed);
            assert_eq!(session.history().cursor(), session.history().len() - 1);
            assert_eq!(session.history().len(), cursor_before + 2);
            appended += 1;
        } else {
            assert!(navigates);
            assert_eq!(session.history().len(), len_before);
        }
        assert_eq!(
            &*session.snapshot(),
            &*session.history().snapshots()[session.history().cursor()]
        );
    }

    // Undo truncation means the log is bounded by the appends, never larger.
    assert!(session.history().len() <= 1 + appended);
}

#[test]
fn test_log_length_without_undo_is_one_plus_appends() {
    let mut session = session();
    let mut appended = 0;
    for i in 0..20 {
        session.dispatch(PanelCommand::AddPanel(PanelDraft::new(format!("p{i}"))));
        appended += 1;
        session.dispatch(PanelCommand::SetGenerating(i % 2 == 0));
        if i % 3 == 0 {
            session.dispatch(PanelCommand::SaveState);
            appended += 1;
        }
        assert_eq!(session.history().len(), 1 + appended);
        assert_eq!(session.history().cursor(), session.history().len() - 1);
    }
}

#[test]
fn test_undo_redo_round_trip_at_every_position() {
    let mut session = session();
    for i in 0..6 {
        session.dispatch(PanelCommand::AddPanel(PanelDraft::new(format!("p{i}"))));
    }

    for _ in 0..6 {
        let before = session.snapshot();
        session.dispatch(PanelCommand::Undo);
        session.dispatch(PanelCommand::Redo);
        assert!(Arc::ptr_eq(&before, &session.snapshot()));
        session.dispatch(PanelCommand::Undo);
    }
    assert_eq!(session.history().cursor(), 0);
}

#[test]
fn test_add_panel_allocates_fresh_ids() {
    let mut session = StorySession::new();
    for i in 0..50 {
        let before = session.panels().len();
        session.dispatch(PanelCommand::AddPanel(PanelDraft::new(format!("p{i}"))));
        assert_eq!(session.panels().len(), before + 1);
    }
    let ids: HashSet<&str> = session.panels().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn test_delete_removes_exactly_one() {
    let mut session = session();
    for prompt in ["a", "b", "c", "d"] {
        session.dispatch(PanelCommand::AddPanel(PanelDraft::new(prompt)));
    }
    let target = session.panels()[2].id.clone();

    session.dispatch(PanelCommand::DeletePanel(target.clone()));

    assert_eq!(prompts(&session), vec!["a", "b", "d"]);
    let outcome = session.dispatch(PanelCommand::DeletePanel(target.clone()));
    assert_eq!(outcome.status, CommandStatus::PanelNotFound { id: target });
    assert_eq!(prompts(&session), vec!["a", "b", "d"]);
}

#[test]
fn test_reorder_changes_order_only() {
    let mut session = session();
    for prompt in ["a", "b", "c"] {
        session.dispatch(PanelCommand::AddPanel(PanelDraft::new(prompt)));
    }
    let mut order = session.panels().to_vec();
    let moved = order.remove(0);
    order.insert(2, moved);

    let outcome = session.dispatch(PanelCommand::ReorderPanels(order));

    assert_eq!(outcome.status, CommandStatus::Committed);
    assert_eq!(prompts(&session), vec!["b", "c", "a"]);
    let mut ids: Vec<String> = session.panels().iter().map(|p| p.id.clone()).collect();
    ids.sort();
    assert_eq!(ids, vec!["p0", "p1", "p2"]);
}

#[test]
fn test_reorder_ignores_edited_payload_fields() {
    let mut session = session();
    for prompt in ["a", "b"] {
        session.dispatch(PanelCommand::AddPanel(PanelDraft::new(prompt)));
    }
    let stored = session.panels().to_vec();
    let mut order = stored.clone();
    order.reverse();
    order[1].created_at = DateTime::<Utc>::UNIX_EPOCH;
    order[1].prompt = "edited in transit".into();

    let outcome = session.dispatch(PanelCommand::ReorderPanels(order));

    assert_eq!(outcome.status, CommandStatus::Committed);
    assert_eq!(prompts(&session), vec!["b", "a"]);
    assert_eq!(session.panels()[1], stored[0]);
    assert_eq!(session.panels()[1].created_at, stored[0].created_at);
}

#[test]
fn test_clear_all_resets_from_any_state() {
    let mut session = session();
    for prompt in ["a", "b", "c"] {
        session.dispatch(PanelCommand::AddPanel(PanelDraft::new(prompt)));
    }
    session.dispatch(PanelCommand::Undo);

    session.dispatch(PanelCommand::ClearAll);

    assert!(session.panels().is_empty());
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().cursor(), 0);
    assert!(session.history().snapshots()[0].is_empty());
}

#[test]
fn test_panel_without_image_is_a_regular_member() {
    let mut session = session();
    session.dispatch(PanelCommand::AddPanel(
        PanelDraft::new("no art").with_image_url(None),
    ));
    let id = session.panels()[0].id.clone();

    let outcome = session.dispatch(PanelCommand::UpdatePanel {
        id,
        patch: PanelPatch::new().image_url(None),
    });

    assert_eq!(outcome.status, CommandStatus::Committed);
    assert!(!session.panels()[0].has_image());
}
