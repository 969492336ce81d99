//! End-to-end editing scenarios through the public API.

use funnelkit_core::{
    BlockId, BlockKind, Command, Document, EditorConfig, EditorError, EditorSession, ImportError,
    Invariant, MemoryStorage, StepId, Storage,
};
use funnelkit_core::storage::{LAST_DOCUMENT_KEY, StorageWorker};
use serde_json::json;
use std::sync::Arc;

fn three_block_document() -> Document {
    Document::from_value(json!({
        "version": 1,
        "id": "quiz",
        "name": "Quiz",
        "steps": [{
            "id": "S1",
            "name": "Intro",
            "blocks": [
                { "id": "A", "type": "heading", "content": { "text": "A" }, "order": 0 },
                { "id": "B", "type": "text", "content": { "text": "B" }, "order": 1 },
                { "id": "C", "type": "button", "content": { "label": "C" }, "order": 2 }
            ]
        }],
        "activeStepId": "S1"
    }))
    .unwrap()
}

fn block_ids(doc: &Document, step: &str) -> Vec<String> {
    doc.step(&StepId::from(step))
        .unwrap()
        .blocks
        .iter()
        .map(|b| b.id.to_string())
        .collect()
}

#[test]
fn test_reorder_first_block_to_end() {
    let doc = three_block_document();
    let next = doc.reorder_blocks(&StepId::from("S1"), 0, 2);

    assert_eq!(block_ids(&next, "S1"), vec!["B", "C", "A"]);
    let orders: Vec<_> = next.active_step().blocks.iter().map(|b| b.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    // Input untouched
    assert_eq!(block_ids(&doc, "S1"), vec!["A", "B", "C"]);
}

#[test]
fn test_add_step_becomes_active() {
    let doc = Document::blank();
    let next = doc.add_step(None, None);

    assert_eq!(next.step_count(), 2);
    let new_step = next.step_at(1).unwrap();
    assert_eq!(next.active_step_id(), &new_step.id);
    assert_eq!(new_step.name, "Step 2");
}

#[test]
fn test_delete_only_step_rejected() {
    let mut session = EditorSession::new(three_block_document(), EditorConfig::default());
    let before = session.document().clone();

    let result = session.apply(Command::DeleteStep {
        step: StepId::from("S1"),
    });
    assert_eq!(
        result,
        Err(EditorError::InvariantViolation(Invariant::LastStep))
    );
    assert_eq!(session.document(), &before);
}

#[test]
fn test_add_update_undo_twice_restores_original() {
    let mut session = EditorSession::new(three_block_document(), EditorConfig::default());
    let original = session.document().clone();
    let step = StepId::from("S1");

    session
        .apply(Command::AddBlock {
            step: step.clone(),
            kind: BlockKind::Input,
            content: None,
            at: Some(1),
        })
        .unwrap();
    let added = session.selection().selected_block_id().cloned().unwrap();

    let mut content = serde_json::Map::new();
    content.insert("placeholder".into(), json!("you@example.com"));
    session
        .apply(Command::UpdateBlockContent {
            step,
            block: added,
            content,
        })
        .unwrap();

    assert!(session.undo().unwrap());
    assert!(session.undo().unwrap());
    assert_eq!(session.document(), &original);
    assert!(!session.can_undo());
}

#[test]
fn test_import_missing_active_step_rejected() {
    let mut session = EditorSession::new(three_block_document(), EditorConfig::default());
    let before = session.document().clone();

    let json = json!({
        "version": 1,
        "steps": [{ "id": "S9", "name": "Other", "blocks": [] }]
    })
    .to_string();

    let result = session.import_json(&json);
    assert_eq!(
        result,
        Err(EditorError::Import(ImportError::MissingActiveStep))
    );
    assert_eq!(session.document(), &before);
    assert!(!session.can_undo());
}

#[test]
fn test_delete_active_step_moves_to_first() {
    let mut session = EditorSession::new(three_block_document(), EditorConfig::default());
    session
        .apply(Command::AddStep {
            after: None,
            name: Some("Result".into()),
        })
        .unwrap();
    let result_step = session.document().active_step_id().clone();

    session
        .apply(Command::DeleteStep { step: result_step })
        .unwrap();
    assert_eq!(session.document().active_step_id(), &StepId::from("S1"));
    assert_eq!(session.selection().active_step_id(), &StepId::from("S1"));
}

#[test]
fn test_stale_ids_are_silent_noops() {
    let mut session = EditorSession::new(three_block_document(), EditorConfig::default());
    let changed = session
        .apply(Command::DeleteBlock {
            step: StepId::from("S1"),
            block: BlockId::from("gone"),
        })
        .unwrap();

    assert!(!changed);
    assert!(!session.can_undo());
}

#[test]
fn test_export_import_round_trip() {
    let doc = three_block_document().duplicate_step(&StepId::from("S1"));
    let json = doc.to_json().unwrap();
    assert_eq!(Document::from_json(&json).unwrap(), doc);
}

#[test]
fn test_session_saves_through_storage_worker() {
    let storage = Arc::new(MemoryStorage::new());
    let worker = StorageWorker::spawn(storage.clone());
    let mut session = EditorSession::new(three_block_document(), EditorConfig::default())
        .with_adapter(worker);

    session
        .apply(Command::AddStep {
            after: None,
            name: None,
        })
        .unwrap();
    session.save();
    let expected = session.document().clone();
    // Releasing the adapter joins the worker once queued saves are written
    session.close();

    let stored = pollster::block_on(storage.load(LAST_DOCUMENT_KEY)).unwrap();
    assert_eq!(stored, expected);
}
