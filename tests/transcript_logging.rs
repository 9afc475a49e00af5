use std::sync::Arc;

use chat_provider_mock::MockProvider;
use sigma::controller::ConversationController;
use transcript_store::{TranscriptStore, TranscriptTags, TurnKind};

mod support;
use support::RecordingView;

const SYSTEM_PROMPT: &str = "Your name is Sigma.";
const OPENING: &str = "Hello! Let's begin.";

fn new_store(dir: &tempfile::TempDir) -> TranscriptStore {
    TranscriptStore::create_new(
        dir.path(),
        TranscriptTags::new("nsc396a", "4").with_interaction("3"),
    )
    .expect("store should be created")
}

fn transcript_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let root = transcript_store::transcript_root(dir.path());
    let mut entries = std::fs::read_dir(&root)
        .expect("transcript root should exist")
        .map(|entry| entry.expect("dir entry").path())
        .collect::<Vec<_>>();
    entries.sort();
    assert_eq!(entries.len(), 1, "exactly one transcript file expected");
    entries.remove(0)
}

#[test]
fn fresh_sessions_persist_the_scripted_seed_turns() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = new_store(&dir);
    let session_id = store.header().session_id.clone();

    let _controller = ConversationController::new(
        Arc::new(MockProvider::default()),
        Some(store),
        session_id.clone(),
        SYSTEM_PROMPT,
        OPENING,
        None,
    )
    .expect("controller should construct");

    let reopened = TranscriptStore::open(&transcript_path(&dir)).expect("transcript reopens");
    assert_eq!(reopened.header().session_id, session_id);
    assert_eq!(reopened.header().course, "nsc396a");
    assert_eq!(reopened.header().interaction.as_deref(), Some("3"));

    let turns = reopened.turns();
    assert_eq!(turns.len(), 2);
    assert!(matches!(
        &turns[0].kind,
        TurnKind::SystemText { text } if text == SYSTEM_PROMPT
    ));
    assert!(matches!(
        &turns[1].kind,
        TurnKind::AssistantText { text } if text == OPENING
    ));
}

#[test]
fn restart_appends_a_fresh_seed_without_rewriting_history() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = new_store(&dir);
    let session_id = store.header().session_id.clone();

    let mut controller = ConversationController::new(
        Arc::new(MockProvider::new(vec!["noted".to_string()])),
        Some(store),
        session_id,
        SYSTEM_PROMPT,
        OPENING,
        None,
    )
    .expect("controller should construct");

    let mut view = RecordingView::new();
    controller.submit("hello", &mut view).expect("turn one");
    controller.restart().expect("restart should persist seeds");

    assert_eq!(controller.chat().session().turns.len(), 2);

    let reopened = TranscriptStore::open(&transcript_path(&dir)).expect("transcript reopens");
    let turns = reopened.turns();
    // Original seed pair + one completed exchange + restarted seed pair.
    assert_eq!(turns.len(), 2 + 2 + 2);
    assert!(matches!(turns[4].kind, TurnKind::SystemText { .. }));
    assert!(matches!(turns[5].kind, TurnKind::AssistantText { .. }));
}

#[test]
fn resume_replays_the_transcript_and_continues_appending() {
    let dir = tempfile::tempdir().expect("tempdir should be created");

    {
        let store = new_store(&dir);
        let session_id = store.header().session_id.clone();
        let mut controller = ConversationController::new(
            Arc::new(MockProvider::new(vec!["first reply".to_string()])),
            Some(store),
            session_id,
            SYSTEM_PROMPT,
            OPENING,
            None,
        )
        .expect("controller should construct");

        let mut view = RecordingView::new();
        controller.submit("first visit", &mut view).expect("turn");
    }

    let path = transcript_path(&dir);
    let store = TranscriptStore::open(&path).expect("transcript reopens");
    let session_id = store.header().session_id.clone();

    let mut resumed = ConversationController::resume(
        Arc::new(MockProvider::new(vec!["welcome back".to_string()])),
        store,
        SYSTEM_PROMPT,
        OPENING,
        None,
    );

    // Replayed session state matches what was persisted.
    assert_eq!(resumed.chat().session().id, session_id);
    assert_eq!(resumed.chat().session().turns.len(), 4);
    assert_eq!(resumed.chat().view().len(), 3);

    let mut view = RecordingView::new();
    let reply = resumed
        .submit("second visit", &mut view)
        .expect("resumed turn");
    assert_eq!(reply, "welcome back");

    let reopened = TranscriptStore::open(&path).expect("transcript reopens again");
    let turns = reopened.turns();
    assert_eq!(turns.len(), 6);
    assert!(matches!(
        &turns[4].kind,
        TurnKind::UserText { text } if text == "second visit"
    ));
    assert!(matches!(
        &turns[5].kind,
        TurnKind::AssistantText { text } if text == "welcome back"
    ));
}

#[test]
fn missing_store_degrades_to_in_memory_conversation() {
    let mut controller = ConversationController::new(
        Arc::new(MockProvider::new(vec!["still works".to_string()])),
        None,
        "unpersisted-session",
        SYSTEM_PROMPT,
        OPENING,
        None,
    )
    .expect("controller should construct");

    let mut view = RecordingView::new();
    let reply = controller.submit("hello", &mut view).expect("turn");

    assert_eq!(reply, "still works");
    assert_eq!(controller.chat().session().turns.len(), 4);
}
