//! QA tests for saving and loading game snapshots.
//!
//! Run with: `cargo test -p dq-core --test qa_persistence`

use dq_core::persist::load_or_default;
use dq_core::testing::TestHarness;
use dq_core::{EntityStore, SavedGame, StoreError};
use tempfile::TempDir;

#[tokio::test]
async fn test_save_and_load_roundtrip() {
    let mut harness = TestHarness::new();
    harness.reply("gm", "dq new game Ann, Bob");
    harness.reply("p", "dq set char Ann");
    harness.reply("p", "dq + 6 2");
    harness.reply("p", "dq +m 2d6 Punch");
    harness.reply("p", "dq + punch");
    harness.reply("p", "dq +c 1d8 Bruised");

    let sheet_before = harness.reply("p", "dq view sheet");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");
    SavedGame::new(harness.engine.store().clone())
        .save_json(&path)
        .await
        .unwrap();

    let loaded = SavedGame::load_json(&path).await.unwrap();
    assert_eq!(loaded.store.active_characters().unwrap().len(), 2);

    let mut restored = TestHarness::with_store(loaded.store);
    assert_eq!(restored.reply("p", "dq view sheet"), sheet_before);
    assert_eq!(restored.character_of("p").unwrap().name, "Ann");

    // Used moves stay used across a restart.
    assert_eq!(restored.reply("p", "dq + punch"), "[ERROR] Punch has already been used");
}

#[tokio::test]
async fn test_load_version_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old.json");

    let mut saved = SavedGame::new(TestHarness::new().engine.into_store());
    saved.version = 99;
    saved.save_json(&path).await.unwrap();

    match SavedGame::load_json(&path).await {
        Err(StoreError::VersionMismatch { expected, found }) => {
            assert_eq!(expected, 1);
            assert_eq!(found, 99);
        }
        other => panic!("expected a version mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_garbage_is_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.json");
    tokio::fs::write(&path, "not json at all").await.unwrap();

    assert!(matches!(
        SavedGame::load_json(&path).await,
        Err(StoreError::Json(_))
    ));
}

#[tokio::test]
async fn test_load_or_default_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = load_or_default(dir.path().join("missing.json")).await.unwrap();
    assert!(store.active_characters().unwrap().is_empty());
}

#[tokio::test]
async fn test_load_or_default_reads_existing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");

    let mut harness = TestHarness::new();
    harness.reply("gm", "dq add char Ann");
    SavedGame::new(harness.engine.into_store())
        .save_json(&path)
        .await
        .unwrap();

    let store = load_or_default(&path).await.unwrap();
    let names: Vec<String> = store
        .active_characters()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Ann"]);
}
