//! Integration tests for the clipboard history engine

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use clipdex::clipboard::{Clipboard, MemoryClipboard};
use clipdex::engine::Engine;
use clipdex::history::database::HistoryDatabase;
use clipdex::watcher::ClipboardWatcher;

async fn open_engine(
    dir: &TempDir,
    clipboard: Arc<MemoryClipboard>,
) -> Arc<Engine> {
    let db = HistoryDatabase::open(&dir.path().join("history.db"))
        .await
        .unwrap();
    Arc::new(
        Engine::with_database(db, clipboard as Arc<dyn Clipboard>)
            .await
            .unwrap(),
    )
}

#[tokio::test]
async fn test_history_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let clipboard = Arc::new(MemoryClipboard::new());

    {
        let engine = open_engine(&temp_dir, clipboard.clone()).await;
        engine.capture("first entry").await.unwrap();
        engine.capture("second entry").await.unwrap();
        engine.capture("first entry").await.unwrap(); // promote
    }

    let engine = open_engine(&temp_dir, clipboard).await;
    let view = engine.view_state().await;

    assert_eq!(view.total_items, 2);
    assert_eq!(view.items[0].text, "first entry");
    assert_eq!(view.items[1].text, "second entry");

    // Search works against the rebuilt index
    let (entries, total) = engine.search("fir ent", 0).await;
    assert_eq!(total, 1);
    assert_eq!(entries[0].text, "first entry");
}

#[tokio::test]
async fn test_watcher_to_picker_flow() {
    let temp_dir = TempDir::new().unwrap();
    let clipboard = Arc::new(MemoryClipboard::new());
    let engine = open_engine(&temp_dir, clipboard.clone()).await;

    let watcher = ClipboardWatcher::new(
        engine.clone(),
        clipboard.clone(),
        Duration::from_millis(300),
    );

    // A user copies three things; the watcher polls in between
    for text in ["git status", "cargo test", "clipboard history notes"] {
        clipboard.set(text);
        watcher.tick().await;
    }

    // Search for one, select it and copy it back
    let view = engine.set_query("hist not").await;
    assert_eq!(view.total_matches, 1);

    engine.select_next().await;
    let view = engine.copy_selected().await.unwrap();
    assert_eq!(view.query, "");
    assert_eq!(view.total_items, 2);
    assert_eq!(
        clipboard.read_text().await.unwrap(),
        "clipboard history notes"
    );

    // The next poll re-inserts the copied entry at the top
    watcher.tick().await;
    let view = engine.view_state().await;
    assert_eq!(view.total_items, 3);
    assert_eq!(view.items[0].text, "clipboard history notes");
}

#[tokio::test]
async fn test_clear_persists() {
    let temp_dir = TempDir::new().unwrap();
    let clipboard = Arc::new(MemoryClipboard::new());

    {
        let engine = open_engine(&temp_dir, clipboard.clone()).await;
        engine.capture("soon gone").await.unwrap();
        engine.clear_all().await.unwrap();
    }

    let engine = open_engine(&temp_dir, clipboard).await;
    assert_eq!(engine.count().await, 0);
}

#[tokio::test]
async fn test_export_matches_insertion_order() {
    let temp_dir = TempDir::new().unwrap();
    let clipboard = Arc::new(MemoryClipboard::new());
    let engine = open_engine(&temp_dir, clipboard).await;

    engine.capture("alpha").await.unwrap();
    engine.capture("beta").await.unwrap();

    let entries = engine.export_all(true).await;
    let json = serde_json::to_string(&entries).unwrap();

    // Derived word sets stay internal; the export is {id, text} pairs
    assert_eq!(
        json,
        r#"[{"id":1,"text":"alpha"},{"id":2,"text":"beta"}]"#
    );

    let plain: Vec<String> = engine
        .export_all(true)
        .await
        .into_iter()
        .map(|e| e.text)
        .collect();
    assert_eq!(plain.join("\n"), "alpha\nbeta");
}

#[tokio::test]
async fn test_pagination_across_views() {
    let temp_dir = TempDir::new().unwrap();
    let clipboard = Arc::new(MemoryClipboard::new());
    let engine = open_engine(&temp_dir, clipboard).await;

    for i in 0..20 {
        engine.capture(&format!("item number{i}")).await.unwrap();
    }

    // History: 20 items = 3 pages of 9
    let view = engine.open_page(2).await;
    assert_eq!(view.items.len(), 2);

    let view = engine.open_page(5).await;
    assert!(view.items.is_empty());

    // Search pages use the total match count, not the page size
    let view = engine.set_query("item").await;
    assert_eq!(view.total_matches, 20);
    assert_eq!(view.items.len(), 9);

    let view = engine.next_page().await;
    assert_eq!(view.page, 1);
    let view = engine.next_page().await;
    assert_eq!(view.page, 2);
    let view = engine.next_page().await;
    assert_eq!(view.page, 2); // bounded
}
