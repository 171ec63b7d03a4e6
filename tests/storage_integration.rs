//! Integration tests for the JSON stores
//!
//! Exercises the public store API against files laid out the way earlier
//! versions of the app wrote them.

use chrono::NaiveDate;
use tempfile::TempDir;
use myiq::session::{Attachment, ChatSession, NotebookSession};
use myiq::storage::{
    CalendarStore, ChatHistoryStore, CorruptionPolicy, NotebookStore, SessionStore,
};

const LEGACY_SESSIONS: &str = r#"{
  "20240501_093000": {
    "session_id": "20240501_093000",
    "title": "Chat 2024-05-01 09:30",
    "messages": [
      {
        "text": "What is in this file?\n📎 notes.txt",
        "is_user": true,
        "timestamp": "2024-05-01T09:30:12.123456",
        "attachments": [["/home/me/notes.txt", "buy milk"]]
      },
      {
        "text": "A shopping list.",
        "is_user": false,
        "timestamp": "2024-05-01T09:30:15.000001",
        "attachments": []
      }
    ],
    "created_at": "2024-05-01T09:30:00.000000",
    "updated_at": "2024-05-01T09:30:15.000001"
  }
}"#;

#[test]
fn test_chat_store_reads_legacy_sessions_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ChatHistoryStore::open(temp_dir.path(), CorruptionPolicy::Fail)
        .expect("Failed to open store");
    std::fs::write(store.path(), LEGACY_SESSIONS).expect("Failed to write fixture");

    let session = store
        .load("20240501_093000")
        .expect("Failed to load")
        .expect("session should exist");
    assert_eq!(session.title, "Chat 2024-05-01 09:30");
    assert_eq!(session.messages.len(), 2);
    assert_eq!(
        session.messages[0].attachments,
        vec![Attachment::new("/home/me/notes.txt", "buy milk")]
    );
    assert!(!session.messages[1].is_user);
}

#[test]
fn test_chat_store_rewrite_keeps_legacy_sessions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ChatHistoryStore::open(temp_dir.path(), CorruptionPolicy::Fail)
        .expect("Failed to open store");
    std::fs::write(store.path(), LEGACY_SESSIONS).expect("Failed to write fixture");

    let mut fresh = ChatSession::with_id("20240502_080000_000000", "Morning");
    fresh.add_message("hello", true, vec![]);
    store.save(&mut fresh).expect("Failed to save");

    let ids: Vec<String> = store
        .list()
        .expect("Failed to list")
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec!["20240502_080000_000000", "20240501_093000"]);

    let raw = std::fs::read_to_string(store.path()).expect("Failed to read file");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
    assert_eq!(
        value["20240501_093000"]["messages"][0]["attachments"][0][1],
        "buy milk"
    );
    assert!(raw.contains("\n  \"20240501_093000\": {"));
}

#[test]
fn test_deleting_unknown_chat_leaves_file_untouched() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ChatHistoryStore::open(temp_dir.path(), CorruptionPolicy::Fail)
        .expect("Failed to open store");
    std::fs::write(store.path(), LEGACY_SESSIONS).expect("Failed to write fixture");

    store.delete("does-not-exist").expect("delete should succeed");
    let after = std::fs::read_to_string(store.path()).expect("Failed to read file");
    assert_eq!(after, LEGACY_SESSIONS);
}

#[test]
fn test_notebook_store_layout_and_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = NotebookStore::open(temp_dir.path(), CorruptionPolicy::Fail)
        .expect("Failed to open store");

    let mut nb = NotebookSession::with_id("20240501_100000", "Physics", "$$F = ma$$");
    let before = nb.updated_at;
    store.save(&mut nb).expect("Failed to save");

    assert!(temp_dir
        .path()
        .join("notebook_data")
        .join("20240501_100000.json")
        .is_file());

    let loaded = store
        .load("20240501_100000")
        .expect("Failed to load")
        .expect("notebook should exist");
    assert_eq!(loaded.title, "Physics");
    assert_eq!(loaded.content, "$$F = ma$$");
    assert_eq!(loaded.created_at, nb.created_at);
    assert!(loaded.updated_at >= before);
}

#[test]
fn test_calendar_edit_by_index_on_legacy_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = CalendarStore::open(temp_dir.path(), CorruptionPolicy::Fail)
        .expect("Failed to open store");
    std::fs::write(
        temp_dir.path().join("calendar_data").join("2024-05-01.json"),
        r#"["Standup", "Lunch with Sam", "Gym"]"#,
    )
    .expect("Failed to write fixture");

    let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
    store
        .edit_event_at(date, 1, "Lunch with Alex")
        .expect("Failed to edit");

    let texts: Vec<String> = store
        .events_for_date(date)
        .expect("Failed to read")
        .into_iter()
        .map(|e| e.text)
        .collect();
    assert_eq!(texts, vec!["Standup", "Lunch with Alex", "Gym"]);
    assert_eq!(store.dates_with_events().expect("Failed to list"), vec![date]);
}

#[test]
fn test_calendar_ids_stable_after_upgrade() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = CalendarStore::open(temp_dir.path(), CorruptionPolicy::Fail)
        .expect("Failed to open store");
    let date = NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid date");

    let first = store.add_event(date, "Dentist").expect("Failed to add");
    let second = store.add_event(date, "Call mom").expect("Failed to add");
    assert!(store.delete_event(date, &first.id).expect("Failed to delete"));

    let events = store.events_for_date(date).expect("Failed to read");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, second.id);
}
