//! Bulk note-import parsing and store integration.

use marginalia::import::{import_notes, parse_import};
use marginalia::store::{NoteStore, StoreError};
use pretty_assertions::assert_eq;
use uuid::Uuid;

const BATCH: &str = r#"[
    {
        "filename": "journal-01.md",
        "file_id": "f-001",
        "title": "Monday",
        "answer": "Started the week with a plan.",
        "metadata": {"source": "journal", "week": "32"}
    },
    {
        "filename": "journal-02.md",
        "file_id": "f-002",
        "title": "Tuesday",
        "answer": "Plans met reality."
    }
]"#;

#[test]
fn parses_items_with_and_without_metadata() {
    let items = parse_import(BATCH).unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].filename, "journal-01.md");
    assert_eq!(items[0].file_id, "f-001");
    assert_eq!(
        items[0].metadata.as_ref().unwrap().get("source").unwrap(),
        "journal"
    );
    assert_eq!(items[1].metadata, None);
}

#[test]
fn malformed_metadata_is_dropped_not_fatal() {
    let json = r#"[{
        "filename": "f.md",
        "file_id": "id",
        "title": "t",
        "answer": "a",
        "metadata": ["not", "a", "map"]
    }]"#;

    let items = parse_import(json).unwrap();
    assert_eq!(items[0].metadata, None);

    let json = r#"[{
        "filename": "f.md",
        "file_id": "id",
        "title": "t",
        "answer": "a",
        "metadata": {"count": 3}
    }]"#;

    let items = parse_import(json).unwrap();
    assert_eq!(items[0].metadata, None);
}

#[test]
fn missing_required_field_fails_the_batch() {
    let json = r#"[{"filename": "f.md", "file_id": "id", "title": "t"}]"#;
    assert!(parse_import(json).is_err());
}

#[test]
fn import_creates_notes_in_order_in_the_target_folder() {
    let mut store = NoteStore::new();
    let folder = store.create_folder("Imported", None).unwrap();
    let items = parse_import(BATCH).unwrap();

    let ids = import_notes(&mut store, Some(folder.id), &items).unwrap();

    assert_eq!(ids.len(), 2);
    let first = store.note(ids[0]).unwrap();
    assert_eq!(first.title, "Monday");
    assert_eq!(first.content, "Started the week with a plan.");
    assert_eq!(first.folder, Some(folder.id));

    let second = store.note(ids[1]).unwrap();
    assert_eq!(second.title, "Tuesday");
    assert_eq!(store.notes_in(Some(folder.id)).len(), 2);
}

#[test]
fn import_into_an_unknown_folder_is_rejected() {
    let mut store = NoteStore::new();
    let missing = Uuid::new_v4();
    let items = parse_import(BATCH).unwrap();

    assert_eq!(
        import_notes(&mut store, Some(missing), &items).unwrap_err(),
        StoreError::UnknownFolder(missing)
    );
}
