//! Bulk note import from a JSON batch.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::store::{NoteStore, StoreError};

/// One note in an import batch.
///
/// `metadata` is best-effort: a missing or malformed value imports the note
/// without metadata rather than failing the item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteImportItem {
    pub filename: String,
    pub file_id: String,
    pub title: String,
    pub answer: String,
    #[serde(
        default,
        deserialize_with = "lenient_metadata",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<HashMap<String, String>>,
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Parse an import payload: a JSON array of items.
pub fn parse_import(json: &str) -> Result<Vec<NoteImportItem>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Create one note per item in `folder`, returning note ids in input order.
pub fn import_notes(
    store: &mut NoteStore,
    folder: Option<Uuid>,
    items: &[NoteImportItem],
) -> Result<Vec<Uuid>, StoreError> {
    debug!(count = items.len(), "importing notes");
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let note = store.create_note(&item.title, &item.answer, folder)?;
        ids.push(note.id);
    }
    Ok(ids)
}
