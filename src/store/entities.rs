//! Timestamped entities of the note object graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A folder, optionally nested under a parent folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub parent: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    pub(crate) fn new(name: impl Into<String>, parent: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: None,
            parent,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A note living in at most one folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub folder: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub(crate) fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        folder: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            folder,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An image embedded in a note at a given position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteImage {
    pub id: Uuid,
    pub note: Uuid,
    pub data: Vec<u8>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl NoteImage {
    pub(crate) fn new(note: Uuid, data: Vec<u8>, position: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            note,
            data,
            position,
            created_at: Utc::now(),
        }
    }
}
