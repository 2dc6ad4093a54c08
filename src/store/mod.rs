//! In-memory hierarchical note store.
//!
//! The embedded equivalent of the application's persistent object graph:
//! folders nest under folders, notes live in folders, images belong to
//! notes. Deleting a folder takes its whole subtree with it.

pub mod entities;

pub use entities::{Folder, Note, NoteImage};

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Errors from store operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown folder: {0}")]
    UnknownFolder(Uuid),
    #[error("Unknown note: {0}")]
    UnknownNote(Uuid),
    #[error("Unknown image: {0}")]
    UnknownImage(Uuid),
}

/// CRUD over the folder/note/image graph.
#[derive(Debug, Default)]
pub struct NoteStore {
    folders: HashMap<Uuid, Folder>,
    notes: HashMap<Uuid, Note>,
    images: HashMap<Uuid, NoteImage>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Folders --

    /// Create a folder, optionally nested under `parent`.
    pub fn create_folder(
        &mut self,
        name: impl Into<String>,
        parent: Option<Uuid>,
    ) -> Result<Folder, StoreError> {
        if let Some(parent) = parent {
            if !self.folders.contains_key(&parent) {
                return Err(StoreError::UnknownFolder(parent));
            }
        }
        let folder = Folder::new(name, parent);
        self.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    pub fn folder(&self, id: Uuid) -> Option<&Folder> {
        self.folders.get(&id)
    }

    pub fn rename_folder(&mut self, id: Uuid, name: impl Into<String>) -> Result<(), StoreError> {
        let folder = self
            .folders
            .get_mut(&id)
            .ok_or(StoreError::UnknownFolder(id))?;
        folder.name = name.into();
        folder.updated_at = Utc::now();
        Ok(())
    }

    /// Folders with no parent, sorted by name.
    pub fn root_folders(&self) -> Vec<&Folder> {
        let mut roots: Vec<_> = self.folders.values().filter(|f| f.parent.is_none()).collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        roots
    }

    /// Direct subfolders, sorted by name.
    pub fn subfolders(&self, id: Uuid) -> Vec<&Folder> {
        let mut children: Vec<_> = self
            .folders
            .values()
            .filter(|f| f.parent == Some(id))
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        children
    }

    /// Delete a folder and everything beneath it: subfolders, their notes,
    /// and those notes' images.
    pub fn delete_folder(&mut self, id: Uuid) -> Result<(), StoreError> {
        if !self.folders.contains_key(&id) {
            return Err(StoreError::UnknownFolder(id));
        }

        let mut doomed = vec![id];
        let mut queue = vec![id];
        while let Some(current) = queue.pop() {
            let children: Vec<Uuid> = self
                .folders
                .values()
                .filter(|f| f.parent == Some(current))
                .map(|f| f.id)
                .collect();
            doomed.extend(&children);
            queue.extend(children);
        }

        debug!(folders = doomed.len(), "deleting folder subtree");
        for folder_id in doomed {
            self.folders.remove(&folder_id);
            let notes: Vec<Uuid> = self
                .notes
                .values()
                .filter(|n| n.folder == Some(folder_id))
                .map(|n| n.id)
                .collect();
            for note_id in notes {
                let _ = self.delete_note(note_id);
            }
        }
        Ok(())
    }

    // -- Notes --

    /// Create a note, optionally inside `folder`.
    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        folder: Option<Uuid>,
    ) -> Result<Note, StoreError> {
        if let Some(folder) = folder {
            if !self.folders.contains_key(&folder) {
                return Err(StoreError::UnknownFolder(folder));
            }
        }
        let note = Note::new(title, content, folder);
        self.notes.insert(note.id, note.clone());
        Ok(note)
    }

    pub fn note(&self, id: Uuid) -> Option<&Note> {
        self.notes.get(&id)
    }

    /// Replace a note's title and content, touching its timestamp.
    pub fn update_note(
        &mut self,
        id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), StoreError> {
        let note = self.notes.get_mut(&id).ok_or(StoreError::UnknownNote(id))?;
        note.title = title.into();
        note.content = content.into();
        note.updated_at = Utc::now();
        Ok(())
    }

    /// Move a note to another folder (or out of all folders).
    pub fn move_note(&mut self, id: Uuid, folder: Option<Uuid>) -> Result<(), StoreError> {
        if let Some(folder) = folder {
            if !self.folders.contains_key(&folder) {
                return Err(StoreError::UnknownFolder(folder));
            }
        }
        let note = self.notes.get_mut(&id).ok_or(StoreError::UnknownNote(id))?;
        note.folder = folder;
        note.updated_at = Utc::now();
        Ok(())
    }

    /// Notes in a folder (or unfiled), most recently updated first.
    pub fn notes_in(&self, folder: Option<Uuid>) -> Vec<&Note> {
        let mut notes: Vec<_> = self.notes.values().filter(|n| n.folder == folder).collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        notes
    }

    /// Delete a note and its images.
    pub fn delete_note(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.notes.remove(&id).ok_or(StoreError::UnknownNote(id))?;
        self.images.retain(|_, img| img.note != id);
        Ok(())
    }

    // -- Images --

    /// Attach image bytes to a note at `position`.
    pub fn attach_image(
        &mut self,
        note: Uuid,
        data: Vec<u8>,
        position: i32,
    ) -> Result<NoteImage, StoreError> {
        if !self.notes.contains_key(&note) {
            return Err(StoreError::UnknownNote(note));
        }
        let image = NoteImage::new(note, data, position);
        self.images.insert(image.id, image.clone());
        Ok(image)
    }

    /// A note's images ordered by position.
    pub fn images_for(&self, note: Uuid) -> Vec<&NoteImage> {
        let mut images: Vec<_> = self.images.values().filter(|i| i.note == note).collect();
        images.sort_by(|a, b| a.position.cmp(&b.position).then(a.id.cmp(&b.id)));
        images
    }

    pub fn delete_image(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.images.remove(&id).ok_or(StoreError::UnknownImage(id))?;
        Ok(())
    }
}
