//! Convenience re-exports for common use.

pub use crate::client::{
    AiService, CallbackHandler, ChatStreamer, OllamaClient, ResponseHandler,
};
pub use crate::config::AiConfig;
pub use crate::error::{AiError, Result};
pub use crate::import::NoteImportItem;
pub use crate::reflection::ReflectionSession;
pub use crate::session::{
    pending_channel, ChatSession, ChatSnapshot, PendingSender, SessionState,
};
pub use crate::store::{Folder, Note, NoteImage, NoteStore, StoreError};
pub use crate::types::{AiMessage, ChatEntry, Role, StreamDelta, StreamEventKind};
