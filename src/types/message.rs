//! Message types for model communication and the chat transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn sent to the inference endpoint.
///
/// Immutable once constructed; ordering within a request is conversation
/// order. Serializes to the wire shape `{"role": ..., "content": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiMessage {
    pub role: Role,
    pub content: String,
}

impl AiMessage {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// An entry in the chat transcript shown to the user.
///
/// `content` grows by streaming append while a response is in flight;
/// everything else is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatEntry {
    pub id: Uuid,
    pub content: String,
    pub is_from_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatEntry {
    /// Create a user entry.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: text.into(),
            is_from_user: true,
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant entry.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: text.into(),
            is_from_user: false,
            timestamp: Utc::now(),
        }
    }

    /// Map to the wire message for a conversation window.
    pub fn to_message(&self) -> AiMessage {
        if self.is_from_user {
            AiMessage::user(self.content.clone())
        } else {
            AiMessage::assistant(self.content.clone())
        }
    }
}
