//! Streaming types.

use serde::{Deserialize, Serialize};

/// A delta emitted while decoding a streamed response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamDelta {
    /// The incremental text chunk (may be empty on the final delta).
    pub text: String,
    /// Event kind.
    pub kind: StreamEventKind,
}

/// Kind of stream event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreamEventKind {
    /// Incremental text content.
    TextDelta,
    /// The server marked the stream finished.
    Done,
}

impl StreamDelta {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StreamEventKind::TextDelta,
        }
    }

    pub fn done(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StreamEventKind::Done,
        }
    }
}
