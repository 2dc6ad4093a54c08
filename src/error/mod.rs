//! Error types for the AI layer.

use thiserror::Error;

/// Errors surfaced by the streaming AI pipeline.
///
/// Every failed request reports exactly one of these through
/// [`ResponseHandler::on_error`](crate::client::ResponseHandler::on_error);
/// nothing panics across the handler boundary and nothing is retried
/// automatically. Malformed individual stream lines are not errors at all —
/// they are dropped so one corrupt chunk cannot abort an otherwise-good
/// stream.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Invalid endpoint URL")]
    InvalidUrl,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Empty or undecodable response body")]
    InvalidResponse,

    #[error("Decoding error: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("A request is already in flight")]
    Busy,
}

impl AiError {
    /// Whether the user retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::InvalidResponse)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AiError>;
