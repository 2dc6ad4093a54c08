//! Configuration for the local inference endpoint.

use std::env;

const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
const DEFAULT_MODEL: &str = "qwen2:0.5b";

/// Where and what to ask for completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    /// Base URL of an OpenAI-compatible server, without the trailing route.
    pub base_url: String,
    /// Model identifier passed through in the request body.
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AiConfig {
    /// Load from environment variables, falling back to the local defaults.
    ///
    /// Reads `MARGINALIA_BASE_URL` and `MARGINALIA_MODEL`; a `.env` file is
    /// honored when present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let defaults = Self::default();
        Self {
            base_url: env::var("MARGINALIA_BASE_URL").unwrap_or(defaults.base_url),
            model: env::var("MARGINALIA_MODEL").unwrap_or(defaults.model),
        }
    }

    /// Full URL of the chat-completions route.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
