//! Marginalia — note-taking core with a streaming local-AI pipeline.
//!
//! The non-GUI heart of a notes application: a hierarchical note store,
//! bulk note import, and an AI layer that streams chat completions from a
//! local inference server into two independent consumers — a persistent
//! chat transcript and an in-place "reflection" spliced into a note's own
//! text.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use marginalia::client::OllamaClient;
//! use marginalia::config::AiConfig;
//! use marginalia::session::ChatSession;
//!
//! # async fn example() -> marginalia::error::Result<()> {
//! let client = Arc::new(OllamaClient::new(AiConfig::from_env()));
//! let session = ChatSession::new(client);
//! session.send("What should I write about today?")?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod import;
pub mod prelude;
pub mod reflection;
pub mod session;
pub mod store;
pub mod types;
