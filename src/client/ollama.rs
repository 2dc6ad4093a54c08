//! Client for a local Ollama (OpenAI-compatible) inference server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::config::AiConfig;
use crate::error::AiError;
use crate::types::{AiMessage, StreamDelta};

use super::http::{json_headers, parse_sse_data, shared_client};
use super::{AiService, ChatStreamer, ResponseHandler};

/// Streams chat completions from a local OpenAI-compatible endpoint.
///
/// Tracks at most one in-flight request. Issuing a new request aborts the
/// previous one so stale responses can never race a newer consumer, and
/// [`cancel_current_request`](AiService::cancel_current_request) aborts
/// silently — the caller owns any UI rollback.
#[derive(Clone)]
pub struct OllamaClient {
    config: AiConfig,
    current: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl OllamaClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ChatStreamer for OllamaClient {
    async fn stream_chat(
        &self,
        messages: &[AiMessage],
    ) -> Result<BoxStream<'static, Result<StreamDelta, AiError>>, AiError> {
        let url = reqwest::Url::parse(&self.config.chat_completions_url())
            .map_err(|_| AiError::InvalidUrl)?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "stream": true,
        });

        debug!(model = %self.config.model, %url, "ollama stream_chat");

        let resp = shared_client()
            .post(url)
            .headers(json_headers())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "inference server refused request");
            return Err(AiError::InvalidResponse);
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer = String::new();
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(AiError::Network(e));
                        break;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = parse_sse_data(&line) {
                        match serde_json::from_str::<ChatStreamChunk>(data) {
                            Ok(chunk) => {
                                if let Some(choice) = chunk.choices.into_iter().next() {
                                    let text = choice.delta.content.unwrap_or_default();
                                    if choice.finish_reason.is_some() {
                                        yield Ok(StreamDelta::done(text));
                                    } else {
                                        yield Ok(StreamDelta::text(text));
                                    }
                                }
                            }
                            // Local servers emit the occasional corrupt
                            // chunk; dropping the line keeps the rest of the
                            // stream usable.
                            Err(err) => trace!(%err, "skipping undecodable stream line"),
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

impl AiService for OllamaClient {
    fn send_messages(&self, messages: Vec<AiMessage>, handler: Arc<dyn ResponseHandler>) {
        let client = self.clone();

        let mut current = self.current.lock().expect("current-task lock poisoned");
        if let Some(prev) = current.take() {
            prev.abort();
        }

        let handle = tokio::spawn(async move {
            match client.stream_chat(&messages).await {
                Ok(mut stream) => {
                    while let Some(item) = stream.next().await {
                        match item {
                            Ok(delta) => {
                                if !delta.text.is_empty() {
                                    handler.on_stream(&delta.text);
                                }
                            }
                            Err(err) => {
                                handler.on_error(err);
                                return;
                            }
                        }
                    }
                    handler.on_complete();
                }
                Err(err) => handler.on_error(err),
            }
        });

        *current = Some(handle);
    }

    fn cancel_current_request(&self) {
        let mut current = self.current.lock().expect("current-task lock poisoned");
        if let Some(task) = current.take() {
            debug!("cancelling in-flight request");
            task.abort();
        }
    }
}

// Wire types for the streamed chunk payload (internal).

#[derive(Deserialize)]
struct ChatStreamChunk {
    choices: Vec<ChatStreamChoice>,
}

#[derive(Deserialize)]
struct ChatStreamChoice {
    delta: ChatStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatStreamDelta {
    content: Option<String>,
}
