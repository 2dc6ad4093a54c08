//! Streaming client and the capability interface consumers implement.

pub mod http;
pub mod ollama;

pub use ollama::OllamaClient;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::AiError;
use crate::types::{AiMessage, StreamDelta};

/// Callbacks through which one request reports its results.
///
/// The client invokes these synchronously from its own task, in order:
/// `on_stream` zero or more times (once per non-empty content fragment),
/// then exactly one of `on_complete` or `on_error`. A consumer that needs
/// another execution context dispatches internally.
pub trait ResponseHandler: Send + Sync {
    /// A non-empty text fragment arrived.
    fn on_stream(&self, delta: &str);
    /// The response finished successfully (possibly without any fragments).
    fn on_complete(&self);
    /// The request failed; no further callbacks follow.
    fn on_error(&self, err: AiError);
}

/// A service that streams chat completions to a handler.
///
/// `send_messages` is fire-and-forget: the network work runs on a spawned
/// task and results arrive through the handler. At most one request per
/// service instance is live; issuing a new one cancels its predecessor.
pub trait AiService: Send + Sync {
    fn send_messages(&self, messages: Vec<AiMessage>, handler: Arc<dyn ResponseHandler>);

    /// Abort the in-flight request, if any. Silent: no handler callback is
    /// invoked on behalf of the cancelled request.
    fn cancel_current_request(&self);
}

/// The transport seam: opens a request and yields decoded deltas.
#[async_trait]
pub trait ChatStreamer: Send + Sync {
    async fn stream_chat(
        &self,
        messages: &[AiMessage],
    ) -> Result<BoxStream<'static, Result<StreamDelta, AiError>>, AiError>;
}

type StreamFn = Box<dyn Fn(&str) + Send + Sync>;
type CompleteFn = Box<dyn Fn() + Send + Sync>;
type ErrorFn = Box<dyn Fn(AiError) + Send + Sync>;

/// Adapter turning three closures into a [`ResponseHandler`].
pub struct CallbackHandler {
    on_stream: StreamFn,
    on_complete: CompleteFn,
    on_error: ErrorFn,
}

impl CallbackHandler {
    pub fn new(
        on_stream: impl Fn(&str) + Send + Sync + 'static,
        on_complete: impl Fn() + Send + Sync + 'static,
        on_error: impl Fn(AiError) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_stream: Box::new(on_stream),
            on_complete: Box::new(on_complete),
            on_error: Box::new(on_error),
        }
    }
}

impl ResponseHandler for CallbackHandler {
    fn on_stream(&self, delta: &str) {
        (self.on_stream)(delta)
    }

    fn on_complete(&self) {
        (self.on_complete)()
    }

    fn on_error(&self, err: AiError) {
        (self.on_error)(err)
    }
}
