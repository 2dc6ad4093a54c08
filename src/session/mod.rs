//! Chat session controller: transcript, context window, stream merging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{AiService, ResponseHandler};
use crate::error::AiError;
use crate::types::{AiMessage, ChatEntry};

/// Turns of transcript history sent with each request, system prompt excluded.
const CONTEXT_WINDOW: usize = 10;

/// Delay before a queued external message is injected, giving the chat
/// surface time to become visible.
pub const DEFAULT_PENDING_DELAY: Duration = Duration::from_millis(500);

/// Fixed prompt prepended to every conversation window.
pub const CHAT_SYSTEM_PROMPT: &str = "\
You are a thoughtful assistant who helps the user think through problems. \
Keep a friendly, professional tone, give clear and insightful answers, and \
say so honestly when you are unsure.";

/// Where a session is in its request lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Sending,
}

/// Observable state of a chat session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSnapshot {
    pub entries: Vec<ChatEntry>,
    pub state: SessionState,
    pub last_error: Option<String>,
}

struct SessionInner {
    entries: Vec<ChatEntry>,
    state: SessionState,
    last_error: Option<String>,
}

struct SessionShared {
    service: Arc<dyn AiService>,
    inner: Mutex<SessionInner>,
    /// Latest issued request generation; callbacks from older requests are
    /// ignored.
    generation: AtomicU64,
    snapshot_tx: watch::Sender<ChatSnapshot>,
    system_prompt: String,
    window: usize,
}

impl SessionShared {
    fn broadcast(&self, inner: &SessionInner) {
        let _ = self.snapshot_tx.send_replace(ChatSnapshot {
            entries: inner.entries.clone(),
            state: inner.state,
            last_error: inner.last_error.clone(),
        });
    }
}

/// Maintains an ordered chat transcript and drives one request at a time
/// through an [`AiService`].
///
/// State machine: `Idle -> Sending -> Idle` (on completion or error). A
/// `send` while already `Sending` is rejected with [`AiError::Busy`].
/// Streamed deltas merge into the trailing assistant entry; the first delta
/// of a response creates that entry.
#[derive(Clone)]
pub struct ChatSession {
    shared: Arc<SessionShared>,
}

impl ChatSession {
    pub fn new(service: Arc<dyn AiService>) -> Self {
        Self::with_system_prompt(service, CHAT_SYSTEM_PROMPT)
    }

    /// Create a session with a custom system prompt.
    pub fn with_system_prompt(service: Arc<dyn AiService>, prompt: impl Into<String>) -> Self {
        let (snapshot_tx, _) = watch::channel(ChatSnapshot::default());
        Self {
            shared: Arc::new(SessionShared {
                service,
                inner: Mutex::new(SessionInner {
                    entries: Vec::new(),
                    state: SessionState::Idle,
                    last_error: None,
                }),
                generation: AtomicU64::new(0),
                snapshot_tx,
                system_prompt: prompt.into(),
                window: CONTEXT_WINDOW,
            }),
        }
    }

    /// Seed the transcript, e.g. from a persisted copy.
    pub fn restore_entries(&self, entries: Vec<ChatEntry>) {
        let mut inner = self.lock();
        inner.entries = entries;
        self.shared.broadcast(&inner);
    }

    /// Send a user message and stream the reply into the transcript.
    ///
    /// A trimmed-empty `text` is a no-op; a send while a request is in
    /// flight returns [`AiError::Busy`].
    pub fn send(&self, text: &str) -> Result<(), AiError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let window = {
            let mut inner = self.lock();
            if inner.state == SessionState::Sending {
                return Err(AiError::Busy);
            }

            inner.entries.push(ChatEntry::user(text));
            inner.state = SessionState::Sending;
            inner.last_error = None;
            self.shared.broadcast(&inner);
            self.conversation_window(&inner)
        };

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, turns = window.len() - 1, "chat send");

        let handler = Arc::new(SessionResponseHandler {
            shared: Arc::clone(&self.shared),
            generation,
        });
        self.shared.service.send_messages(window, handler);
        Ok(())
    }

    /// Drain queued external messages into `send`, waiting `delay` before
    /// each injection and re-trying while the session is busy. FIFO.
    pub fn serve_pending(&self, mut rx: PendingReceiver, delay: Duration) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                tokio::time::sleep(delay).await;
                loop {
                    match session.send(&text) {
                        Err(AiError::Busy) => tokio::time::sleep(delay).await,
                        _ => break,
                    }
                }
            }
        })
    }

    /// Watch transcript and state changes.
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Current observable state.
    pub fn snapshot(&self) -> ChatSnapshot {
        let inner = self.lock();
        ChatSnapshot {
            entries: inner.entries.clone(),
            state: inner.state,
            last_error: inner.last_error.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn entries(&self) -> Vec<ChatEntry> {
        self.lock().entries.clone()
    }

    /// The system prompt plus the trailing transcript window. The system
    /// prompt is always first and never counts toward the window.
    fn conversation_window(&self, inner: &SessionInner) -> Vec<AiMessage> {
        let mut messages = vec![AiMessage::system(self.shared.system_prompt.clone())];
        let start = inner.entries.len().saturating_sub(self.shared.window);
        messages.extend(inner.entries[start..].iter().map(ChatEntry::to_message));
        messages
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionInner> {
        self.shared.inner.lock().expect("session lock poisoned")
    }
}

struct SessionResponseHandler {
    shared: Arc<SessionShared>,
    generation: u64,
}

impl SessionResponseHandler {
    /// A callback from a superseded request must not touch the transcript.
    fn is_stale(&self) -> bool {
        self.generation != self.shared.generation.load(Ordering::SeqCst)
    }
}

impl ResponseHandler for SessionResponseHandler {
    fn on_stream(&self, delta: &str) {
        let mut inner = self.shared.inner.lock().expect("session lock poisoned");
        if self.is_stale() {
            return;
        }
        match inner.entries.last_mut() {
            Some(last) if !last.is_from_user => last.content.push_str(delta),
            _ => inner.entries.push(ChatEntry::assistant(delta)),
        }
        self.shared.broadcast(&inner);
    }

    fn on_complete(&self) {
        let mut inner = self.shared.inner.lock().expect("session lock poisoned");
        if self.is_stale() {
            return;
        }
        inner.state = SessionState::Idle;
        self.shared.broadcast(&inner);
    }

    fn on_error(&self, err: AiError) {
        let mut inner = self.shared.inner.lock().expect("session lock poisoned");
        if self.is_stale() {
            return;
        }
        warn!(%err, "chat request failed");
        inner.state = SessionState::Idle;
        inner.last_error = Some(err.to_string());
        self.shared.broadcast(&inner);
    }
}

/// Sender half of the explicit pending-message queue.
///
/// Owned by the composing application; any surface may clone it and enqueue
/// text for the chat surface to pick up.
#[derive(Clone)]
pub struct PendingSender {
    tx: mpsc::UnboundedSender<String>,
}

impl PendingSender {
    /// Queue a message for injection. Returns false if the chat surface has
    /// stopped draining.
    pub fn enqueue(&self, text: impl Into<String>) -> bool {
        self.tx.send(text.into()).is_ok()
    }
}

/// Receiver half, handed to [`ChatSession::serve_pending`].
pub type PendingReceiver = mpsc::UnboundedReceiver<String>;

/// Create the pending-message queue pair.
pub fn pending_channel() -> (PendingSender, PendingReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PendingSender { tx }, rx)
}
