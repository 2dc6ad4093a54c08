//! Shared test helpers: a scripted mock AI service.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use marginalia::client::{AiService, ResponseHandler};
use marginalia::error::AiError;
use marginalia::types::AiMessage;

/// How a scripted response ends.
pub enum ScriptEnd {
    Complete,
    Error(AiError),
    /// Deliver the deltas, then go silent: the request never finishes.
    Hang,
}

pub struct Script {
    pub deltas: Vec<String>,
    pub end: ScriptEnd,
}

/// A mock service that replays queued scripts synchronously.
///
/// Requests are recorded so tests can assert on the conversation window.
pub struct MockService {
    scripts: Mutex<Vec<Script>>,
    requests: Mutex<Vec<Vec<AiMessage>>>,
    cancellations: AtomicUsize,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            cancellations: AtomicUsize::new(0),
        }
    }

    /// Queue a reply that streams `deltas` and completes.
    pub fn queue_reply(&self, deltas: &[&str]) {
        self.scripts.lock().unwrap().push(Script {
            deltas: deltas.iter().map(|d| d.to_string()).collect(),
            end: ScriptEnd::Complete,
        });
    }

    /// Queue a reply that streams `deltas` and then fails.
    pub fn queue_error(&self, deltas: &[&str], err: AiError) {
        self.scripts.lock().unwrap().push(Script {
            deltas: deltas.iter().map(|d| d.to_string()).collect(),
            end: ScriptEnd::Error(err),
        });
    }

    /// Queue a reply that streams `deltas` and never finishes.
    pub fn queue_hang(&self, deltas: &[&str]) {
        self.scripts.lock().unwrap().push(Script {
            deltas: deltas.iter().map(|d| d.to_string()).collect(),
            end: ScriptEnd::Hang,
        });
    }

    pub fn last_request(&self) -> Option<Vec<AiMessage>> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }
}

impl AiService for MockService {
    fn send_messages(&self, messages: Vec<AiMessage>, handler: Arc<dyn ResponseHandler>) {
        self.requests.lock().unwrap().push(messages);

        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.is_empty() {
                Script {
                    deltas: Vec::new(),
                    end: ScriptEnd::Complete,
                }
            } else {
                scripts.remove(0)
            }
        };

        for delta in &script.deltas {
            handler.on_stream(delta);
        }
        match script.end {
            ScriptEnd::Complete => handler.on_complete(),
            ScriptEnd::Error(err) => handler.on_error(err),
            ScriptEnd::Hang => {}
        }
    }

    fn cancel_current_request(&self) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
    }
}
