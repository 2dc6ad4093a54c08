//! Reflection controller: splices a streamed AI commentary into a note.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::client::{AiService, ResponseHandler};
use crate::error::AiError;
use crate::types::AiMessage;

/// Fixed prompt for reflective-question generation.
pub const REFLECTION_SYSTEM_PROMPT: &str = "\
You are an assistant skilled at reflective thinking. Consider the user's \
text carefully and respond with deep, probing questions that help them \
reflect on what they wrote.";

const OPENING_MARKER: &str = "\n[REFLECTION:";
const CLOSING_MARKER: &str = "]\n";

/// Callback through which updated document text is published to its owner.
pub type ContentUpdateFn = Arc<dyn Fn(String) + Send + Sync>;

struct ReflectionState {
    /// Snapshot of the document at invocation time. Every splice recomputes
    /// from this base, never from previously published output.
    base: String,
    /// Character offset of the end of the original selection.
    insert_at: usize,
    accumulated: String,
}

struct ReflectionShared {
    service: Arc<dyn AiService>,
    state: Mutex<Option<ReflectionState>>,
    generating: AtomicBool,
    generation: AtomicU64,
    on_update: ContentUpdateFn,
}

impl ReflectionShared {
    fn clear(&self) {
        *self.state.lock().expect("reflection lock poisoned") = None;
        self.generating.store(false, Ordering::SeqCst);
    }
}

/// Requests an AI reflection on a selected span of text and splices the
/// accumulating result back into the host document.
///
/// Each streamed chunk re-splices the entire accumulator into the original
/// base snapshot at the selection's end offset, so updates are idempotent
/// against the base text rather than cumulative against intermediate edits.
#[derive(Clone)]
pub struct ReflectionSession {
    shared: Arc<ReflectionShared>,
}

impl ReflectionSession {
    pub fn new(service: Arc<dyn AiService>, on_update: ContentUpdateFn) -> Self {
        Self {
            shared: Arc::new(ReflectionShared {
                service,
                state: Mutex::new(None),
                generating: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                on_update,
            }),
        }
    }

    /// Start a reflection on `selected_text`, a span of `base_document`
    /// ending at the character offset `selection.end`.
    ///
    /// No-op when the selection is empty or its end offset does not fall
    /// within the document.
    pub fn generate_reflection(
        &self,
        selected_text: &str,
        base_document: &str,
        selection: Range<usize>,
    ) {
        if selected_text.is_empty() {
            return;
        }
        if char_to_byte_offset(base_document, selection.end).is_none() {
            warn!(end = selection.end, "selection outside document, ignoring");
            return;
        }

        {
            let mut state = self.shared.state.lock().expect("reflection lock poisoned");
            *state = Some(ReflectionState {
                base: base_document.to_string(),
                insert_at: selection.end,
                accumulated: OPENING_MARKER.to_string(),
            });
        }
        self.shared.generating.store(true, Ordering::SeqCst);

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, chars = selected_text.chars().count(), "reflection requested");

        let messages = vec![
            AiMessage::system(REFLECTION_SYSTEM_PROMPT),
            AiMessage::user(selected_text),
        ];
        let handler = Arc::new(ReflectionResponseHandler {
            shared: Arc::clone(&self.shared),
            generation,
        });
        self.shared.service.send_messages(messages, handler);
    }

    /// Abort the in-flight reflection and discard its state. No further
    /// document updates are published.
    pub fn cancel(&self) {
        // Bump the generation first so callbacks already scheduled by the
        // transport are ignored even if they land after the abort.
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.service.cancel_current_request();
        self.shared.clear();
    }

    pub fn is_generating(&self) -> bool {
        self.shared.generating.load(Ordering::SeqCst)
    }
}

struct ReflectionResponseHandler {
    shared: Arc<ReflectionShared>,
    generation: u64,
}

impl ReflectionResponseHandler {
    fn is_stale(&self) -> bool {
        self.generation != self.shared.generation.load(Ordering::SeqCst)
    }
}

impl ResponseHandler for ReflectionResponseHandler {
    fn on_stream(&self, delta: &str) {
        let published = {
            let mut state = self.shared.state.lock().expect("reflection lock poisoned");
            if self.is_stale() {
                return;
            }
            match state.as_mut() {
                Some(st) => {
                    st.accumulated.push_str(delta);
                    splice_at_char(&st.base, st.insert_at, &st.accumulated)
                }
                None => return,
            }
        };
        (self.shared.on_update)(published);
    }

    fn on_complete(&self) {
        let published = {
            let mut state = self.shared.state.lock().expect("reflection lock poisoned");
            if self.is_stale() {
                return;
            }
            match state.take() {
                Some(mut st) => {
                    st.accumulated.push_str(CLOSING_MARKER);
                    splice_at_char(&st.base, st.insert_at, &st.accumulated)
                }
                None => return,
            }
        };
        self.shared.generating.store(false, Ordering::SeqCst);
        (self.shared.on_update)(published);
    }

    fn on_error(&self, err: AiError) {
        if self.is_stale() {
            return;
        }
        warn!(%err, "reflection request failed");
        self.shared.clear();
    }
}

/// Byte index of the `chars`-th character, or None when out of range.
/// `chars == char count` maps to the end of the string.
fn char_to_byte_offset(s: &str, chars: usize) -> Option<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .nth(chars)
}

/// Insert `insert` into `base` at the given character offset. An offset
/// outside the document returns the base unchanged.
fn splice_at_char(base: &str, at: usize, insert: &str) -> String {
    match char_to_byte_offset(base, at) {
        Some(byte) => {
            let mut out = String::with_capacity(base.len() + insert.len());
            out.push_str(&base[..byte]);
            out.push_str(insert);
            out.push_str(&base[byte..]);
            out
        }
        None => base.to_string(),
    }
}
