//! Reflection controller tests: splice behavior and lifecycle.

mod common;

use std::sync::{Arc, Mutex};

use common::MockService;
use marginalia::client::{AiService, ResponseHandler};
use marginalia::error::AiError;
use marginalia::reflection::ReflectionSession;
use marginalia::types::{AiMessage, Role};
use pretty_assertions::assert_eq;

type Published = Arc<Mutex<Vec<String>>>;

fn capture() -> (Published, Arc<dyn Fn(String) + Send + Sync>) {
    let published: Published = Arc::new(Mutex::new(Vec::new()));
    let sink = published.clone();
    let callback = Arc::new(move |doc: String| sink.lock().unwrap().push(doc));
    (published, callback)
}

#[test]
fn each_update_splices_into_the_original_base() {
    let service = Arc::new(MockService::new());
    let (published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    service.queue_hang(&["a", "b", "c"]);
    reflection.generate_reflection("Hello", "Hello world", 0..5);

    let published = published.lock().unwrap();
    assert_eq!(published.len(), 3);
    assert_eq!(published[0], "Hello\n[REFLECTION:a world");
    assert_eq!(published[1], "Hello\n[REFLECTION:ab world");
    // Idempotent against the base, not cumulative against prior output.
    assert_eq!(published[2], "Hello\n[REFLECTION:abc world");
}

#[test]
fn completion_closes_the_marker_and_clears_state() {
    let service = Arc::new(MockService::new());
    let (published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    service.queue_reply(&["why?"]);
    reflection.generate_reflection("Hello", "Hello world", 0..5);

    {
        let published = published.lock().unwrap();
        assert_eq!(
            published.last().unwrap(),
            "Hello\n[REFLECTION:why?]\n world"
        );
    }
    assert!(!reflection.is_generating());

    // State is cleared: a fresh reflection starts from scratch.
    service.queue_reply(&["again"]);
    reflection.generate_reflection("world", "Hello world", 6..11);
    assert_eq!(
        published.lock().unwrap().last().unwrap(),
        "Hello world\n[REFLECTION:again]\n"
    );
}

#[test]
fn request_carries_the_reflection_prompt_and_selection() {
    let service = Arc::new(MockService::new());
    let (_published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    service.queue_reply(&[]);
    reflection.generate_reflection("the selected span", "the selected span plus", 0..17);

    let request = service.last_request().unwrap();
    assert_eq!(request.len(), 2);
    assert_eq!(request[0].role, Role::System);
    assert_eq!(request[1], AiMessage::user("the selected span"));
}

#[test]
fn empty_selection_is_a_no_op() {
    let service = Arc::new(MockService::new());
    let (published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    reflection.generate_reflection("", "document", 0..0);

    assert_eq!(service.request_count(), 0);
    assert!(published.lock().unwrap().is_empty());
    assert!(!reflection.is_generating());
}

#[test]
fn out_of_range_selection_is_a_no_op() {
    let service = Arc::new(MockService::new());
    let (published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    reflection.generate_reflection("abc", "abc", 0..4);

    assert_eq!(service.request_count(), 0);
    assert!(published.lock().unwrap().is_empty());
}

#[test]
fn splice_offsets_count_characters_not_bytes() {
    let service = Arc::new(MockService::new());
    let (published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    service.queue_hang(&["x"]);
    // "héllo" is five characters but six bytes.
    reflection.generate_reflection("héllo", "héllo wörld", 0..5);

    assert_eq!(
        published.lock().unwrap()[0],
        "héllo\n[REFLECTION:x wörld"
    );
}

#[test]
fn error_clears_state_without_publishing() {
    let service = Arc::new(MockService::new());
    let (published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    service.queue_error(&[], AiError::InvalidResponse);
    reflection.generate_reflection("Hello", "Hello world", 0..5);

    assert!(published.lock().unwrap().is_empty());
    assert!(!reflection.is_generating());
}

/// Service that retains handlers so tests can fire callbacks late.
struct RetainingService {
    handlers: Mutex<Vec<Arc<dyn ResponseHandler>>>,
    cancellations: Mutex<usize>,
}

impl RetainingService {
    fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            cancellations: Mutex::new(0),
        }
    }

    fn handler(&self, index: usize) -> Arc<dyn ResponseHandler> {
        self.handlers.lock().unwrap()[index].clone()
    }
}

impl AiService for RetainingService {
    fn send_messages(&self, _messages: Vec<AiMessage>, handler: Arc<dyn ResponseHandler>) {
        self.handlers.lock().unwrap().push(handler);
    }

    fn cancel_current_request(&self) {
        *self.cancellations.lock().unwrap() += 1;
    }
}

#[test]
fn cancel_stops_publishes_even_if_callbacks_land_late() {
    let service = Arc::new(RetainingService::new());
    let (published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    reflection.generate_reflection("Hello", "Hello world", 0..5);
    assert!(reflection.is_generating());

    reflection.cancel();
    assert_eq!(*service.cancellations.lock().unwrap(), 1);
    assert!(!reflection.is_generating());

    // The transport already scheduled these before the abort took effect.
    let late = service.handler(0);
    late.on_stream("late delta");
    late.on_complete();

    assert!(published.lock().unwrap().is_empty());
}

#[test]
fn a_newer_reflection_supersedes_the_old_request() {
    let service = Arc::new(RetainingService::new());
    let (published, on_update) = capture();
    let reflection = ReflectionSession::new(service.clone(), on_update);

    reflection.generate_reflection("Hello", "Hello world", 0..5);
    reflection.generate_reflection("world", "Hello world", 6..11);

    // The superseded request's callbacks are ignored.
    service.handler(0).on_stream("stale");
    assert!(published.lock().unwrap().is_empty());

    service.handler(1).on_stream("fresh");
    assert_eq!(
        published.lock().unwrap()[0],
        "Hello world\n[REFLECTION:fresh"
    );
}
