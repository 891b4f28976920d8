//! Common test utilities for WireLink integration tests
//!
//! Provides a scriptable transport (tests inject the events a real socket
//! would raise) and a recording handler capturing every routed callback.

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wirelink::{Message, Result, SessionError, SessionHandler, Transport, TransportEvent};

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Shared control surface of a [`MockTransport`]
#[derive(Default)]
pub struct MockControls {
    events: Mutex<Option<Sender<TransportEvent>>>,
    pub sent_texts: Mutex<Vec<String>>,
    pub sent_binaries: Mutex<Vec<Vec<u8>>>,
    pub start_count: AtomicUsize,
    pub stop_count: AtomicUsize,
    pub last_target: Mutex<String>,
    /// When set (the default), `stop()` emits `Closed` like a well-behaved
    /// transport confirming shutdown
    pub auto_close: AtomicBool,
    /// When set, the next `initialize` fails once (network subsystem
    /// refusing to come up)
    pub fail_initialize: AtomicBool,
}

impl MockControls {
    /// Inject an event as if the transport's background context raised it
    pub fn emit(&self, event: TransportEvent) {
        let guard = self.events.lock();
        let tx = guard.as_ref().expect("transport not initialized");
        tx.send(event).expect("event channel closed");
    }
}

/// A scriptable in-memory transport
pub struct MockTransport {
    controls: Arc<MockControls>,
}

impl MockTransport {
    pub fn new() -> Self {
        let controls = Arc::new(MockControls::default());
        controls.auto_close.store(true, Ordering::SeqCst);
        Self { controls }
    }

    pub fn controls(&self) -> Arc<MockControls> {
        Arc::clone(&self.controls)
    }
}

impl Transport for MockTransport {
    fn initialize(&self, events: Sender<TransportEvent>) -> Result<()> {
        if self.controls.fail_initialize.swap(false, Ordering::SeqCst) {
            return Err(SessionError::Transport("init refused".into()));
        }
        *self.controls.events.lock() = Some(events);
        Ok(())
    }

    fn set_target(&self, url: &str) {
        *self.controls.last_target.lock() = url.to_string();
    }

    fn start(&self) -> Result<()> {
        self.controls.start_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.controls.stop_count.fetch_add(1, Ordering::SeqCst);
        if self.controls.auto_close.load(Ordering::SeqCst) {
            self.controls.emit(TransportEvent::Closed);
        }
    }

    fn send_text(&self, text: &str) -> Result<()> {
        self.controls.sent_texts.lock().push(text.to_string());
        Ok(())
    }

    fn send_binary(&self, data: &[u8]) -> Result<()> {
        self.controls.sent_binaries.lock().push(data.to_vec());
        Ok(())
    }

    fn send_ping(&self, _payload: &[u8]) -> Result<()> {
        Ok(())
    }

    fn set_heartbeat_interval(&self, _interval: Duration) {}

    fn set_compression_enabled(&self, _enabled: bool) {}
}

/// Everything the router can deliver, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Text(Message),
    BinaryStart(Message),
    Chunk(usize),
    Complete,
    ProtocolError(String),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
}

/// Handler that records every callback it receives
#[derive(Default)]
pub struct RecordingHandler {
    pub events: Mutex<Vec<Recorded>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> Vec<Recorded> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Recorded) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl SessionHandler for RecordingHandler {
    fn on_text_message(&self, msg: &Message) {
        self.events.lock().push(Recorded::Text(msg.clone()));
    }

    fn on_binary_start(&self, msg: &Message) {
        self.events.lock().push(Recorded::BinaryStart(msg.clone()));
    }

    fn on_binary_chunk(&self, data: &[u8]) {
        self.events.lock().push(Recorded::Chunk(data.len()));
    }

    fn on_binary_complete(&self) {
        self.events.lock().push(Recorded::Complete);
    }

    fn on_protocol_error(&self, reason: &str) {
        self.events
            .lock()
            .push(Recorded::ProtocolError(reason.to_string()));
    }

    fn on_ping(&self, payload: &[u8]) {
        self.events.lock().push(Recorded::Ping(payload.to_vec()));
    }

    fn on_pong(&self, payload: &[u8]) {
        self.events.lock().push(Recorded::Pong(payload.to_vec()));
    }
}

/// Poll `condition` until it holds or the timeout elapses
///
/// Events travel through the session's consumer thread, so observable
/// effects are eventually consistent from the test's point of view.
pub fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
