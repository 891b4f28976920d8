//! Client facade
//!
//! [`SessionClient`] composes the connection state machine, codec,
//! reassembler and router around a [`Transport`] collaborator and exposes
//! the blocking application surface: open, connect, wait, send, close.
//!
//! Thread model: the transport raises events from its own execution
//! context into a bounded channel; one consumer thread owned by the client
//! drains it. Facade methods may be called concurrently from any number of
//! application threads. Only `wait_for_connection` and `close` block, both
//! bounded by explicit timeouts.

use crate::core::config::SessionConfig;
use crate::core::reassembly::BinaryReassembler;
use crate::core::router::MessageRouter;
use crate::core::session::EventProcessor;
use crate::core::state::{ConnectionState, SessionState};
use crate::traits::{Result, SessionError, SessionHandler, Transport, TransportEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Capacity of the transport event channel
///
/// Bounded so a stalled handler applies backpressure to the transport
/// instead of growing an unbounded queue.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Bound on the shutdown-completion wait inside `close`
const CLOSE_WAIT: Duration = Duration::from_secs(1);

/// Session client over a pluggable transport
///
/// ```ignore
/// let client = SessionClient::new(WsTransport::new(), SessionConfig::default())?;
/// client.set_handler(Some(Arc::new(AppHandler)));
/// client.open()?;
/// client.connect("ws://127.0.0.1:9001")?;
/// if client.wait_for_connection(Duration::from_secs(10)) {
///     client.send_text(&serialize_message(&hello))?;
/// }
/// client.close();
/// ```
pub struct SessionClient<T: Transport> {
    config: SessionConfig,
    state: Arc<SessionState>,
    router: Arc<MessageRouter>,
    reassembler: Arc<BinaryReassembler>,
    transport: Arc<T>,
    opened: AtomicBool,
    consumer: Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl<T: Transport> SessionClient<T> {
    /// Build a client; the configuration is validated here, exactly once
    pub fn new(transport: T, config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let router = Arc::new(MessageRouter::new());
        let reassembler = Arc::new(BinaryReassembler::new(
            Arc::clone(&router),
            config.max_binary_payload,
        ));

        Ok(Self {
            config,
            state: Arc::new(SessionState::new()),
            router,
            reassembler,
            transport: Arc::new(transport),
            opened: AtomicBool::new(false),
            consumer: Mutex::new(None),
        })
    }

    /// One-time collaborator initialization; idempotent
    ///
    /// Wires the bounded event channel into the transport and spawns the
    /// consumer thread. Fails only if the transport cannot initialize its
    /// network subsystem.
    pub fn open(&self) -> Result<()> {
        if self.opened.swap(true, Ordering::AcqRel) {
            debug!("open() called on an already-open client");
            return Ok(());
        }

        let (events_tx, events_rx) =
            crossbeam_channel::bounded::<TransportEvent>(EVENT_CHANNEL_CAPACITY);
        if let Err(e) = self.transport.initialize(events_tx) {
            self.opened.store(false, Ordering::Release);
            return Err(e);
        }

        self.transport
            .set_compression_enabled(self.config.compression_enabled);

        let processor = EventProcessor::new(
            Arc::clone(&self.state),
            Arc::clone(&self.router),
            Arc::clone(&self.reassembler),
        );
        let handle = match std::thread::Builder::new()
            .name("wirelink-events".to_string())
            .spawn(move || processor.run(events_rx))
        {
            Ok(handle) => handle,
            Err(e) => {
                // unwind fully so a retry of open() starts from scratch
                self.opened.store(false, Ordering::Release);
                return Err(SessionError::Transport(format!(
                    "failed to spawn consumer: {e}"
                )));
            }
        };
        *self.consumer.lock() = Some(handle);

        info!(
            "Session opened (protocol {}, max binary payload {} bytes)",
            self.config.protocol_version, self.config.max_binary_payload
        );
        Ok(())
    }

    /// Initiate a connection (non-blocking)
    ///
    /// Requires the Disconnected state; otherwise fails with no side
    /// effects. A transport start failure reverts the state so the caller
    /// can retry.
    pub fn connect(&self, url: &str) -> Result<()> {
        if !self.opened.load(Ordering::Acquire) {
            return Err(SessionError::InvalidState(
                "client not opened; call open() first".into(),
            ));
        }
        if !self.state.try_begin_connect() {
            warn!("Cannot connect: already connecting or connected");
            return Err(SessionError::InvalidState(format!(
                "connect requires Disconnected state, current state is {}",
                self.state.get().label()
            )));
        }

        self.transport.set_target(url);
        if let Err(e) = self.transport.start() {
            self.state.abort_connect();
            return Err(e);
        }
        info!("Connection initiated to {}", url);
        Ok(())
    }

    /// Block until connected, failed, or the timeout elapses
    ///
    /// Returns `false` without blocking when the state is neither
    /// Connecting nor Connected.
    pub fn wait_for_connection(&self, timeout: Duration) -> bool {
        let connected = self.state.wait_for_connection(timeout);
        if connected {
            info!("Connected successfully");
        } else {
            warn!("Connection timeout or failure (state {})", self.state.get().label());
        }
        connected
    }

    /// Send a text frame; permitted only while Connected
    ///
    /// The connectivity check and the transport send are deliberately not
    /// atomic: holding the state lock across the send could deadlock with a
    /// concurrently firing transport event, so a send may still fail after
    /// the check when the connection drops in between.
    pub fn send_text(&self, text: &str) -> Result<()> {
        self.require_connected("send_text")?;
        self.transport.send_text(text)?;
        debug!("[SEND][TEXT] {}", text);
        Ok(())
    }

    /// Send a binary frame; permitted only while Connected and within the
    /// configured payload limit
    pub fn send_binary(&self, data: &[u8]) -> Result<()> {
        self.require_connected("send_binary")?;
        let size = data.len() as u64;
        if size > self.config.max_binary_payload {
            return Err(SessionError::PayloadTooLarge {
                size,
                max: self.config.max_binary_payload,
            });
        }
        self.transport.send_binary(data)?;
        debug!("[SEND][BINARY] size={}", data.len());
        Ok(())
    }

    /// Send a ping control frame
    pub fn send_ping(&self, payload: &[u8]) -> Result<()> {
        self.require_connected("send_ping")?;
        self.transport.send_ping(payload)
    }

    /// Enable a periodic keep-alive ping on the transport (zero disables)
    pub fn set_heartbeat_interval(&self, interval: Duration) {
        self.transport.set_heartbeat_interval(interval);
    }

    /// Current connection state; safe from any thread
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Atomically attach, replace, or (with `None`) detach the handler
    pub fn set_handler(&self, handler: Option<Arc<dyn SessionHandler>>) {
        self.router.set_handler(handler);
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Transfer accounting snapshot (diagnostics and tests)
    pub fn transfer_state(&self) -> crate::core::reassembly::TransferState {
        self.reassembler.snapshot()
    }

    /// Gracefully close the connection
    ///
    /// No-op when already Disconnected. Otherwise requests transport stop
    /// and waits a bounded interval for the shutdown-completed signal; on
    /// timeout the state is forced to Disconnected and a warning logged.
    /// The transport may still be unwinding its own thread, but the client
    /// is left in a usable terminal state either way.
    pub fn close(&self) {
        if !self.state.try_begin_close() {
            debug!("close() on a disconnected client is a no-op");
            return;
        }

        self.transport.stop();

        if self.state.wait_for_close(CLOSE_WAIT) {
            info!("Connection closed");
        } else {
            warn!(
                "Shutdown confirmation not received within {:?}; forcing Disconnected",
                CLOSE_WAIT
            );
            self.state.force_disconnected();
        }
    }

    fn require_connected(&self, op: &str) -> Result<()> {
        let state = self.state.get();
        if state != ConnectionState::Connected {
            warn!("Cannot {}: not connected (state {})", op, state.label());
            return Err(SessionError::InvalidState(format!(
                "{op} requires Connected state, current state is {}",
                state.label()
            )));
        }
        Ok(())
    }
}

impl<T: Transport> Drop for SessionClient<T> {
    fn drop(&mut self) {
        if self.state.get() != ConnectionState::Disconnected {
            self.close();
        }
        // The consumer thread exits once the transport drops its event
        // sender; detach rather than join to keep drop non-blocking
        let _ = self.consumer.lock().take();
    }
}
