use crate::error::Result;
use crossbeam_channel::Sender;
use std::time::Duration;

/// Largest ping payload a WebSocket control frame can carry
pub const MAX_PING_PAYLOAD: usize = 125;

/// Events raised by the transport collaborator
///
/// The transport owns exactly one background execution context and pushes
/// every event into the channel handed to it at `initialize`. Events must be
/// delivered in the order the transport observed them; the session relies on
/// this so a `binary_start` announcement is fully processed before the first
/// chunk of the same transfer arrives.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Connection established and ready for traffic
    Opened,
    /// A data frame arrived; `is_binary` distinguishes text from binary
    Message { payload: Vec<u8>, is_binary: bool },
    /// Connection shut down (locally requested or server-initiated)
    Closed,
    /// Transport-level failure (connect refused, socket error, ...)
    Error(String),
    /// Ping control frame received
    Ping(Vec<u8>),
    /// Pong control frame received
    Pong(Vec<u8>),
}

/// Contract for the external frame-transport collaborator
///
/// The session layer treats the WebSocket implementation (handshake,
/// masking, fragmentation, TLS, ping/pong frame generation) as a black box
/// behind this trait. [`crate::transport::WsTransport`] is the shipped
/// implementation; tests substitute a scriptable mock.
///
/// Send methods must be safe to call on a half-closed connection and report
/// failure instead of corrupting state: the session checks connectivity
/// before sending but releases its state lock across the call, so a send
/// may race with a concurrent disconnect. That check-then-act gap is an
/// accepted part of the contract.
pub trait Transport: Send + Sync + 'static {
    /// One-time wiring of the event channel; idempotent
    ///
    /// Fails only if the transport's network subsystem cannot initialize.
    fn initialize(&self, events: Sender<TransportEvent>) -> Result<()>;

    /// Set the URL for the next `start`
    fn set_target(&self, url: &str);

    /// Begin connecting to the configured target (non-blocking)
    fn start(&self) -> Result<()>;

    /// Request shutdown of the active connection
    ///
    /// Must eventually cause a `Closed` event, even when the connection is
    /// already dead.
    fn stop(&self);

    /// Send a text frame
    fn send_text(&self, text: &str) -> Result<()>;

    /// Send a binary frame
    fn send_binary(&self, data: &[u8]) -> Result<()>;

    /// Send a ping control frame; payload limited to [`MAX_PING_PAYLOAD`]
    fn send_ping(&self, payload: &[u8]) -> Result<()>;

    /// Enable a periodic keep-alive ping (zero disables)
    fn set_heartbeat_interval(&self, interval: Duration);

    /// Toggle per-message compression, where the implementation supports it
    fn set_compression_enabled(&self, enabled: bool);
}
