//! Demonstration client
//!
//! Exercises the full session lifecycle against a local echo server
//! (`cargo run --bin echo_server` in another terminal):
//! connect, hello handshake, an announced 1 MiB binary transfer, a wait for
//! the echoed responses, then graceful shutdown.

use anyhow::{bail, Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use wirelink::{
    serialize_message, Message, MessageType, SessionClient, SessionConfig, SessionHandler,
    WsTransport,
};

const SERVER_URL: &str = "ws://127.0.0.1:9001";
const BINARY_SIZE: usize = 1024 * 1024;

/// Logs everything the session routes back to us
struct DemoHandler {
    bytes_received: AtomicU64,
}

impl SessionHandler for DemoHandler {
    fn on_text_message(&self, msg: &Message) {
        info!(
            "Received {} message, id={}, content={:?}",
            msg.message_type.label(),
            msg.msg_id,
            msg.content
        );
    }

    fn on_binary_start(&self, msg: &Message) {
        info!("Binary transfer starting, expecting {} bytes", msg.binary_size);
        self.bytes_received.store(0, Ordering::SeqCst);
    }

    fn on_binary_chunk(&self, data: &[u8]) {
        let total = self
            .bytes_received
            .fetch_add(data.len() as u64, Ordering::SeqCst)
            + data.len() as u64;
        info!("Received binary chunk of {} bytes (total {})", data.len(), total);
    }

    fn on_binary_complete(&self) {
        info!(
            "Binary transfer complete, {} bytes received",
            self.bytes_received.load(Ordering::SeqCst)
        );
    }

    fn on_protocol_error(&self, reason: &str) {
        error!("Protocol error: {}", reason);
    }
}

fn main() -> Result<()> {
    wirelink_client::init_tracing();

    let config = SessionConfig::default();
    info!(
        "Configuration: connect timeout {:?}, max binary payload {} MiB",
        config.connection_timeout,
        config.max_binary_payload / (1024 * 1024)
    );
    let connection_timeout = config.connection_timeout;

    let client = SessionClient::new(WsTransport::new(), config)
        .context("invalid session configuration")?;
    client.set_handler(Some(Arc::new(DemoHandler {
        bytes_received: AtomicU64::new(0),
    })));

    client.open().context("failed to open session")?;
    client
        .connect(SERVER_URL)
        .with_context(|| format!("failed to initiate connection to {SERVER_URL}"))?;

    info!("Waiting for connection...");
    if !client.wait_for_connection(connection_timeout) {
        bail!("connection to {SERVER_URL} failed or timed out");
    }

    // Handshake
    let hello = Message::with_content(MessageType::Hello, "msg_001", "hello from wirelink");
    client
        .send_text(&serialize_message(&hello))
        .context("failed to send hello")?;

    // Announce then send a 1 MiB binary payload
    let announce = Message::binary_start("msg_002", BINARY_SIZE as u64);
    client
        .send_text(&serialize_message(&announce))
        .context("failed to announce binary transfer")?;

    let payload = vec![0xABu8; BINARY_SIZE];
    client
        .send_binary(&payload)
        .context("failed to send binary payload")?;
    info!("Sent {} byte binary payload", payload.len());

    // Let the echo server reflect everything back through the handler
    info!("Waiting for echoed responses...");
    std::thread::sleep(Duration::from_secs(3));

    client.close();
    info!("Done");
    Ok(())
}
