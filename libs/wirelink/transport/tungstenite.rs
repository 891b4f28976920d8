//! WebSocket transport over tokio-tungstenite
//!
//! One `start()` spawns one I/O thread running a current-thread tokio
//! runtime: connect, then a select loop over inbound socket frames, the
//! command channel (send/stop requests from application threads) and an
//! optional heartbeat ticker. Every observation is pushed into the event
//! channel wired in at `initialize`; the session's consumer thread does the
//! rest.
//!
//! There is no automatic reconnection: the session layer owns lifecycle
//! policy, and a failed connection surfaces as an `Error` event.

use crate::traits::{Result, SessionError, Transport, TransportEvent, MAX_PING_PAYLOAD};
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Control messages from application threads to the I/O loop
#[derive(Debug)]
enum IoCommand {
    /// Send a text frame
    SendText(String),
    /// Send a binary frame
    SendBinary(Vec<u8>),
    /// Send a ping control frame
    Ping(Vec<u8>),
    /// Close the connection and exit the loop
    Stop,
}

#[derive(Default)]
struct Shared {
    events: Option<Sender<TransportEvent>>,
    url: String,
    command_tx: Option<Sender<IoCommand>>,
    io_thread: Option<std::thread::JoinHandle<()>>,
}

/// Tokio-tungstenite implementation of the [`Transport`] contract
pub struct WsTransport {
    shared: Mutex<Shared>,
    /// Heartbeat interval in milliseconds; 0 disables the ticker
    heartbeat_ms: Arc<AtomicU64>,
    compression: AtomicBool,
}

impl WsTransport {
    pub fn new() -> Self {
        Self {
            shared: Mutex::new(Shared::default()),
            heartbeat_ms: Arc::new(AtomicU64::new(0)),
            compression: AtomicBool::new(false),
        }
    }

    fn send_command(&self, cmd: IoCommand) -> Result<()> {
        let shared = self.shared.lock();
        let tx = shared
            .command_tx
            .as_ref()
            .ok_or_else(|| SessionError::Transport("transport not started".into()))?;
        tx.send(cmd)
            .map_err(|e| SessionError::ChannelSend(e.to_string()))
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WsTransport {
    fn initialize(&self, events: Sender<TransportEvent>) -> Result<()> {
        let mut shared = self.shared.lock();
        if shared.events.is_some() {
            debug!("Transport already initialized");
            return Ok(());
        }
        shared.events = Some(events);
        info!("Transport initialized");
        Ok(())
    }

    fn set_target(&self, url: &str) {
        self.shared.lock().url = url.to_string();
    }

    fn start(&self) -> Result<()> {
        let mut shared = self.shared.lock();

        let events = shared
            .events
            .clone()
            .ok_or_else(|| SessionError::Transport("transport not initialized".into()))?;
        if shared.url.is_empty() {
            return Err(SessionError::Transport("no target URL set".into()));
        }
        if let Some(handle) = &shared.io_thread {
            if !handle.is_finished() {
                return Err(SessionError::Transport("transport already started".into()));
            }
        }

        debug!(
            "Starting connection to {} (compression {})",
            shared.url,
            self.compression.load(Ordering::Acquire)
        );

        let (command_tx, command_rx) = unbounded();
        let url = shared.url.clone();
        let heartbeat_ms = Arc::clone(&self.heartbeat_ms);

        let handle = std::thread::Builder::new()
            .name("wirelink-io".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        let _ = events.send(TransportEvent::Error(format!(
                            "failed to build I/O runtime: {e}"
                        )));
                        return;
                    }
                };
                runtime.block_on(run_connection(url, events, command_rx, heartbeat_ms));
            })
            .map_err(|e| SessionError::Transport(format!("failed to spawn I/O thread: {e}")))?;

        shared.command_tx = Some(command_tx);
        shared.io_thread = Some(handle);
        Ok(())
    }

    fn stop(&self) {
        let (tx, events) = {
            let mut shared = self.shared.lock();
            (shared.command_tx.take(), shared.events.clone())
        };

        let delivered = match tx {
            Some(tx) => tx.send(IoCommand::Stop).is_ok(),
            None => false,
        };
        if !delivered {
            // The I/O thread is already gone (connect failure, socket
            // error); confirm shutdown ourselves so close() never waits on
            // a dead thread
            debug!("I/O loop not running, reporting Closed directly");
            if let Some(events) = events {
                let _ = events.send(TransportEvent::Closed);
            }
        }
    }

    fn send_text(&self, text: &str) -> Result<()> {
        self.send_command(IoCommand::SendText(text.to_string()))
    }

    fn send_binary(&self, data: &[u8]) -> Result<()> {
        self.send_command(IoCommand::SendBinary(data.to_vec()))
    }

    fn send_ping(&self, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_PING_PAYLOAD {
            return Err(SessionError::Transport(format!(
                "ping payload of {} bytes exceeds the {} byte frame limit",
                payload.len(),
                MAX_PING_PAYLOAD
            )));
        }
        self.send_command(IoCommand::Ping(payload.to_vec()))
    }

    fn set_heartbeat_interval(&self, interval: Duration) {
        self.heartbeat_ms
            .store(interval.as_millis() as u64, Ordering::Release);
        debug!("Heartbeat interval set to {:?}", interval);
    }

    fn set_compression_enabled(&self, enabled: bool) {
        // Recorded for contract parity; this tungstenite build does not
        // negotiate permessage-deflate
        self.compression.store(enabled, Ordering::Release);
        if enabled {
            warn!("Compression requested but not negotiated by this transport");
        }
    }
}

/// Connect and run the frame loop until stop, close or error
async fn run_connection(
    url: String,
    events: Sender<TransportEvent>,
    command_rx: Receiver<IoCommand>,
    heartbeat_ms: Arc<AtomicU64>,
) {
    let ws_stream = match connect_async(&url).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            error!("Failed to connect to {}: {}", url, e);
            let _ = events.send(TransportEvent::Error(e.to_string()));
            return;
        }
    };

    info!("Connected to {}", url);
    let _ = events.send(TransportEvent::Opened);

    let (mut write, mut read) = ws_stream.split();
    let mut errored = false;

    // One long-lived bridge moves commands from the blocking crossbeam
    // receiver into an async channel the select loop can poll. A dequeued
    // command is always forwarded; polling the crossbeam receiver directly
    // from a select arm would let a cancelled future discard one.
    let (bridge_tx, mut commands) = mpsc::unbounded_channel::<IoCommand>();
    tokio::task::spawn_blocking(move || loop {
        match command_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(cmd) => {
                if bridge_tx.send(cmd).is_err() {
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                // Periodic liveness check so the bridge exits once the
                // I/O loop is gone
                if bridge_tx.is_closed() {
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    });

    loop {
        let heartbeat = heartbeat_ms.load(Ordering::Acquire);

        tokio::select! {
            // Inbound frames
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = events.send(TransportEvent::Message {
                            payload: text.into_bytes(),
                            is_binary: false,
                        });
                    }
                    Some(Ok(Message::Binary(data))) => {
                        let _ = events.send(TransportEvent::Message {
                            payload: data,
                            is_binary: true,
                        });
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        // tungstenite queues the pong reply itself
                        let _ = events.send(TransportEvent::Ping(payload));
                    }
                    Some(Ok(Message::Pong(payload))) => {
                        let _ = events.send(TransportEvent::Pong(payload));
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!("Close frame received");
                        break;
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        let _ = events.send(TransportEvent::Error(e.to_string()));
                        errored = true;
                        break;
                    }
                    None => {
                        warn!("WebSocket stream ended");
                        break;
                    }
                }
            }

            // Commands from application threads, via the bridge; mpsc recv
            // is cancel-safe, so losing the race to another branch never
            // drops a command
            cmd = commands.recv() => {
                match cmd {
                    Some(IoCommand::SendText(text)) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            error!("Failed to send text frame: {}", e);
                            let _ = events.send(TransportEvent::Error(e.to_string()));
                            errored = true;
                            break;
                        }
                    }
                    Some(IoCommand::SendBinary(data)) => {
                        if let Err(e) = write.send(Message::Binary(data)).await {
                            error!("Failed to send binary frame: {}", e);
                            let _ = events.send(TransportEvent::Error(e.to_string()));
                            errored = true;
                            break;
                        }
                    }
                    Some(IoCommand::Ping(payload)) => {
                        if let Err(e) = write.send(Message::Ping(payload)).await {
                            warn!("Failed to send ping: {}", e);
                        }
                    }
                    Some(IoCommand::Stop) => {
                        debug!("Stop requested, closing connection");
                        let _ = write.close().await;
                        break;
                    }
                    None => {
                        debug!("Command channel closed, closing connection");
                        let _ = write.close().await;
                        break;
                    }
                }
            }

            // Keep-alive ping when an interval is configured
            _ = async {
                if heartbeat > 0 {
                    tokio::time::sleep(Duration::from_millis(heartbeat)).await;
                } else {
                    std::future::pending::<()>().await;
                }
            } => {
                debug!("Heartbeat tick, sending ping");
                if let Err(e) = write.send(Message::Ping(Vec::new())).await {
                    warn!("Heartbeat ping failed: {}", e);
                }
            }
        }
    }

    // A socket error leaves the session in Error; a clean shutdown (stop
    // command, close frame, stream end) confirms with Closed
    if !errored {
        let _ = events.send(TransportEvent::Closed);
    }
    debug!("I/O loop exiting");
}
