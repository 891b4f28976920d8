//! Transport event processing
//!
//! Exactly one consumer thread drains the bounded transport event channel
//! and runs [`EventProcessor::handle_event`] for each event, in the order
//! the transport raised them. Handler callbacks therefore run on this
//! thread, outside the state lock, and a `binary_start` announcement is
//! always fully processed before the first chunk of the same transfer.

use crate::core::codec::{self, MessageType};
use crate::core::reassembly::BinaryReassembler;
use crate::core::router::MessageRouter;
use crate::core::state::{ConnectionState, SessionState};
use crate::traits::TransportEvent;
use crossbeam_channel::Receiver;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Consumer-side state machine sequencing codec, reassembler and router
pub struct EventProcessor {
    state: Arc<SessionState>,
    router: Arc<MessageRouter>,
    reassembler: Arc<BinaryReassembler>,
}

impl EventProcessor {
    pub fn new(
        state: Arc<SessionState>,
        router: Arc<MessageRouter>,
        reassembler: Arc<BinaryReassembler>,
    ) -> Self {
        Self {
            state,
            router,
            reassembler,
        }
    }

    /// Drain the event channel until every sender is gone
    pub fn run(&self, events: Receiver<TransportEvent>) {
        for event in events.iter() {
            self.handle_event(event);
        }
        debug!("Event channel closed, consumer exiting");
    }

    /// Apply one transport event to the session
    pub fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                if self.state.try_complete_connect() {
                    info!("Connected to server");
                } else {
                    warn!(
                        "Ignoring open event in state {}",
                        self.state.get().label()
                    );
                }
            }

            TransportEvent::Message { payload, is_binary } => {
                if is_binary {
                    debug!("[RECV][BINARY] size={}", payload.len());
                    self.reassembler.ingest(&payload);
                } else {
                    self.handle_text(&payload);
                }
            }

            TransportEvent::Closed => {
                info!("Connection closed");
                self.reassembler.reset();
                self.state.transition(ConnectionState::Disconnected);
            }

            TransportEvent::Error(reason) => {
                if self.state.get() == ConnectionState::Closing {
                    // A late transport error during shutdown must not park
                    // the client in Error; the Closed event completes close
                    warn!("Transport error while closing: {}", reason);
                    return;
                }
                error!("Connection error: {}", reason);
                self.reassembler.reset();
                self.state.transition(ConnectionState::Error);
            }

            TransportEvent::Ping(payload) => self.router.route_ping(&payload),
            TransportEvent::Pong(payload) => self.router.route_pong(&payload),
        }
    }

    fn handle_text(&self, payload: &[u8]) {
        let text = String::from_utf8_lossy(payload);
        debug!("[RECV][TEXT] {}", text);

        let msg = codec::parse_message(&text);
        if msg.message_type == MessageType::BinaryStart {
            // The announcement must pass validation before the handler
            // hears about it; rejection already emitted a protocol error
            if self.reassembler.begin(&msg) {
                self.router.route_message(&msg);
            }
            return;
        }
        self.router.route_message(&msg);
    }
}
