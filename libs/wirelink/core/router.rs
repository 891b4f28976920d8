//! Message routing to the application handler
//!
//! The router is a pure dispatcher: one swappable handler slot, a fixed
//! dispatch table for decoded control messages, and dedicated entry points
//! for binary chunk/completion events, ping/pong notifications and
//! directly-raised protocol errors. With no handler registered every
//! dispatch is a logged no-op; a caller may legitimately run headless
//! during setup.

use crate::core::codec::{Message, MessageType};
use crate::traits::SessionHandler;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Dispatches typed messages and binary events to the registered handler
///
/// Handler attachment is an atomic swap under an `RwLock`, so it is safe to
/// register or replace the handler while traffic is flowing; in-flight
/// dispatches finish against the handler they started with.
pub struct MessageRouter {
    handler: RwLock<Option<Arc<dyn SessionHandler>>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self {
            handler: RwLock::new(None),
        }
    }

    /// Atomically replace the handler; `None` detaches
    pub fn set_handler(&self, handler: Option<Arc<dyn SessionHandler>>) {
        *self.handler.write() = handler;
    }

    fn handler(&self) -> Option<Arc<dyn SessionHandler>> {
        self.handler.read().clone()
    }

    /// Dispatch a decoded control message
    ///
    /// Hello/Acknowledge go to the text slot, BinaryStart to its own slot,
    /// Error carries its content to the protocol-error slot, and anything
    /// malformed (Unknown, or BinaryData arriving as text) is reported as a
    /// protocol error naming the offending type and message id.
    pub fn route_message(&self, msg: &Message) {
        let Some(handler) = self.handler() else {
            warn!("No handler set for message routing");
            return;
        };

        match msg.message_type {
            MessageType::Hello | MessageType::Acknowledge => handler.on_text_message(msg),
            MessageType::BinaryStart => handler.on_binary_start(msg),
            MessageType::Error => handler.on_protocol_error(&msg.content),
            MessageType::Unknown | MessageType::BinaryData => {
                let reason = format!(
                    "unroutable message type {} (msg_id {:?})",
                    msg.message_type.label(),
                    msg.msg_id
                );
                warn!("{}", reason);
                handler.on_protocol_error(&reason);
            }
        }
    }

    /// Forward one raw binary chunk
    pub fn route_binary_chunk(&self, data: &[u8]) {
        if let Some(handler) = self.handler() {
            handler.on_binary_chunk(data);
        } else {
            debug!("Binary chunk dropped: no handler set");
        }
    }

    /// Signal completion of a binary transfer
    pub fn route_binary_complete(&self) {
        if let Some(handler) = self.handler() {
            handler.on_binary_complete();
        } else {
            debug!("Binary completion dropped: no handler set");
        }
    }

    /// Report a protocol violation raised outside the message path
    /// (e.g. by the reassembler)
    pub fn route_protocol_error(&self, reason: &str) {
        if let Some(handler) = self.handler() {
            handler.on_protocol_error(reason);
        } else {
            warn!("Protocol error with no handler set: {}", reason);
        }
    }

    /// Deliver a transport ping notification
    pub fn route_ping(&self, payload: &[u8]) {
        if let Some(handler) = self.handler() {
            handler.on_ping(payload);
        }
    }

    /// Deliver a transport pong notification
    pub fn route_pong(&self, payload: &[u8]) {
        if let Some(handler) = self.handler() {
            handler.on_pong(payload);
        }
    }
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new()
    }
}
