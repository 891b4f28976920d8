//! Binary payload reassembly
//!
//! A binary transfer is announced by a `binary_start` control message
//! carrying the total size, then arrives as one or more raw binary frames.
//! The reassembler correlates the announced size with the accumulated chunk
//! lengths to detect completion. Transfer state lives under its own lock,
//! separate from the connection state, so data-path accounting never blocks
//! state reads.

use crate::core::codec::Message;
use crate::core::router::MessageRouter;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Accounting for one in-flight binary transfer
///
/// `expected_size == 0` means no transfer is active. While a transfer is
/// active and non-overflowing, `received_bytes <= expected_size` holds up to
/// the completion instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferState {
    pub expected_size: u64,
    pub received_bytes: u64,
}

/// Accumulates binary chunks against an announced size
///
/// Invoked only from the session's consumer thread while it processes a
/// binary frame or a decoded BinaryStart message; the lock exists so state
/// reads (tests, diagnostics) from other threads stay safe.
pub struct BinaryReassembler {
    state: Mutex<TransferState>,
    router: Arc<MessageRouter>,
    max_payload: u64,
}

impl BinaryReassembler {
    pub fn new(router: Arc<MessageRouter>, max_payload: u64) -> Self {
        Self {
            state: Mutex::new(TransferState::default()),
            router,
            max_payload,
        }
    }

    /// Process a BinaryStart announcement
    ///
    /// Validates the announced size against zero and the configured maximum.
    /// Rejection emits exactly one protocol error and leaves transfer state
    /// untouched. Returns whether the announcement was accepted; the caller
    /// routes `on_binary_start` only on acceptance.
    pub fn begin(&self, msg: &Message) -> bool {
        if msg.binary_size == 0 {
            self.router.route_protocol_error(&format!(
                "binary_start with zero size (msg_id {:?})",
                msg.msg_id
            ));
            return false;
        }
        if msg.binary_size > self.max_payload {
            self.router.route_protocol_error(&format!(
                "binary_start announces {} bytes, exceeds limit of {} (msg_id {:?})",
                msg.binary_size, self.max_payload, msg.msg_id
            ));
            return false;
        }

        let mut state = self.state.lock();
        if state.expected_size > 0 {
            debug!(
                "New binary_start replaces in-flight transfer ({}/{} received)",
                state.received_bytes, state.expected_size
            );
        }
        *state = TransferState {
            expected_size: msg.binary_size,
            received_bytes: 0,
        };
        true
    }

    /// Process one binary chunk
    ///
    /// The chunk is always forwarded to the handler, even without an active
    /// transfer. Accumulation uses checked addition: an overflow aborts the
    /// transfer with a protocol error instead of wrapping. Completion fires
    /// exactly once, the instant the announced size is reached, after which
    /// state resets to `{0,0}`.
    pub fn ingest(&self, chunk: &[u8]) {
        let complete = {
            let mut state = self.state.lock();

            if state.expected_size == 0 {
                debug!("Binary chunk of {} bytes with no active transfer", chunk.len());
            } else {
                match state.received_bytes.checked_add(chunk.len() as u64) {
                    Some(total) => state.received_bytes = total,
                    None => {
                        warn!("Binary transfer byte counter overflow, aborting transfer");
                        *state = TransferState::default();
                        drop(state);
                        self.router.route_binary_chunk(chunk);
                        self.router
                            .route_protocol_error("binary transfer aborted: byte count overflow");
                        return;
                    }
                }
            }

            let complete = state.expected_size > 0 && state.received_bytes >= state.expected_size;
            if complete {
                *state = TransferState::default();
            }
            complete
        };

        // Handler callbacks run outside the transfer lock
        self.router.route_binary_chunk(chunk);
        if complete {
            self.router.route_binary_complete();
        }
    }

    /// Drop any in-flight transfer (disconnect, transport error)
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if state.expected_size > 0 {
            debug!(
                "Resetting binary transfer ({}/{} received)",
                state.received_bytes, state.expected_size
            );
        }
        *state = TransferState::default();
    }

    /// Current transfer accounting (diagnostics and tests)
    pub fn snapshot(&self) -> TransferState {
        *self.state.lock()
    }

    /// Place the byte counter near its limit; real traffic cannot reach
    /// the overflow branch within a test's lifetime
    #[cfg(test)]
    fn seed_received_bytes(&self, bytes: u64) {
        self.state.lock().received_bytes = bytes;
    }
}
