//! # WireLink
//!
//! A client-side WebSocket session layer: connection lifecycle with blocking
//! waits and graceful shutdown, a flat text control-message codec, and
//! reassembly of large binary payloads announced in advance by a control
//! message.
//!
//! ## Architecture
//!
//! - **Transport collaborator**: the frame-level WebSocket (handshake,
//!   masking, fragmentation, TLS) lives behind the [`Transport`] trait and
//!   pushes [`TransportEvent`]s into a bounded channel
//! - **Single consumer**: one thread drains that channel and drives the
//!   state machine, codec, reassembler and router in event order
//! - **Two locks**: connection state and binary transfer state are guarded
//!   independently so data-path work never blocks state reads
//! - **Closed handler set**: applications implement [`SessionHandler`], a
//!   fixed set of callback slots attached via atomic swap

pub mod traits;
pub mod core;
pub mod transport;

// Re-export all traits
pub use traits::*;

// Re-export core session functionality
pub use core::{
    client, codec, config, reassembly, router, session, state,
    client::SessionClient,
    codec::{parse_message, serialize_message, Message, MessageType},
    config::SessionConfig,
    reassembly::{BinaryReassembler, TransferState},
    router::MessageRouter,
    state::{ConnectionState, SessionState},
};

// Re-export the default transport
pub use transport::WsTransport;

/// Type alias for Result with SessionError
pub type Result<T> = std::result::Result<T, traits::SessionError>;
