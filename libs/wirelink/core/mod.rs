//! Core session components: codec, reassembly, routing, state machine and
//! the client facade

pub mod client;
pub mod codec;
pub mod config;
pub mod reassembly;
pub mod router;
pub mod session;
pub mod state;

// Re-export main types
pub use client::SessionClient;
pub use codec::{parse_message, serialize_message, Message, MessageType};
pub use config::{SessionConfig, MAX_BINARY_PAYLOAD_CEILING};
pub use reassembly::{BinaryReassembler, TransferState};
pub use router::MessageRouter;
pub use session::EventProcessor;
pub use state::{ConnectionState, SessionState};
