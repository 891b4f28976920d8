//! # WireLink Traits
//!
//! Core traits and types for the WireLink session layer:
//!
//! - **Transport**: the external frame-transport collaborator contract
//! - **SessionHandler**: the application-facing callback capability set
//! - **SessionError**: the error taxonomy shared across the crate

pub mod error;
pub mod handler;
pub mod transport;

// Re-export commonly used types
pub use error::{Result, SessionError};
pub use handler::SessionHandler;
pub use transport::{Transport, TransportEvent, MAX_PING_PAYLOAD};
