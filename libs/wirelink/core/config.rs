//! Session configuration

use crate::traits::{Result, SessionError};
use std::time::Duration;

/// Hard ceiling for the announced-size limit: 1 GiB
pub const MAX_BINARY_PAYLOAD_CEILING: u64 = 1024 * 1024 * 1024;

/// Configuration for a [`crate::client::SessionClient`]
///
/// Immutable after construction; validated exactly once when the client is
/// built. An out-of-bounds configuration prevents the client from opening.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bound for `wait_for_connection` in the demo flow and for callers that
    /// want a single knob
    pub connection_timeout: Duration,
    /// Reserved: bound for request/response style waits (not yet consumed)
    pub message_timeout: Duration,
    /// Largest announced binary transfer accepted, and largest outbound
    /// binary payload sent (bytes, 1..=1 GiB)
    pub max_binary_payload: u64,
    /// Request per-message compression from the transport
    pub compression_enabled: bool,
    /// Informational protocol version string
    pub protocol_version: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            message_timeout: Duration::from_secs(5),
            max_binary_payload: 100 * 1024 * 1024,
            compression_enabled: false,
            protocol_version: "1.0".to_string(),
        }
    }
}

impl SessionConfig {
    /// Validate bounds; called once at client construction
    pub fn validate(&self) -> Result<()> {
        if self.max_binary_payload == 0 {
            return Err(SessionError::Configuration(
                "max_binary_payload must be greater than zero".into(),
            ));
        }
        if self.max_binary_payload > MAX_BINARY_PAYLOAD_CEILING {
            return Err(SessionError::Configuration(format!(
                "max_binary_payload {} exceeds ceiling of {} bytes",
                self.max_binary_payload, MAX_BINARY_PAYLOAD_CEILING
            )));
        }
        Ok(())
    }
}
