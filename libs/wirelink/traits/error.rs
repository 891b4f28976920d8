use thiserror::Error;

/// Main error type for wirelink
///
/// Protocol violations (malformed messages, bad binary announcements,
/// reassembly overflow) are intentionally absent here: they are surfaced to
/// the application through `SessionHandler::on_protocol_error` and never
/// returned as `Err` values.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Configuration rejected at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport collaborator failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Operation not permitted in the current connection state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Outbound binary payload exceeds the configured maximum
    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    /// Channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

/// Result type for wirelink operations
pub type Result<T> = std::result::Result<T, SessionError>;
