//! Default transport implementation
//!
//! [`WsTransport`] implements the [`crate::traits::Transport`] contract on
//! top of tokio-tungstenite, running all socket I/O on one dedicated
//! thread. The session core never touches tungstenite types directly.

pub mod tungstenite;

pub use tungstenite::WsTransport;
