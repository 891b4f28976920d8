use crate::core::codec::Message;

/// Application-facing callback capability set
///
/// The session routes every decoded control message and binary event to
/// exactly one of these slots. The set is closed: the protocol's message
/// types are fixed and small, so there is no open-ended dispatch beyond
/// this trait.
///
/// All callbacks run on the session's single consumer thread, never
/// concurrently with each other, and never while the session holds its
/// state lock, so a handler may safely call back into the client (e.g. to
/// send an acknowledge).
///
/// # Example
///
/// ```ignore
/// struct AppHandler;
///
/// impl SessionHandler for AppHandler {
///     fn on_text_message(&self, msg: &Message) {
///         println!("{} from {}", msg.content, msg.msg_id);
///     }
///     fn on_binary_start(&self, msg: &Message) {
///         println!("expecting {} bytes", msg.binary_size);
///     }
///     fn on_binary_chunk(&self, data: &[u8]) { /* append */ }
///     fn on_binary_complete(&self) { /* finalize */ }
///     fn on_protocol_error(&self, reason: &str) {
///         eprintln!("protocol error: {reason}");
///     }
/// }
/// ```
pub trait SessionHandler: Send + Sync + 'static {
    /// A Hello or Acknowledge control message arrived
    fn on_text_message(&self, msg: &Message);

    /// A binary transfer was announced; `msg.binary_size` holds the total
    /// byte count to expect
    fn on_binary_start(&self, msg: &Message);

    /// One raw chunk of an in-flight (or unannounced) binary transfer
    ///
    /// May fire many times per transfer; chunk boundaries are whatever the
    /// transport delivered.
    fn on_binary_chunk(&self, data: &[u8]);

    /// The announced byte count has been fully received
    ///
    /// Fires exactly once per completed transfer.
    fn on_binary_complete(&self);

    /// A protocol violation: an Error control message, an unknown message
    /// type, a bad binary announcement, or a reassembly overflow
    ///
    /// The connection stays up; reacting (reconnect, abort, ignore) is the
    /// application's call.
    fn on_protocol_error(&self, reason: &str);

    /// Transport-level ping received (frame payload attached)
    fn on_ping(&self, _payload: &[u8]) {}

    /// Transport-level pong received (frame payload attached)
    fn on_pong(&self, _payload: &[u8]) {}
}
