//! Wire codec for control messages
//!
//! Control messages travel as text frames shaped like a flat JSON object:
//! `{"type":"hello","msg_id":"1","content":"hi","size":42}`. The codec is
//! deliberately a flat key scanner, not a JSON parser: no nested structures,
//! no escaped quotes, no non-ASCII escaping. Content containing the quote or
//! delimiter characters is out of contract, a known limitation of the wire
//! format that is kept rather than fixed.
//!
//! Decode failures degrade instead of erroring: an unrecognized `type`
//! yields [`MessageType::Unknown`] (the router reports it), a non-numeric
//! `size` yields 0 with a warning.

use tracing::warn;

/// Control message types recognized on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Initial handshake
    Hello,
    /// Announces incoming binary data with its total size
    BinaryStart,
    /// Raw binary payload marker (never expected as a text frame)
    BinaryData,
    /// Acknowledge for received messages
    Acknowledge,
    /// Error response
    Error,
    /// Unrecognized or missing type token
    Unknown,
}

impl MessageType {
    /// Wire token for this type (`serialize_message` inverse of parsing)
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            MessageType::Hello => "hello",
            MessageType::BinaryStart => "binary_start",
            MessageType::BinaryData => "binary_data",
            MessageType::Acknowledge => "ack",
            MessageType::Error => "error",
            MessageType::Unknown => "unknown",
        }
    }

    /// Human-readable label for logging and diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            MessageType::Hello => "Hello",
            MessageType::BinaryStart => "BinaryStart",
            MessageType::BinaryData => "BinaryData",
            MessageType::Acknowledge => "Acknowledge",
            MessageType::Error => "Error",
            MessageType::Unknown => "Unknown",
        }
    }

    fn from_wire_str(token: &str) -> Self {
        match token {
            "hello" => MessageType::Hello,
            "binary_start" => MessageType::BinaryStart,
            "binary_data" => MessageType::BinaryData,
            "ack" => MessageType::Acknowledge,
            "error" => MessageType::Error,
            _ => MessageType::Unknown,
        }
    }
}

/// A typed control message
///
/// Immutable value type: produced by [`parse_message`] from inbound text, or
/// constructed by the application for outbound text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_type: MessageType,
    pub msg_id: String,
    pub content: String,
    /// Total byte count for BinaryStart announcements; 0 otherwise
    pub binary_size: u64,
}

impl Message {
    pub fn new(message_type: MessageType, msg_id: impl Into<String>) -> Self {
        Self {
            message_type,
            msg_id: msg_id.into(),
            content: String::new(),
            binary_size: 0,
        }
    }

    pub fn with_content(
        message_type: MessageType,
        msg_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_type,
            msg_id: msg_id.into(),
            content: content.into(),
            binary_size: 0,
        }
    }

    /// Build a BinaryStart announcement for `size` bytes
    pub fn binary_start(msg_id: impl Into<String>, size: u64) -> Self {
        Self {
            message_type: MessageType::BinaryStart,
            msg_id: msg_id.into(),
            content: String::new(),
            binary_size: size,
        }
    }

    /// A message is valid iff its type is recognized and it carries an id
    pub fn is_valid(&self) -> bool {
        self.message_type != MessageType::Unknown && !self.msg_id.is_empty()
    }
}

/// Extract the raw value for `key` from a flat wire object
///
/// Finds `"key":`, skips whitespace, then returns either the quoted
/// substring (string values) or the run up to the next `,`/`}` (numeric
/// values). Returns `None` when the key is absent or malformed.
fn scan_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("\"{}\":", key);
    let start = text.find(&pattern)? + pattern.len();
    let rest = &text[start..];
    let rest = rest.trim_start_matches([' ', '\t']);

    if let Some(inner) = rest.strip_prefix('"') {
        let end = inner.find('"')?;
        Some(&inner[..end])
    } else {
        let end = rest.find([',', '}']).unwrap_or(rest.len());
        Some(rest[..end].trim_end())
    }
}

/// Parse wire text into a typed [`Message`]
///
/// Never fails: unrecognized pieces degrade to `Unknown` / empty / 0 with a
/// warning, and the result is still returned so the router can report it.
pub fn parse_message(text: &str) -> Message {
    let type_token = scan_value(text, "type").unwrap_or("");
    let message_type = MessageType::from_wire_str(type_token);
    if message_type == MessageType::Unknown {
        warn!("Unknown message type: {:?}", type_token);
    }

    let msg_id = scan_value(text, "msg_id").unwrap_or("").to_string();
    let content = scan_value(text, "content").unwrap_or("").to_string();

    let binary_size = match scan_value(text, "size") {
        None | Some("") => 0,
        Some(raw) => raw.parse::<u64>().unwrap_or_else(|e| {
            warn!("Failed to parse binary size {:?}: {}", raw, e);
            0
        }),
    };

    Message {
        message_type,
        msg_id,
        content,
        binary_size,
    }
}

/// Serialize a [`Message`] to wire text
///
/// Field order is fixed (type, msg_id, content, size) for determinism.
/// `content` is emitted only when non-empty and `size` only when > 0, so a
/// round-trip reproduces type, id and content exactly, and `binary_size`
/// whenever it was positive.
pub fn serialize_message(msg: &Message) -> String {
    let mut out = format!(
        "{{\"type\":\"{}\",\"msg_id\":\"{}\"",
        msg.message_type.as_wire_str(),
        msg.msg_id
    );

    if !msg.content.is_empty() {
        out.push_str(",\"content\":\"");
        out.push_str(&msg.content);
        out.push('"');
    }

    if msg.binary_size > 0 {
        out.push_str(",\"size\":");
        out.push_str(&msg.binary_size.to_string());
    }

    out.push('}');
    out
}
