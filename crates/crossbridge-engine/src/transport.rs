//! Transport seam.
//!
//! Concrete adapters (iframe postMessage, desktop IPC, native webview
//! channels, extension runtime messaging) implement `Transport` for the
//! outbound direction and call `Bridge::receive` for the inbound one. The
//! engine never touches bytes or sockets itself.

use serde_json::Value;

use crossbridge_core::error::Result;
use crossbridge_core::protocol::Envelope;

/// Outbound payload, shaped by the `send_as_string` config flag.
#[derive(Debug, Clone)]
pub enum OutboundPayload {
    /// Envelope serialized to JSON text.
    Text(String),
    /// Structured envelope, for transports that carry objects natively.
    Structured(Envelope),
}

/// Inbound payload accepted by `Bridge::receive`.
#[derive(Debug, Clone)]
pub enum ReceivedPayload {
    Text(String),
    Json(Value),
}

impl From<String> for ReceivedPayload {
    fn from(s: String) -> Self {
        ReceivedPayload::Text(s)
    }
}

impl From<&str> for ReceivedPayload {
    fn from(s: &str) -> Self {
        ReceivedPayload::Text(s.to_owned())
    }
}

impl From<Value> for ReceivedPayload {
    fn from(v: Value) -> Self {
        ReceivedPayload::Json(v)
    }
}

/// Fire-and-forget delivery into the underlying channel.
///
/// A synchronous `Err` is the only feedback path; the engine uses it to
/// reject the pending call associated with the send, when one exists.
pub trait Transport: Send + Sync {
    fn send_payload(&self, payload: OutboundPayload) -> Result<()>;
}
