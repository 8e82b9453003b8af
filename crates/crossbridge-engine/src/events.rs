//! Bridge-level event stream.
//!
//! Error pathways that must not interrupt message processing (remote-reported
//! errors, handler failures, send failures without a pending call) are
//! published here for passive observers. Subscribing is optional; without a
//! subscriber the event is only logged.

use tokio::sync::broadcast;

use crossbridge_core::protocol::WireError;

const EVENT_CAPACITY: usize = 128;

/// Events observable on a bridge instance.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// A recoverable error surfaced somewhere in the message pipeline.
    Error(WireError),
}

/// Broadcast hub owned by one bridge instance.
#[derive(Debug)]
pub struct EventHub {
    tx: broadcast::Sender<BridgeEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }

    /// Publish an error event. Lagging or absent subscribers are fine;
    /// the structured log line is the observer of last resort.
    pub fn emit_error(&self, error: WireError) {
        tracing::warn!(
            code = ?error.code_i64(),
            message = error.message.as_deref().unwrap_or(""),
            "bridge error"
        );
        let _ = self.tx.send(BridgeEvent::Error(error));
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_subscriber_is_silent() {
        let hub = EventHub::new();
        hub.emit_error(WireError::new(-32603, "nobody listening"));
    }

    #[tokio::test]
    async fn subscriber_receives_emitted_error() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();
        hub.emit_error(WireError::new(4001, "user rejected"));
        let BridgeEvent::Error(err) = rx.recv().await.unwrap();
        assert_eq!(err.code_i64(), Some(4001));
    }
}
