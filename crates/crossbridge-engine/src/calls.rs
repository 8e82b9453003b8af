//! Pending-call registry.
//!
//! The registry is the sole writer of call state: a pending call is settled
//! at most once, by removing the entry before invoking its settlement
//! channel. Late or duplicate deliveries find no entry and are silent
//! no-ops, which deliberately tolerates responses arriving after a timeout
//! sweep already rejected the call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;

use crossbridge_core::error::{BridgeError, Result};
use crossbridge_core::protocol::{CallId, WireError};

use crate::events::EventHub;

/// How one pending call settles: the remote's data or its normalized error.
pub type Settlement = std::result::Result<Value, WireError>;

struct PendingCall {
    settle: oneshot::Sender<Settlement>,
    created_at: Instant,
}

/// In-flight asynchronous calls of one bridge instance, keyed by call id.
pub struct PendingCallRegistry {
    calls: DashMap<CallId, PendingCall>,
    events: Arc<EventHub>,
}

impl PendingCallRegistry {
    pub fn new(events: Arc<EventHub>) -> Self {
        Self {
            calls: DashMap::new(),
            events,
        }
    }

    /// Track a freshly sent call and hand back its settlement receiver.
    ///
    /// A duplicate id signals a severe allocator or protocol bug and is
    /// rejected outright rather than silently replacing the older call.
    pub fn register(&self, id: CallId) -> Result<oneshot::Receiver<Settlement>> {
        match self.calls.entry(id) {
            Entry::Occupied(occupied) => {
                Err(BridgeError::DuplicateCallId(occupied.key().to_string()))
            }
            Entry::Vacant(vacant) => {
                let (tx, rx) = oneshot::channel();
                vacant.insert(PendingCall {
                    settle: tx,
                    created_at: Instant::now(),
                });
                Ok(rx)
            }
        }
    }

    /// Settle a call with the remote's data. No-op for unknown ids.
    pub fn resolve(&self, id: &CallId, data: Value) {
        match self.calls.remove(id) {
            Some((_, call)) => {
                let _ = call.settle.send(Ok(data));
            }
            None => tracing::debug!(%id, "response for unknown call id ignored"),
        }
    }

    /// Settle a call with an error and surface it on the event stream.
    /// No-op for unknown ids.
    pub fn reject(&self, id: &CallId, error: WireError) {
        match self.calls.remove(id) {
            Some((_, call)) => {
                self.events.emit_error(error.clone());
                let _ = call.settle.send(Err(error));
            }
            None => tracing::debug!(%id, "rejection for unknown call id ignored"),
        }
    }

    /// Reject every call older than `timeout` with the standard timeout
    /// error. Called only by the sweeper task.
    pub fn sweep_expired(&self, timeout: Duration) {
        let now = Instant::now();
        let expired: Vec<CallId> = self
            .calls
            .iter()
            .filter(|entry| now.duration_since(entry.value().created_at) > timeout)
            .map(|entry| entry.key().clone())
            .collect();
        if expired.is_empty() {
            return;
        }
        tracing::debug!(count = expired.len(), "sweeping expired pending calls");
        for id in expired {
            self.reject(&id, WireError::request_timeout());
        }
    }

    /// Unconditional removal without settlement.
    pub fn clear(&self, id: &CallId) {
        self.calls.remove(id);
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
