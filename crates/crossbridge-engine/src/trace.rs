//! Diagnostic cache of recently sent REQUEST envelopes.
//!
//! Purely for trace output: an inbound RESPONSE can be paired with the
//! request that caused it. Bounded by a crude wholesale clear whenever the
//! id counter crosses a multiple-of-100 boundary, not an LRU.

use dashmap::DashMap;

use crossbridge_core::protocol::{CallId, Envelope, MessageType};

pub struct TraceCache {
    enabled: bool,
    cache: DashMap<CallId, Envelope>,
}

impl TraceCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            cache: DashMap::new(),
        }
    }

    /// Remember an outbound envelope if it is an id-bearing REQUEST.
    pub fn record(&self, env: &Envelope) {
        if !self.enabled || env.kind != MessageType::Request {
            return;
        }
        let Some(id) = env.id.clone() else {
            return;
        };
        let rollover = id.as_num().map(|n| n % 100 == 0).unwrap_or(false);
        self.cache.insert(id, env.clone());
        if rollover {
            self.cache.clear();
        }
    }

    /// Cached request for an inbound response id. Absence is not an error.
    pub fn lookup(&self, id: &CallId) -> Option<Envelope> {
        if !self.enabled {
            return None;
        }
        self.cache.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
