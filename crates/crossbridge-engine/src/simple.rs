//! In-process linked pair.
//!
//! Two bridges wired back to back: each side's transport delivers straight
//! into the peer's `receive`. No timers, no serialization boundary beyond
//! the JSON text pass, which makes it the reference harness for exercising
//! the full protocol in tests and embedders.

use std::sync::{Arc, Mutex, Weak};

use crossbridge_core::error::{BridgeError, Result};
use crossbridge_core::protocol::SenderMeta;

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::handler::ReceiveHandler;
use crate::transport::{OutboundPayload, ReceivedPayload, Transport};

/// Transport half of a linked pair. Holds the peer weakly so dropping one
/// side tears the link down instead of leaking both bridges.
pub struct PairTransport {
    remote: Mutex<Option<Weak<Bridge>>>,
}

impl PairTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            remote: Mutex::new(None),
        })
    }

    pub fn set_remote(&self, remote: &Arc<Bridge>) {
        if let Ok(mut slot) = self.remote.lock() {
            *slot = Some(Arc::downgrade(remote));
        }
    }
}

impl Transport for PairTransport {
    fn send_payload(&self, payload: OutboundPayload) -> Result<()> {
        let remote = self
            .remote
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .and_then(|weak| weak.upgrade())
            .ok_or_else(|| BridgeError::Transport("linked pair remote not set".into()))?;

        let received = match payload {
            OutboundPayload::Text(text) => ReceivedPayload::Text(text),
            OutboundPayload::Structured(env) => ReceivedPayload::Json(
                serde_json::to_value(env)
                    .map_err(|e| BridgeError::Transport(format!("envelope to value: {e}")))?,
            ),
        };
        // Delivered as an ordinary external message: the pair simulates the
        // real channel, including scope enforcement on the receiving side.
        remote.receive(received, &SenderMeta::default())
    }
}

fn pair_config() -> BridgeConfig {
    BridgeConfig {
        // settles in-process, never sweeps
        timeout_ms: 0,
        is_injected: true,
        ..BridgeConfig::default()
    }
}

/// Build two linked bridges. `handler_a` serves requests sent by side B and
/// vice versa.
pub fn linked_pair(
    handler_a: Option<Arc<dyn ReceiveHandler>>,
    handler_b: Option<Arc<dyn ReceiveHandler>>,
) -> (Arc<Bridge>, Arc<Bridge>) {
    let transport_a = PairTransport::new();
    let transport_b = PairTransport::new();

    let side_a = Bridge::new(
        pair_config(),
        Arc::clone(&transport_a) as Arc<dyn Transport>,
        handler_a,
    );
    let side_b = Bridge::new(
        pair_config(),
        Arc::clone(&transport_b) as Arc<dyn Transport>,
        handler_b,
    );

    transport_a.set_remote(&side_b);
    transport_b.set_remote(&side_a);
    (side_a, side_b)
}
