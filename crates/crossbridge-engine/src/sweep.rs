//! Recurring expiry sweep for pending calls.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::bridge::Bridge;

/// Start the sweeper for a bridge. Self-rescheduling with a period equal to
/// the configured timeout; disabled entirely at timeout 0. The task holds
/// only a `Weak` so it winds down once the bridge is gone; the bridge also
/// aborts it on drop.
pub(crate) fn spawn(bridge: &Arc<Bridge>) -> Option<JoinHandle<()>> {
    let timeout_ms = bridge.config().timeout_ms;
    if timeout_ms == 0 {
        return None;
    }
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("pending-call expiry disabled, no async runtime at construction");
        return None;
    };

    let period = Duration::from_millis(timeout_ms);
    let weak: Weak<Bridge> = Arc::downgrade(bridge);
    Some(runtime.spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            let Some(bridge) = weak.upgrade() else {
                break;
            };
            bridge.calls().sweep_expired(period);
        }
    }))
}
