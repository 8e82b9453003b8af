//! Inbound-request handler seam.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use crossbridge_core::protocol::{Envelope, WireError};

use crate::bridge::Bridge;

/// An inbound REQUEST as handed to the registered handler.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// The validated envelope, with `origin`/`internal` already stamped
    /// from transport sender metadata.
    pub envelope: Envelope,
    /// Receipt timestamp, stamped by the engine before dispatch.
    pub received_at: Instant,
}

/// The single inbound REQUEST handler of a bridge instance.
///
/// One handler per instance, fixed at construction. Multiplexing by `scope`
/// is the handler's own responsibility (typically a map from scope name to
/// sub-handler). The returned value becomes the RESPONSE `data`; the error
/// becomes the RESPONSE `error`, already normalized for the wire.
#[async_trait]
pub trait ReceiveHandler: Send + Sync {
    async fn handle(
        &self,
        message: InboundRequest,
        bridge: Arc<Bridge>,
    ) -> std::result::Result<Value, WireError>;
}
