//! The message protocol engine.
//!
//! One `Bridge` is one side's endpoint of the cross-context channel. It owns
//! its own id allocator, pending-call registry, trace cache, and sweeper;
//! multiple bridges never cross-resolve each other's calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use serde_json::Value;
use tokio::task::JoinHandle;

use crossbridge_core::error::{BridgeError, Result};
use crossbridge_core::protocol::{
    is_legacy_broadcast, validate_inbound, CallId, Envelope, MessageType, RemoteId, SenderMeta,
    WireError,
};

use crate::calls::PendingCallRegistry;
use crate::config::BridgeConfig;
use crate::events::{BridgeEvent, EventHub};
use crate::handler::{InboundRequest, ReceiveHandler};
use crate::ids::CallIdAllocator;
use crate::sweep;
use crate::trace::TraceCache;
use crate::transport::{OutboundPayload, ReceivedPayload, Transport};

const WIRE_TARGET: &str = "crossbridge::wire";

/// Snapshot of the most recent validated inbound message's sender.
#[derive(Debug, Clone, Default)]
pub struct RemoteInfo {
    pub origin: Option<String>,
    pub remote_id: Option<RemoteId>,
}

/// Arguments for an outbound REQUEST.
#[derive(Debug, Clone)]
pub struct RequestArgs {
    pub scope: Option<String>,
    pub data: Value,
    pub remote_id: Option<RemoteId>,
}

/// Arguments for an outbound success RESPONSE.
#[derive(Debug, Clone)]
pub struct ResponseArgs {
    pub id: CallId,
    pub scope: Option<String>,
    pub remote_id: Option<RemoteId>,
    pub peer_origin: Option<String>,
    pub data: Value,
}

/// Arguments for an outbound error RESPONSE.
#[derive(Debug, Clone)]
pub struct ResponseErrorArgs {
    pub id: CallId,
    pub scope: Option<String>,
    pub remote_id: Option<RemoteId>,
    pub peer_origin: Option<String>,
    pub error: WireError,
}

/// One endpoint of the cross-context channel.
pub struct Bridge {
    config: BridgeConfig,
    ids: CallIdAllocator,
    calls: PendingCallRegistry,
    trace: TraceCache,
    events: Arc<EventHub>,
    transport: Arc<dyn Transport>,
    handler: Option<Arc<dyn ReceiveHandler>>,
    handler_enabled: AtomicBool,
    remote_info: Mutex<RemoteInfo>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    // self handle for spawning handler tasks that need the bridge back
    self_ref: Weak<Bridge>,
}

impl Bridge {
    /// Build a bridge over `transport`, optionally with an inbound-request
    /// handler. The expiry sweeper starts here when the configured timeout
    /// is nonzero and an async runtime is available.
    pub fn new(
        config: BridgeConfig,
        transport: Arc<dyn Transport>,
        handler: Option<Arc<dyn ReceiveHandler>>,
    ) -> Arc<Self> {
        let events = Arc::new(EventHub::new());
        let bridge = Arc::new_cyclic(|self_ref| Self {
            calls: PendingCallRegistry::new(Arc::clone(&events)),
            trace: TraceCache::new(config.trace),
            ids: CallIdAllocator::new(),
            events,
            transport,
            handler,
            handler_enabled: AtomicBool::new(true),
            remote_info: Mutex::new(RemoteInfo::default()),
            sweeper: Mutex::new(None),
            self_ref: self_ref.clone(),
            config,
        });
        let handle = sweep::spawn(&bridge);
        if let Ok(mut slot) = bridge.sweeper.lock() {
            *slot = handle;
        }
        bridge
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn remote_info(&self) -> RemoteInfo {
        self.remote_info
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Runtime switch gating inbound REQUEST dispatch, e.g. while the
    /// injected page is navigating.
    pub fn set_handler_enabled(&self, enabled: bool) {
        self.handler_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn handler_enabled(&self) -> bool {
        self.handler_enabled.load(Ordering::Relaxed)
    }

    /// Number of in-flight asynchronous calls.
    pub fn pending_calls(&self) -> usize {
        self.calls.len()
    }

    pub(crate) fn calls(&self) -> &PendingCallRegistry {
        &self.calls
    }

    // ------------------------------------------------------------------
    // outbound
    // ------------------------------------------------------------------

    /// Send an asynchronous REQUEST and wait for its correlated RESPONSE.
    ///
    /// Settles when the matching RESPONSE arrives, when the send itself
    /// fails, when the peer reports an error, or when the expiry sweep
    /// rejects the call.
    pub async fn request(&self, args: RequestArgs) -> Result<Value> {
        let id = CallId::from(self.ids.next());
        let rx = self.calls.register(id.clone())?;

        let env = Envelope {
            kind: MessageType::Request,
            id: Some(id),
            scope: args.scope,
            data: Some(args.data),
            origin: self.config.origin.clone(),
            remote_id: args.remote_id,
            ..Envelope::default()
        };
        self.send_with_recovery(env);

        match rx.await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(error)) => Err(BridgeError::Remote(error)),
            Err(_) => Err(BridgeError::Internal(
                "pending call dropped without settlement".into(),
            )),
        }
    }

    /// Fire-and-forget REQUEST: no id, no pending call, no response.
    /// Send-time errors surface on the event stream only.
    pub fn request_sync(&self, args: RequestArgs) {
        let env = Envelope {
            kind: MessageType::Request,
            scope: args.scope,
            data: Some(args.data),
            origin: self.config.origin.clone(),
            remote_id: args.remote_id,
            ..Envelope::default()
        };
        self.send_with_recovery(env);
    }

    /// Send a success RESPONSE correlated to a remote REQUEST.
    pub fn response(&self, args: ResponseArgs) {
        let env = Envelope {
            kind: MessageType::Response,
            id: Some(args.id),
            scope: args.scope,
            data: Some(args.data),
            origin: self.config.origin.clone(),
            remote_id: args.remote_id,
            peer_origin: args.peer_origin,
            ..Envelope::default()
        };
        self.send_with_recovery(env);
    }

    /// Send an error RESPONSE correlated to a remote REQUEST.
    pub fn response_error(&self, args: ResponseErrorArgs) {
        let env = Envelope {
            kind: MessageType::Response,
            id: Some(args.id),
            scope: args.scope,
            error: Some(args.error),
            origin: self.config.origin.clone(),
            remote_id: args.remote_id,
            peer_origin: args.peer_origin,
            ..Envelope::default()
        };
        self.send_with_recovery(env);
    }

    /// Serialize per config and hand the envelope to the transport. A
    /// synchronous transport failure rejects the pending call carrying the
    /// envelope's id, or becomes an error event when there is none.
    fn send_with_recovery(&self, env: Envelope) {
        let id = env.id.clone();
        if let Err(err) = self.dispatch_outbound(env) {
            match id {
                Some(id) => self.calls.reject(&id, err.to_wire()),
                None => self.events.emit_error(err.to_wire()),
            }
        }
    }

    fn dispatch_outbound(&self, env: Envelope) -> Result<()> {
        self.trace.record(&env);
        tracing::debug!(
            target: WIRE_TARGET,
            kind = ?env.kind,
            id = ?env.id,
            scope = ?env.scope,
            "send"
        );
        let payload = if self.config.send_as_string {
            let text = serde_json::to_string(&env)
                .map_err(|e| BridgeError::Internal(format!("serialize envelope failed: {e}")))?;
            OutboundPayload::Text(text)
        } else {
            OutboundPayload::Structured(env)
        };
        self.transport.send_payload(payload)
    }

    // ------------------------------------------------------------------
    // inbound
    // ------------------------------------------------------------------

    /// Single inbound entry point for transport adapters.
    ///
    /// `sender` is the transport's own knowledge of who delivered the
    /// payload; the payload's `origin`/`internal` claims are discarded.
    /// Errors returned here are fatal to this one delivery, never to the
    /// bridge instance.
    pub fn receive(&self, payload: ReceivedPayload, sender: &SenderMeta) -> Result<()> {
        let raw = match payload {
            ReceivedPayload::Json(value) => value,
            ReceivedPayload::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(e) => {
                    let err = BridgeError::Parse(format!("receive payload is not valid JSON: {e}"));
                    self.events.emit_error(err.to_wire());
                    return Err(err);
                }
            },
        };

        // Deprecated broadcast publish format, dropped for backwards
        // compatibility on host-UI bridges.
        if sender.internal && self.config.is_ext_ui && is_legacy_broadcast(&raw) {
            return Ok(());
        }

        let mut env: Envelope = serde_json::from_value(raw).map_err(|e| {
            BridgeError::Parse(format!("receive payload does not match envelope shape: {e}"))
        })?;
        env.stamp_sender(sender);
        validate_inbound(&env, self.config.is_injected)?;

        if let Ok(mut info) = self.remote_info.lock() {
            info.origin = env.origin.clone();
            info.remote_id = env.remote_id.clone();
        }

        if self.config.trace {
            if let Some(paired) = env.id.as_ref().and_then(|id| self.trace.lookup(id)) {
                tracing::debug!(
                    target: WIRE_TARGET,
                    id = ?env.id,
                    sent = ?paired.data,
                    "receive pairs with cached request"
                );
            }
        }
        tracing::debug!(
            target: WIRE_TARGET,
            kind = ?env.kind,
            id = ?env.id,
            origin = ?env.origin,
            internal = env.internal,
            "receive"
        );

        match env.kind {
            MessageType::Response => self.receive_response(env),
            MessageType::Request => {
                self.receive_request(env);
                Ok(())
            }
            MessageType::Unknown => Err(BridgeError::UnsupportedMessageType),
        }
    }

    fn receive_response(&self, env: Envelope) -> Result<()> {
        let Some(id) = env.id else {
            return Err(BridgeError::Protocol(
                "receive message [id] is required for RESPONSE".into(),
            ));
        };
        match env.error {
            Some(error) => self.calls.reject(&id, error),
            None => self.calls.resolve(&id, env.data.unwrap_or(Value::Null)),
        }
        Ok(())
    }

    /// Hand a REQUEST to the registered handler on its own task and route
    /// the outcome back as a RESPONSE. An error response is only sent when
    /// the inbound message carried an id; otherwise there is no one to
    /// respond to and the failure only surfaces locally.
    fn receive_request(&self, env: Envelope) {
        let Some(handler) = self.handler.clone() else {
            return;
        };
        if !self.handler_enabled.load(Ordering::Relaxed) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("inbound request dropped, no async runtime for handler dispatch");
            return;
        };
        let Some(bridge) = self.self_ref.upgrade() else {
            return;
        };
        let message = InboundRequest {
            envelope: env,
            received_at: Instant::now(),
        };
        runtime.spawn(async move {
            let id = message.envelope.id.clone();
            let kind = message.envelope.kind;
            let scope = message.envelope.scope.clone();
            let remote_id = message.envelope.remote_id.clone();
            let peer_origin = message.envelope.origin.clone();

            match handler.handle(message, Arc::clone(&bridge)).await {
                Ok(data) => {
                    if let Some(id) = id {
                        bridge.response(ResponseArgs {
                            id,
                            scope,
                            remote_id,
                            peer_origin,
                            data,
                        });
                    }
                }
                Err(error) => {
                    if let (Some(id), MessageType::Request) = (id, kind) {
                        bridge.response_error(ResponseErrorArgs {
                            id,
                            scope,
                            remote_id,
                            peer_origin,
                            error: error.clone(),
                        });
                    }
                    bridge.events.emit_error(error);
                }
            }
        });
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.lock().ok().and_then(|mut slot| slot.take()) {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("pending_calls", &self.calls.len())
            .field("handler_enabled", &self.handler_enabled())
            .finish_non_exhaustive()
    }
}
