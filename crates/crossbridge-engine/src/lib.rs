//! crossbridge engine: the bridge runtime.
//!
//! This crate wires the wire contracts from `crossbridge-core` into a live
//! bridge instance: call-id allocation, pending-call correlation, timeout
//! sweeping, trace caching, the error event stream, and the transport and
//! handler seams. It is intended to be consumed by concrete transport
//! adapters (iframe, IPC, webview, extension runtime) and by integration
//! tests through the in-process linked pair.

pub mod bridge;
pub mod calls;
pub mod config;
pub mod events;
pub mod handler;
pub mod ids;
pub mod simple;
pub mod trace;
pub mod transport;

mod sweep;

pub use bridge::{Bridge, RemoteInfo, RequestArgs, ResponseArgs, ResponseErrorArgs};
pub use config::BridgeConfig;
pub use events::{BridgeEvent, EventHub};
pub use handler::{InboundRequest, ReceiveHandler};
pub use simple::{linked_pair, PairTransport};
pub use transport::{OutboundPayload, ReceivedPayload, Transport};
