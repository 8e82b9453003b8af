//! Wire protocol for the cross-context channel.
//!
//! Two message kinds cross the boundary: REQUEST and RESPONSE, carried in a
//! single JSON envelope shape. The receiving side never trusts the payload's
//! own `origin`/`internal` fields; they are stamped from transport sender
//! metadata before validation, because the remote side may be untrusted page
//! code.

pub mod envelope;
pub mod wire_error;

pub use envelope::{
    is_legacy_broadcast, validate_inbound, CallId, Envelope, MessageType, RemoteId, SenderMeta,
};
pub use wire_error::{codes, ErrorCode, HardwarePayload, WireError};
