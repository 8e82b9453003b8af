//! Envelope shape and inbound validation rules.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, Result};

use super::wire_error::WireError;

/// Message direction discriminator.
///
/// Unknown tags deserialize to `Unknown` instead of failing the whole parse;
/// dispatch rejects them with a stable error so one bad message never looks
/// like malformed JSON to the transport adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MessageType {
    #[serde(rename = "REQUEST")]
    Request,
    #[serde(rename = "RESPONSE")]
    Response,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Tolerate any JSON value here; non-REQUEST/RESPONSE tags are routed
        // to the unsupported-type error at dispatch, not a parse failure.
        let v = Value::deserialize(deserializer)?;
        Ok(match v.as_str() {
            Some("REQUEST") => MessageType::Request,
            Some("RESPONSE") => MessageType::Response,
            _ => MessageType::Unknown,
        })
    }
}

/// Call identifier.
///
/// Locally allocated ids are numeric and never zero (a falsy id is
/// indistinguishable from "no id" in routing). Remotes may echo string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallId {
    Num(u64),
    Text(String),
}

impl CallId {
    pub fn as_num(&self) -> Option<u64> {
        match self {
            CallId::Num(n) => Some(*n),
            CallId::Text(_) => None,
        }
    }
}

impl From<u64> for CallId {
    fn from(n: u64) -> Self {
        CallId::Num(n)
    }
}

impl From<&str> for CallId {
    fn from(s: &str) -> Self {
        CallId::Text(s.to_owned())
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallId::Num(n) => write!(f, "{n}"),
            CallId::Text(s) => f.write_str(s),
        }
    }
}

/// Identifier of one remote instance when a host multiplexes several
/// injected contexts (for example one webview per tab).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Num(u64),
    Text(String),
}

/// The unit exchanged across the boundary.
///
/// Field names stay camelCase on the wire; both sides must agree on the
/// field set, there is no schema version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(rename = "type", default)]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CallId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<RemoteId>,
    #[serde(default)]
    pub internal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_origin: Option<String>,
}

impl Envelope {
    /// Overwrite `origin` and `internal` from transport sender metadata.
    ///
    /// Values supplied inside the serialized payload are discarded; only the
    /// transport knows who actually delivered the message.
    pub fn stamp_sender(&mut self, sender: &SenderMeta) {
        self.origin = sender.origin.clone();
        self.internal = sender.internal;
    }
}

/// Transport-supplied sender metadata, the only trusted source for the
/// envelope's `origin` and `internal` fields.
#[derive(Debug, Clone, Default)]
pub struct SenderMeta {
    pub origin: Option<String>,
    pub internal: bool,
}

impl SenderMeta {
    pub fn internal(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            internal: true,
        }
    }

    pub fn external(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            internal: false,
        }
    }
}

/// Validate an inbound envelope after sender stamping.
///
/// `is_injected` marks the injected (client) side, which knows its own
/// context and is permitted to receive messages without an origin.
pub fn validate_inbound(env: &Envelope, is_injected: bool) -> Result<()> {
    if !env.internal && env.origin.is_none() && !is_injected {
        tracing::warn!(kind = ?env.kind, "inbound message rejected, origin missing");
        return Err(BridgeError::Protocol(
            "receive message [origin] is required".into(),
        ));
    }
    if !env.internal && env.scope.is_none() {
        return Err(BridgeError::Protocol(
            "receive message [scope] is required for non-internal method call".into(),
        ));
    }
    Ok(())
}

/// Names used by the deprecated broadcast publish format.
const LEGACY_BROADCAST_NAMES: [&str; 3] =
    ["bridge-provider-eth", "bridge-provider-cfx", "publicConfig"];

/// True when a raw payload matches the deprecated extension broadcast shape.
///
/// Host-UI bridges silently drop these when they arrive over an internal
/// transport. The match set is a fixed compatibility list; do not extend it.
pub fn is_legacy_broadcast(raw: &Value) -> bool {
    raw.get("name")
        .and_then(Value::as_str)
        .map(|name| LEGACY_BROADCAST_NAMES.contains(&name))
        .unwrap_or(false)
}
