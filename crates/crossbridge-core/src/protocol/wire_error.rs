//! Normalized error record crossing the serialization boundary.
//!
//! Thrown values cannot cross the channel as-is, so errors are flattened
//! into this JSON-safe record on send and used directly as a Rust error on
//! receive. Object identity and backtraces do not survive the hop; the
//! structural fields (code, message, data, localization key) do.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable codes shared with remote peers.
///
/// JSON-RPC range plus the provider range. Callers branch on these, never
/// on message text.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL: i64 = -32603;

    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const REQUEST_TIMEOUT: i64 = 4500;
    pub const DISCONNECTED: i64 = 4900;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
}

/// Machine-readable code, numeric in the standard ranges but tolerated as a
/// string when a remote sends one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Num(i64),
    Text(String),
}

/// Hardware-specific nested payload (device reconnect flows).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwarePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// The flattened error record.
///
/// Every field is optional; normalization must never fail, whatever shape
/// the original error had.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    // localization key and params
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_toast: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<HardwarePayload>,
}

impl WireError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(ErrorCode::Num(code)),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Standard rejection for a pending call that outlived the timeout.
    pub fn request_timeout() -> Self {
        let mut err = Self::new(codes::REQUEST_TIMEOUT, "request timed out");
        err.name = Some("RequestTimeout".into());
        err
    }

    /// Numeric code when present, whether sent as a number or a numeric
    /// string.
    pub fn code_i64(&self) -> Option<i64> {
        match &self.code {
            Some(ErrorCode::Num(n)) => Some(*n),
            Some(ErrorCode::Text(s)) => s.parse().ok(),
            None => None,
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(ErrorCode::Num(code)), Some(msg)) => write!(f, "{msg} (code={code})"),
            (Some(ErrorCode::Text(code)), Some(msg)) => write!(f, "{msg} (code={code})"),
            (_, Some(msg)) => f.write_str(msg),
            (Some(ErrorCode::Num(code)), None) => write!(f, "remote error (code={code})"),
            (Some(ErrorCode::Text(code)), None) => write!(f, "remote error (code={code})"),
            _ => f.write_str("remote error"),
        }
    }
}

impl std::error::Error for WireError {}
