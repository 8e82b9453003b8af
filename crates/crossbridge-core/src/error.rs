//! Shared error type across crossbridge crates.

use thiserror::Error;

use crate::protocol::wire_error::{codes, WireError};

/// Stable client-facing error codes.
///
/// Callers branch on these across the boundary, so the numeric values follow
/// the JSON-RPC range (`-327xx`) and the provider range (`4xxx`) that remote
/// peers already understand. Never renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed JSON or envelope shape.
    ParseError,
    /// Envelope violates a protocol rule (missing origin/scope/id).
    InvalidRequest,
    /// No handler knows the requested method.
    MethodNotFound,
    /// Pending call expired before a response arrived.
    RequestTimeout,
    /// Caller lacks authorization for the call.
    Unauthorized,
    /// Internal bridge failure.
    Internal,
}

impl ClientCode {
    /// Numeric representation carried in wire error records.
    pub fn as_i64(self) -> i64 {
        match self {
            ClientCode::ParseError => codes::PARSE_ERROR,
            ClientCode::InvalidRequest => codes::INVALID_REQUEST,
            ClientCode::MethodNotFound => codes::METHOD_NOT_FOUND,
            ClientCode::RequestTimeout => codes::REQUEST_TIMEOUT,
            ClientCode::Unauthorized => codes::UNAUTHORIZED,
            ClientCode::Internal => codes::INTERNAL,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by the core and the engine.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("parse failed: {0}")]
    Parse(String),
    #[error("protocol violation: {0}")]
    Protocol(String),
    #[error("unsupported message type")]
    UnsupportedMessageType,
    #[error("pending call already registered, id={0}")]
    DuplicateCallId(String),
    #[error("request timed out")]
    Timeout,
    #[error("transport send failed: {0}")]
    Transport(String),
    #[error("receive handler failed: {0}")]
    Handler(String),
    #[error("remote error: {0}")]
    Remote(WireError),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            BridgeError::Parse(_) => ClientCode::ParseError,
            BridgeError::Protocol(_) => ClientCode::InvalidRequest,
            BridgeError::UnsupportedMessageType => ClientCode::InvalidRequest,
            BridgeError::DuplicateCallId(_) => ClientCode::Internal,
            BridgeError::Timeout => ClientCode::RequestTimeout,
            BridgeError::Transport(_) => ClientCode::Internal,
            BridgeError::Handler(_) => ClientCode::Internal,
            BridgeError::Remote(remote) => remote
                .code_i64()
                .and_then(client_code_from_i64)
                .unwrap_or(ClientCode::Internal),
            BridgeError::Config(_) => ClientCode::Internal,
            BridgeError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Lower into the record that crosses the serialization boundary.
    ///
    /// A `Remote` error round-trips its original record unchanged so the code
    /// and structured data survive another hop.
    pub fn to_wire(&self) -> WireError {
        match self {
            BridgeError::Remote(remote) => remote.clone(),
            other => {
                let mut wire =
                    WireError::new(other.client_code().as_i64(), other.to_string());
                wire.name = Some("BridgeError".into());
                wire
            }
        }
    }
}

fn client_code_from_i64(code: i64) -> Option<ClientCode> {
    match code {
        codes::PARSE_ERROR => Some(ClientCode::ParseError),
        codes::INVALID_REQUEST => Some(ClientCode::InvalidRequest),
        codes::METHOD_NOT_FOUND => Some(ClientCode::MethodNotFound),
        codes::REQUEST_TIMEOUT => Some(ClientCode::RequestTimeout),
        codes::UNAUTHORIZED => Some(ClientCode::Unauthorized),
        codes::INTERNAL => Some(ClientCode::Internal),
        _ => None,
    }
}
