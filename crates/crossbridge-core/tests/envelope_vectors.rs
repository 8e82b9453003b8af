//! Envelope wire-format vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use crossbridge_core::protocol::{CallId, Envelope, MessageType, RemoteId};
use serde_json::json;

#[test]
fn parse_request_min() {
    let s = r#"{ "type": "REQUEST", "scope": "eth", "data": { "method": "eth_chainId" } }"#;
    let env: Envelope = serde_json::from_str(s).unwrap();
    assert_eq!(env.kind, MessageType::Request);
    assert_eq!(env.scope.as_deref(), Some("eth"));
    assert!(env.id.is_none());
    assert!(!env.internal);
}

#[test]
fn parse_request_full() {
    let s = r#"{
        "type": "REQUEST",
        "id": 2,
        "scope": "eth",
        "data": { "method": "eth_chainId" },
        "origin": "https://dapp.example",
        "remoteId": "webview-3",
        "peerOrigin": "https://host.example"
    }"#;
    let env: Envelope = serde_json::from_str(s).unwrap();
    assert_eq!(env.id, Some(CallId::Num(2)));
    assert_eq!(env.remote_id, Some(RemoteId::Text("webview-3".into())));
    assert_eq!(env.peer_origin.as_deref(), Some("https://host.example"));
    assert_eq!(
        env.data.unwrap().get("method").and_then(|m| m.as_str()),
        Some("eth_chainId")
    );
}

#[test]
fn parse_response_with_error() {
    let s = r#"{
        "type": "RESPONSE",
        "id": 9,
        "error": { "code": 4001, "message": "user rejected", "key": "msg__rejected" }
    }"#;
    let env: Envelope = serde_json::from_str(s).unwrap();
    assert_eq!(env.kind, MessageType::Response);
    let err = env.error.unwrap();
    assert_eq!(err.code_i64(), Some(4001));
    assert_eq!(err.key.as_deref(), Some("msg__rejected"));
}

#[test]
fn unknown_fields_are_ignored() {
    // Older peers may send fields this side does not know about.
    let s = r#"{ "type": "RESPONSE", "id": 1, "data": "0x1", "extra": { "a": 1 } }"#;
    let env: Envelope = serde_json::from_str(s).unwrap();
    assert_eq!(env.data, Some(json!("0x1")));
}

#[test]
fn serialize_then_parse_is_lossless() {
    let env = Envelope {
        kind: MessageType::Response,
        id: Some(CallId::Num(42)),
        scope: Some("solana".into()),
        data: Some(json!({ "result": [1, 2, 3] })),
        remote_id: Some(RemoteId::Num(7)),
        ..Envelope::default()
    };
    let s = serde_json::to_string(&env).unwrap();
    let back: Envelope = serde_json::from_str(&s).unwrap();
    assert_eq!(back, env);
}
