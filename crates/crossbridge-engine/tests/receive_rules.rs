//! Inbound validation: parsing, tamper resistance, scope/origin rules,
//! legacy filtering, unsupported types.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use serde_json::json;

use crossbridge_core::error::{BridgeError, Result};
use crossbridge_core::protocol::{Envelope, SenderMeta};
use crossbridge_engine::{
    Bridge, BridgeConfig, BridgeEvent, OutboundPayload, ReceivedPayload, Transport,
};

#[derive(Default)]
struct CaptureTransport {
    sent: Mutex<Vec<Envelope>>,
}

impl CaptureTransport {
    fn sent_len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Transport for CaptureTransport {
    fn send_payload(&self, payload: OutboundPayload) -> Result<()> {
        let env = match payload {
            OutboundPayload::Text(text) => serde_json::from_str(&text).unwrap(),
            OutboundPayload::Structured(env) => env,
        };
        self.sent.lock().unwrap().push(env);
        Ok(())
    }
}

fn host_bridge(config: BridgeConfig) -> (Arc<CaptureTransport>, Arc<Bridge>) {
    let transport = Arc::new(CaptureTransport::default());
    let bridge = Bridge::new(config, Arc::clone(&transport) as Arc<dyn Transport>, None);
    (transport, bridge)
}

#[tokio::test]
async fn malformed_json_fails_that_receive_only() {
    let (transport, bridge) = host_bridge(BridgeConfig {
        timeout_ms: 0,
        is_injected: true,
        ..BridgeConfig::default()
    });
    let mut events = bridge.subscribe_events();

    // one call in flight; the bad delivery must not disturb it
    let pending = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            bridge
                .request(crossbridge_engine::RequestArgs {
                    scope: Some("eth".into()),
                    data: json!({ "method": "eth_chainId" }),
                    remote_id: None,
                })
                .await
        })
    };
    while transport.sent_len() == 0 {
        tokio::task::yield_now().await;
    }

    let err = bridge
        .receive("{not json".into(), &SenderMeta::internal("host"))
        .unwrap_err();
    assert!(matches!(err, BridgeError::Parse(_)));
    assert_eq!(bridge.pending_calls(), 1);

    // surfaced on the event stream as well
    let BridgeEvent::Error(event) = events.recv().await.unwrap();
    assert_eq!(event.code_i64(), Some(-32700));

    // the bridge keeps processing after a bad delivery
    let id = transport.sent.lock().unwrap()[0].id.clone();
    let ok = json!({ "type": "RESPONSE", "id": id, "data": "0x1" });
    bridge
        .receive(ReceivedPayload::Json(ok), &SenderMeta::internal("host"))
        .unwrap();
    assert_eq!(pending.await.unwrap().unwrap(), json!("0x1"));
}

#[tokio::test]
async fn payload_origin_and_internal_claims_are_overwritten() {
    let (_t, bridge) = host_bridge(BridgeConfig::default());

    // claims to be internal and from a privileged origin; the transport
    // says otherwise, so scope enforcement applies and the claim loses
    let tampered = json!({
        "type": "REQUEST",
        "id": 1,
        "origin": "https://wallet-internal.example",
        "internal": true,
    });
    let err = bridge
        .receive(
            ReceivedPayload::Json(tampered),
            &SenderMeta::external("https://dapp.example"),
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));

    // stamped values, not payload values, are what the bridge records
    let stamped = json!({
        "type": "REQUEST",
        "scope": "eth",
        "origin": "https://wallet-internal.example",
        "internal": true,
    });
    bridge
        .receive(
            ReceivedPayload::Json(stamped),
            &SenderMeta::external("https://dapp.example"),
        )
        .unwrap();
    assert_eq!(
        bridge.remote_info().origin.as_deref(),
        Some("https://dapp.example")
    );
}

#[tokio::test]
async fn non_internal_request_without_scope_is_rejected() {
    let (_t, bridge) = host_bridge(BridgeConfig::default());
    let env = json!({ "type": "REQUEST", "id": 5, "data": {} });
    let err = bridge
        .receive(
            ReceivedPayload::Json(env),
            &SenderMeta::external("https://dapp.example"),
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));
}

#[tokio::test]
async fn missing_origin_is_fatal_unless_injected() {
    let env = json!({ "type": "REQUEST", "scope": "eth" });

    let (_t, host) = host_bridge(BridgeConfig::default());
    let err = host
        .receive(ReceivedPayload::Json(env.clone()), &SenderMeta::default())
        .unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));

    let (_t, injected) = host_bridge(BridgeConfig {
        is_injected: true,
        ..BridgeConfig::default()
    });
    injected
        .receive(ReceivedPayload::Json(env), &SenderMeta::default())
        .unwrap();
}

#[tokio::test]
async fn unsupported_message_type_is_rejected() {
    let (_t, bridge) = host_bridge(BridgeConfig::default());
    let env = json!({ "type": "PING", "scope": "eth" });
    let err = bridge
        .receive(
            ReceivedPayload::Json(env),
            &SenderMeta::external("https://dapp.example"),
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedMessageType));
}

#[tokio::test]
async fn response_without_id_is_a_protocol_error() {
    let (_t, bridge) = host_bridge(BridgeConfig::default());
    let env = json!({ "type": "RESPONSE", "data": "0x1" });
    let err = bridge
        .receive(ReceivedPayload::Json(env), &SenderMeta::internal("host"))
        .unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));
}

#[tokio::test]
async fn legacy_broadcast_is_dropped_only_on_internal_ext_ui() {
    let legacy = json!({ "name": "publicConfig", "payload": {} });

    // host-UI bridge, internal transport: silently ignored
    let (_t, ext_ui) = host_bridge(BridgeConfig {
        is_ext_ui: true,
        ..BridgeConfig::default()
    });
    ext_ui
        .receive(
            ReceivedPayload::Json(legacy.clone()),
            &SenderMeta::internal("host"),
        )
        .unwrap();

    // same payload from an external sender is not exempt
    let err = ext_ui
        .receive(
            ReceivedPayload::Json(legacy.clone()),
            &SenderMeta::external("https://dapp.example"),
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));

    // a non-host-UI bridge does not filter it either
    let (_t, plain) = host_bridge(BridgeConfig::default());
    let err = plain
        .receive(ReceivedPayload::Json(legacy), &SenderMeta::internal("host"))
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedMessageType));
}

#[tokio::test]
async fn request_without_registered_handler_is_dropped() {
    let (transport, bridge) = host_bridge(BridgeConfig::default());
    let env = json!({ "type": "REQUEST", "id": 3, "scope": "eth", "data": {} });
    bridge
        .receive(
            ReceivedPayload::Json(env),
            &SenderMeta::external("https://dapp.example"),
        )
        .unwrap();
    tokio::task::yield_now().await;
    assert_eq!(transport.sent_len(), 0);
}

#[tokio::test]
async fn remote_reported_error_rejects_call_and_emits_event() {
    let (transport, bridge) = host_bridge(BridgeConfig {
        timeout_ms: 0,
        is_injected: true,
        ..BridgeConfig::default()
    });
    let mut events = bridge.subscribe_events();

    let pending = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            bridge
                .request(crossbridge_engine::RequestArgs {
                    scope: Some("eth".into()),
                    data: json!({ "method": "eth_sendTransaction" }),
                    remote_id: None,
                })
                .await
        })
    };
    while transport.sent_len() == 0 {
        tokio::task::yield_now().await;
    }
    let id = transport.sent.lock().unwrap()[0].id.clone();

    let response = json!({
        "type": "RESPONSE",
        "id": id,
        "error": { "code": 4001, "message": "user rejected", "data": { "reason": "denied" } },
    });
    bridge
        .receive(ReceivedPayload::Json(response), &SenderMeta::internal("host"))
        .unwrap();

    let err = pending.await.unwrap().unwrap_err();
    match err {
        BridgeError::Remote(wire) => {
            assert_eq!(wire.code_i64(), Some(4001));
            assert_eq!(wire.message.as_deref(), Some("user rejected"));
            assert_eq!(wire.data, Some(json!({ "reason": "denied" })));
        }
        other => panic!("expected remote error, got {other:?}"),
    }

    let BridgeEvent::Error(event) = events.recv().await.unwrap();
    assert_eq!(event.code_i64(), Some(4001));
}
