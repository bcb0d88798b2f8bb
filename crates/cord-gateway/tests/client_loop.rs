//! Client event loop tests
//!
//! Time is paused so heartbeat deadlines and the shutdown timer are
//! deterministic; the runtime advances the clock whenever it is idle.

mod common;

use common::{close, frame, MockConnector, HELLO};
use cord_gateway::protocol::CloseCode;
use cord_gateway::{ClientBuilder, GatewayError, SessionState, TransportError};
use serde_json::json;
use std::time::Duration;

const GATEWAY_URL: &str = "wss://gateway.test/?v=10&encoding=json";

fn shutdown_after(ms: u64) -> tokio::time::Sleep {
    tokio::time::sleep(Duration::from_millis(ms))
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_then_shutdown() {
    let connector = MockConnector::new()
        .script(vec![
            cord_gateway::TransportEvent::Open,
            frame(HELLO),
            frame(r#"{"op":0,"s":5,"t":"GUILD_CREATE","d":{}}"#),
            frame(r#"{"op":7}"#),
        ])
        .script(vec![
            cord_gateway::TransportEvent::Open,
            frame(HELLO),
            frame(r#"{"op":0,"s":1,"t":"GUILD_CREATE","d":{}}"#),
        ]);

    let mut client = ClientBuilder::new("token")
        .gateway_url(GATEWAY_URL)
        .memory_report_interval(Some(Duration::from_millis(250)))
        .build()
        .unwrap();

    client.run_until(&connector, shutdown_after(1_000)).await.unwrap();

    assert_eq!(connector.urls(), vec![GATEWAY_URL, GATEWAY_URL]);

    let wires = connector.wires();
    assert_eq!(wires.len(), 2);
    for wire in &wires {
        let wire = wire.lock();
        assert_eq!(wire.ops(), vec![1, 2]);
        assert_eq!(wire.sent[0], json!({"op": 1, "d": null}));
        assert!(wire.closed);
    }

    let session = client.session();
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.sequence(), 1);
    assert!(!session.heartbeat().is_active());
    assert!(!session.has_transport());
}

#[tokio::test(start_paused = true)]
async fn test_recoverable_close_reconnects() {
    let connector = MockConnector::new()
        .script(vec![cord_gateway::TransportEvent::Open, frame(HELLO), close(4000)])
        .script(vec![cord_gateway::TransportEvent::Open, frame(HELLO)]);

    let mut client = ClientBuilder::new("token").build().unwrap();
    client.run_until(&connector, shutdown_after(1_000)).await.unwrap();

    assert_eq!(connector.wires().len(), 2);
    assert_eq!(client.session().fatal_close(), None);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_close_ends_run() {
    let connector = MockConnector::new()
        .script(vec![cord_gateway::TransportEvent::Open, frame(HELLO), close(4004)])
        .script(vec![cord_gateway::TransportEvent::Open]);

    let mut client = ClientBuilder::new("bad-token").build().unwrap();
    let err = client
        .run_until(&connector, std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::FatalClose(CloseCode::AuthenticationFailed)));
    // no second connection attempt
    assert_eq!(connector.wires().len(), 1);
    assert!(connector.wires()[0].lock().closed);
    assert_eq!(client.session().state(), SessionState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_fires_every_interval() {
    let connector = MockConnector::new().script(vec![
        cord_gateway::TransportEvent::Open,
        frame(r#"{"op":10,"d":{"heartbeat_interval":1000}}"#),
        frame(r#"{"op":0,"s":9,"t":"GUILD_CREATE","d":{}}"#),
    ]);

    let mut client = ClientBuilder::new("token").build().unwrap();
    client.run_until(&connector, shutdown_after(3_500)).await.unwrap();

    let wire = connector.wires()[0].clone();
    let wire = wire.lock();
    assert_eq!(wire.ops(), vec![1, 2, 1, 1, 1]);
    assert_eq!(wire.sent[2], json!({"op": 1, "d": 9}));
    assert_eq!(client.session().heartbeat().fired(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_connect_failure_ends_run() {
    let connector = MockConnector::new();

    let mut client = ClientBuilder::new("token").build().unwrap();
    let err = client
        .run_until(&connector, std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Transport(TransportError::Connect(_))));
    assert_eq!(client.session().state(), SessionState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_connect_completes() {
    let connector = MockConnector::new().script(vec![cord_gateway::TransportEvent::Open]);

    let mut client = ClientBuilder::new("token").build().unwrap();
    client.run_until(&connector, std::future::ready(())).await.unwrap();

    assert_eq!(client.session().state(), SessionState::Closed);
}
