//! In-memory transport and connector for driving sessions in tests

#![allow(dead_code)]

use async_trait::async_trait;
use cord_gateway::transport::{Connection, Connector, FrameType, Transport, TransportError, TransportEvent};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const HELLO: &str = r#"{"op":10,"d":{"heartbeat_interval":41250}}"#;

pub fn frame(raw: &str) -> TransportEvent {
    TransportEvent::Message(raw.to_string())
}

pub fn close(code: u16) -> TransportEvent {
    TransportEvent::Close {
        code: Some(code),
        reason: String::new(),
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Everything a transport was asked to do
#[derive(Debug, Default)]
pub struct Wire {
    pub sent: Vec<Value>,
    pub closed: bool,
}

impl Wire {
    pub fn ops(&self) -> Vec<u64> {
        self.sent.iter().filter_map(|v| v["op"].as_u64()).collect()
    }
}

pub type SharedWire = Arc<Mutex<Wire>>;

pub struct MockTransport {
    wire: SharedWire,
}

impl MockTransport {
    pub fn new() -> (Self, SharedWire) {
        let wire = SharedWire::default();
        (Self { wire: wire.clone() }, wire)
    }
}

impl Transport for MockTransport {
    fn send(&mut self, payload: &str, _frame: FrameType) -> Result<(), TransportError> {
        let mut wire = self.wire.lock();
        if wire.closed {
            return Err(TransportError::Closed);
        }
        let value = serde_json::from_str(payload).map_err(|e| TransportError::Send(e.to_string()))?;
        wire.sent.push(value);
        Ok(())
    }

    fn close(&mut self) {
        self.wire.lock().closed = true;
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Hands out one scripted connection per `connect` call
///
/// Every scripted event is buffered up front. The sending half of each event
/// channel is kept so a connection stays open once its script runs out.
#[derive(Default)]
pub struct MockConnector {
    scripts: Mutex<VecDeque<Vec<TransportEvent>>>,
    wires: Mutex<Vec<SharedWire>>,
    senders: Mutex<Vec<mpsc::Sender<TransportEvent>>>,
    urls: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, events: Vec<TransportEvent>) -> Self {
        self.scripts.lock().push_back(events);
        self
    }

    pub fn wires(&self) -> Vec<SharedWire> {
        self.wires.lock().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError> {
        self.urls.lock().push(url.to_string());

        let Some(events) = self.scripts.lock().pop_front() else {
            return Err(TransportError::Connect("connection refused".to_string()));
        };

        let (tx, rx) = mpsc::channel(events.len() + 1);
        for event in events {
            tx.try_send(event)
                .map_err(|e| TransportError::Connect(e.to_string()))?;
        }
        self.senders.lock().push(tx);

        let (transport, wire) = MockTransport::new();
        self.wires.lock().push(wire);

        Ok(Connection {
            transport: Box::new(transport),
            events: rx,
        })
    }
}
