//! Transport abstraction
//!
//! The session only needs to push frames out and be told what arrived. A
//! [`Connector`] opens a connection and returns both halves: a [`Transport`]
//! for sending and a channel of [`TransportEvent`]s for everything received.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{WebSocketConnector, WebSocketTransport};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// WebSocket frame type used for an outbound payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Text,
    Binary,
}

/// Something that happened on the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection is open and ready for frames
    Open,
    /// A text frame arrived
    Message(String),
    /// The connection reported an error
    Error(TransportError),
    /// The peer closed the connection; `code` is absent on abnormal closure
    Close { code: Option<u16>, reason: String },
}

/// Sending half of a connection
///
/// Sends must not block; implementations queue the frame for delivery.
pub trait Transport: Send {
    fn send(&mut self, payload: &str, frame: FrameType) -> Result<(), TransportError>;

    /// Start closing the connection. Further sends fail.
    fn close(&mut self);
}

/// An open connection
pub struct Connection {
    pub transport: Box<dyn Transport>,
    pub events: mpsc::Receiver<TransportEvent>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens connections to the gateway
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError>;
}
