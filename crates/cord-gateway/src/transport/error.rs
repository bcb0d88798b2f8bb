//! Transport error types

use thiserror::Error;

/// Transport error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection could not be established
    #[error("Connect failed: {0}")]
    Connect(String),

    /// Outbound frame could not be encoded or written
    #[error("Send failed: {0}")]
    Send(String),

    /// Inbound stream failed
    #[error("Receive failed: {0}")]
    Receive(String),

    /// No transport is attached to the session
    #[error("Not connected")]
    NotConnected,

    /// The connection is already closed
    #[error("Connection closed")]
    Closed,
}
