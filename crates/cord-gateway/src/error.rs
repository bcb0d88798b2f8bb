//! Top-level gateway errors

use crate::events::DispatchError;
use crate::protocol::CloseCode;
use crate::transport::TransportError;
use cord_common::ConfigError;
use thiserror::Error;

/// Errors that end a [`Client`](crate::Client) run
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client settings rejected before connecting
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// The gateway closed the connection with a code that forbids reconnecting
    #[error("Gateway closed the session: {0}")]
    FatalClose(CloseCode),
}

impl GatewayError {
    /// Close code for a fatal close, if that is what ended the run
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::FatalClose(code) => Some(*code),
            _ => None,
        }
    }
}
