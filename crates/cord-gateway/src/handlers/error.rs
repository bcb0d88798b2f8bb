//! Handler error types

use cord_core::{ArenaError, DecodeError};
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload could not be decoded into the session arena
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Handler scratch allocation failed
    #[error("Arena error: {0}")]
    Arena(#[from] ArenaError),

    /// Payload did not match the expected shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl HandlerError {
    /// Whether the failure came from the arena running out of memory
    pub fn is_allocation_failure(&self) -> bool {
        match self {
            Self::Decode(e) => e.is_allocation_failure(),
            Self::Arena(_) => true,
            Self::InvalidPayload(_) => false,
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
