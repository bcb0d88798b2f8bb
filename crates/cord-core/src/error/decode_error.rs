//! Decode errors - failures while materializing entities from JSON

use thiserror::Error;

use super::ArenaError;

/// Errors produced by [`crate::Decode`] implementations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Expected a JSON object for {0}")]
    ExpectedObject(&'static str),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error(transparent)]
    Arena(#[from] ArenaError),
}

impl DecodeError {
    /// Check if the failure came from the allocator rather than the payload
    #[inline]
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::Arena(_))
    }
}
