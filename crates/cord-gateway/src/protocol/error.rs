//! Inbound frame errors

use super::OpCode;
use thiserror::Error;

/// Reasons an inbound frame is dropped
#[derive(Debug, Error)]
pub enum FrameError {
    /// Frame is not valid JSON or has mistyped envelope fields
    #[error("Invalid frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame has no op code")]
    MissingOp,

    #[error("Unknown op code: {0}")]
    UnknownOpcode(u64),

    /// `d` is absent on an op code that requires a payload
    #[error("Missing payload for {0}")]
    MissingPayload(OpCode),

    #[error("Dispatch frame has no event name")]
    MissingEventName,
}
