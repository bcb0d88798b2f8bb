//! Gateway message format
//!
//! Every frame exchanged with the gateway is a JSON object with the fields
//! `op`, `d`, `s` and `t`.

use super::{FrameError, IdentifyPayload, OpCode, PresenceUpdatePayload};
use crate::heartbeat::is_valid_sequence;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event data payload, `null` when absent
    pub d: Value,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<i64>,

    /// Event name (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

/// Envelope as it arrives, before validation
#[derive(Deserialize)]
struct RawFrame {
    op: Option<u64>,
    d: Option<Value>,
    s: Option<i64>,
    t: Option<String>,
}

impl GatewayMessage {
    fn new(op: OpCode, d: Value) -> Self {
        Self { op, d, s: None, t: None }
    }

    // === Client Messages ===

    /// Create a Heartbeat message (op=1)
    ///
    /// Carries the last sequence number, or `null` before the first dispatch.
    #[must_use]
    pub fn heartbeat(sequence: i64) -> Self {
        let d = if is_valid_sequence(sequence) {
            Value::from(sequence)
        } else {
            Value::Null
        };
        Self::new(OpCode::Heartbeat, d)
    }

    /// Create an Identify message (op=2)
    pub fn identify(payload: &IdentifyPayload) -> Result<Self, serde_json::Error> {
        Self::encode(OpCode::Identify, payload)
    }

    /// Create a Presence Update message (op=3)
    pub fn presence_update(payload: &PresenceUpdatePayload) -> Result<Self, serde_json::Error> {
        Self::encode(OpCode::PresenceUpdate, payload)
    }

    fn encode<T: Serialize>(op: OpCode, payload: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(payload).map(|d| Self::new(op, d))
    }

    // === Parsing Gateway Messages ===

    /// Parse and validate an inbound frame
    ///
    /// `d` may be omitted except on op codes that require a payload, and
    /// dispatch frames must name their event.
    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        let frame: RawFrame = serde_json::from_str(raw)?;

        let code = frame.op.ok_or(FrameError::MissingOp)?;
        let op = u8::try_from(code)
            .ok()
            .and_then(OpCode::from_u8)
            .ok_or(FrameError::UnknownOpcode(code))?;

        let d = match frame.d {
            Some(d) => d,
            None if op.requires_payload() => return Err(FrameError::MissingPayload(op)),
            None => Value::Null,
        };

        if op == OpCode::Dispatch && frame.t.as_deref().unwrap_or_default().is_empty() {
            return Err(FrameError::MissingEventName);
        }

        Ok(Self {
            op,
            d,
            s: frame.s,
            t: frame.t,
        })
    }

    /// Event name of a dispatch frame
    pub fn event_name(&self) -> Option<&str> {
        self.t.as_deref()
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}
