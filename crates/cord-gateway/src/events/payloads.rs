//! Event payload definitions
//!
//! Dispatch payloads that are read with serde rather than decoded into an arena.

use serde::Deserialize;
use serde_json::Value;

/// READY event payload
///
/// Sent after successful Identify.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    pub v: u8,

    /// Current user, decoded separately into the session arena
    pub user: Value,

    /// Guilds the user is in (initially unavailable)
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL for resuming
    #[serde(default)]
    pub resume_gateway_url: Option<String>,
}

/// Unavailable guild in READY event
#[derive(Debug, Clone, Deserialize)]
pub struct UnavailableGuild {
    pub id: String,
    #[serde(default)]
    pub unavailable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ready_event() {
        let ready = ReadyEvent::deserialize(&json!({
            "v": 10,
            "user": {"id": "1", "username": "cord"},
            "guilds": [{"id": "2", "unavailable": true}, {"id": "3"}],
            "session_id": "abc",
            "resume_gateway_url": "wss://gateway-us-east1-b.discord.gg",
            "application": {"id": "1", "flags": 0}
        }))
        .unwrap();

        assert_eq!(ready.v, 10);
        assert_eq!(ready.session_id, "abc");
        assert_eq!(ready.guilds.len(), 2);
        assert!(ready.guilds[0].unavailable);
        assert!(!ready.guilds[1].unavailable);
        assert_eq!(ready.user["username"], "cord");
    }

    #[test]
    fn test_ready_event_requires_session_id() {
        assert!(ReadyEvent::deserialize(&json!({"v": 10, "user": {}})).is_err());
    }
}
