//! Op code payload definitions
//!
//! `HelloPayload` is received; the rest are sent by the client.

use chrono::{DateTime, Utc};
use cord_core::Intents;
use serde::{Deserialize, Serialize, Serializer};

/// Name reported as `browser` and `device` in IDENTIFY
pub const LIBRARY_NAME: &str = "cord";

/// Payload for op 10 (Hello)
///
/// Sent by the gateway immediately after connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
#[derive(Clone, Serialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub properties: IdentifyProperties,
    pub intents: Intents,
    /// Member count (50..=250) above which offline members are not sent
    pub large_threshold: u16,
    pub compress: bool,
}

impl IdentifyPayload {
    /// Default large guild threshold
    pub const DEFAULT_LARGE_THRESHOLD: u16 = 50;

    /// Create an Identify payload with default properties
    #[must_use]
    pub fn new(token: impl Into<String>, intents: Intents) -> Self {
        Self {
            token: token.into(),
            properties: IdentifyProperties::default(),
            intents,
            large_threshold: Self::DEFAULT_LARGE_THRESHOLD,
            compress: false,
        }
    }

    #[must_use]
    pub fn with_large_threshold(mut self, large_threshold: u16) -> Self {
        self.large_threshold = large_threshold;
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: IdentifyProperties) -> Self {
        self.properties = properties;
        self
    }
}

impl std::fmt::Debug for IdentifyPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifyPayload")
            .field("token", &"<redacted>")
            .field("properties", &self.properties)
            .field("intents", &self.intents)
            .field("large_threshold", &self.large_threshold)
            .field("compress", &self.compress)
            .finish()
    }
}

/// Client connection properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    pub os: String,
    /// Library name
    pub browser: String,
    /// Library name
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: LIBRARY_NAME.to_string(),
            device: LIBRARY_NAME.to_string(),
        }
    }
}

/// Online status sent with a presence update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Online,
    Dnd,
    Idle,
    Invisible,
    Offline,
}

/// Activity type shown next to the bot's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ActivityType {
    Playing = 0,
    Streaming = 1,
    Listening = 2,
    Watching = 3,
    Custom = 4,
    Competing = 5,
}

impl Serialize for ActivityType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

/// A single activity in a presence update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    /// Stream URL, only used with [`ActivityType::Streaming`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Custom status text, only used with [`ActivityType::Custom`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Activity {
    fn new(kind: ActivityType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            url: None,
            state: None,
        }
    }

    #[must_use]
    pub fn playing(name: impl Into<String>) -> Self {
        Self::new(ActivityType::Playing, name)
    }

    #[must_use]
    pub fn streaming(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::new(ActivityType::Streaming, name)
        }
    }

    #[must_use]
    pub fn listening(name: impl Into<String>) -> Self {
        Self::new(ActivityType::Listening, name)
    }

    #[must_use]
    pub fn watching(name: impl Into<String>) -> Self {
        Self::new(ActivityType::Watching, name)
    }

    #[must_use]
    pub fn competing(name: impl Into<String>) -> Self {
        Self::new(ActivityType::Competing, name)
    }

    /// Custom status; the gateway requires a name but displays `state`
    #[must_use]
    pub fn custom(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            ..Self::new(ActivityType::Custom, "Custom Status")
        }
    }
}

/// Payload for op 3 (Presence Update)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PresenceUpdatePayload {
    /// Unix time in milliseconds since the client went idle
    pub since: Option<i64>,
    pub activities: Vec<Activity>,
    pub status: Status,
    pub afk: bool,
}

impl PresenceUpdatePayload {
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Mark the client idle and AFK since `at`
    #[must_use]
    pub fn idle_since(mut self, at: DateTime<Utc>) -> Self {
        self.status = Status::Idle;
        self.since = Some(at.timestamp_millis());
        self.afk = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_hello_payload() {
        let hello: HelloPayload = serde_json::from_value(json!({
            "heartbeat_interval": 41250,
            "_trace": ["gateway-prd-main"]
        }))
        .unwrap();
        assert_eq!(hello.heartbeat_interval, 41_250);

        assert!(serde_json::from_value::<HelloPayload>(json!({})).is_err());
        assert!(serde_json::from_value::<HelloPayload>(json!({"heartbeat_interval": -1})).is_err());
    }

    #[test]
    fn test_identify_payload_serialization() {
        let payload = IdentifyPayload::new("token123", Intents::GUILDS | Intents::GUILD_MESSAGES);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["token"], "token123");
        assert_eq!(value["intents"], 513);
        assert_eq!(value["large_threshold"], 50);
        assert_eq!(value["compress"], false);
        assert_eq!(value["properties"]["os"], std::env::consts::OS);
        assert_eq!(value["properties"]["browser"], LIBRARY_NAME);
        assert_eq!(value["properties"]["device"], LIBRARY_NAME);
    }

    #[test]
    fn test_identify_debug_redacts_token() {
        let payload = IdentifyPayload::new("token123", Intents::DEFAULT);
        assert!(!format!("{payload:?}").contains("token123"));
    }

    #[test]
    fn test_presence_update_serialization() {
        let payload = PresenceUpdatePayload::new(Status::Dnd).with_activity(Activity::playing("pong"));
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value,
            json!({
                "since": null,
                "activities": [{"name": "pong", "type": 0}],
                "status": "dnd",
                "afk": false
            })
        );
    }

    #[test]
    fn test_idle_since() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let payload = PresenceUpdatePayload::default().idle_since(at);

        assert_eq!(payload.status, Status::Idle);
        assert_eq!(payload.since, Some(1_704_067_200_000));
        assert!(payload.afk);
    }

    #[test]
    fn test_custom_activity() {
        let value = serde_json::to_value(Activity::custom("busy")).unwrap();
        assert_eq!(value["type"], 4);
        assert_eq!(value["state"], "busy");
    }
}
