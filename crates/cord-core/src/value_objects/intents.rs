//! Gateway intent bitflags
//!
//! Intents declare which event groups the gateway should deliver to the
//! session. They are sent once, in the Identify payload.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Gateway intents
    ///
    /// Serialized as a plain integer in the Identify payload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        const GUILDS                        = 1 << 0;
        const GUILD_MEMBERS                 = 1 << 1;
        const GUILD_MODERATION              = 1 << 2;
        const GUILD_EMOJIS_AND_STICKERS     = 1 << 3;
        const GUILD_INTEGRATIONS            = 1 << 4;
        const GUILD_WEBHOOKS                = 1 << 5;
        const GUILD_INVITES                 = 1 << 6;
        const GUILD_VOICE_STATES            = 1 << 7;
        const GUILD_PRESENCES               = 1 << 8;
        const GUILD_MESSAGES                = 1 << 9;
        const GUILD_MESSAGE_REACTIONS       = 1 << 10;
        const GUILD_MESSAGE_TYPING          = 1 << 11;
        const DIRECT_MESSAGES               = 1 << 12;
        const DIRECT_MESSAGE_REACTIONS      = 1 << 13;
        const DIRECT_MESSAGE_TYPING         = 1 << 14;
        /// Privileged: message content in guild messages
        const MESSAGE_CONTENT               = 1 << 15;
        const GUILD_SCHEDULED_EVENTS        = 1 << 16;
        const AUTO_MODERATION_CONFIGURATION = 1 << 20;
        const AUTO_MODERATION_EXECUTION     = 1 << 21;
        const GUILD_MESSAGE_POLLS           = 1 << 24;
        const DIRECT_MESSAGE_POLLS          = 1 << 25;

        /// Guild-scoped intents requested by default
        const DEFAULT_GUILD = Self::GUILDS.bits()
            | Self::GUILD_MODERATION.bits()
            | Self::GUILD_EMOJIS_AND_STICKERS.bits()
            | Self::GUILD_INTEGRATIONS.bits()
            | Self::GUILD_WEBHOOKS.bits()
            | Self::GUILD_INVITES.bits()
            | Self::GUILD_MESSAGES.bits()
            | Self::GUILD_MESSAGE_REACTIONS.bits();

        /// Message-scoped intents requested by default
        const DEFAULT_MESSAGE = Self::DIRECT_MESSAGES.bits()
            | Self::DIRECT_MESSAGE_REACTIONS.bits()
            | Self::MESSAGE_CONTENT.bits();

        /// Scheduling, moderation and poll intents requested by default
        const DEFAULT_SCHEDULE = Self::GUILD_SCHEDULED_EVENTS.bits()
            | Self::AUTO_MODERATION_CONFIGURATION.bits()
            | Self::AUTO_MODERATION_EXECUTION.bits()
            | Self::GUILD_MESSAGE_POLLS.bits()
            | Self::DIRECT_MESSAGE_POLLS.bits();

        /// Default intent set sent in Identify
        const DEFAULT = Self::DEFAULT_GUILD.bits()
            | Self::DEFAULT_MESSAGE.bits()
            | Self::DEFAULT_SCHEDULE.bits();
    }
}

impl Intents {
    /// Intents that must be enabled for the application in the developer portal
    pub const PRIVILEGED: Intents = Intents::GUILD_MEMBERS
        .union(Intents::GUILD_PRESENCES)
        .union(Intents::MESSAGE_CONTENT);

    /// Check if any privileged intent is requested
    #[inline]
    pub fn is_privileged(&self) -> bool {
        self.intersects(Self::PRIVILEGED)
    }
}

impl Default for Intents {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

impl fmt::Display for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intents_value() {
        assert_eq!(Intents::DEFAULT.bits(), 0x0331_B67D);
        assert!(Intents::DEFAULT.contains(Intents::MESSAGE_CONTENT));
        assert!(!Intents::DEFAULT.contains(Intents::GUILD_PRESENCES));
        assert!(!Intents::DEFAULT.contains(Intents::GUILD_MESSAGE_TYPING));
    }

    #[test]
    fn test_privileged() {
        assert!(Intents::DEFAULT.is_privileged());
        assert!(!Intents::GUILDS.is_privileged());
        assert!((Intents::GUILDS | Intents::GUILD_MEMBERS).is_privileged());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&(Intents::GUILDS | Intents::GUILD_MESSAGES)).unwrap();
        assert_eq!(json, "513");

        let parsed: Intents = serde_json::from_str("513").unwrap();
        assert_eq!(parsed, Intents::GUILDS | Intents::GUILD_MESSAGES);
    }

    #[test]
    fn test_unknown_bits_dropped() {
        let intents = Intents::from_bits_truncate(1 | (1 << 40));
        assert_eq!(intents, Intents::GUILDS);
    }
}
