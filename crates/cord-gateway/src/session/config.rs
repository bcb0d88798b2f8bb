//! Per-session settings

use crate::protocol::{IdentifyPayload, IdentifyProperties};
use cord_common::config::{
    ConfigError, CordConfig, DEFAULT_ARENA_BLOCK_SIZE, DEFAULT_LARGE_THRESHOLD, LARGE_THRESHOLD_RANGE,
};
use cord_core::Intents;

/// Settings a session needs to identify and size its arena
#[derive(Clone)]
pub struct SessionConfig {
    pub token: String,
    pub intents: Intents,
    pub large_threshold: u16,
    pub arena_block_size: usize,
    pub properties: IdentifyProperties,
}

impl SessionConfig {
    /// Session settings with the given token and default values
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: Intents::DEFAULT,
            large_threshold: DEFAULT_LARGE_THRESHOLD,
            arena_block_size: DEFAULT_ARENA_BLOCK_SIZE,
            properties: IdentifyProperties::default(),
        }
    }

    #[must_use]
    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    #[must_use]
    pub fn with_arena_block_size(mut self, arena_block_size: usize) -> Self {
        self.arena_block_size = arena_block_size;
        self
    }

    /// Reject settings the gateway or the arena cannot work with
    ///
    /// Mirrors the checks `CordConfig::from_env` applies to the environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingVar("CORD_APPLICATION_TOKEN"));
        }
        if !LARGE_THRESHOLD_RANGE.contains(&self.large_threshold) {
            return Err(ConfigError::InvalidValue(
                "CORD_LARGE_THRESHOLD",
                self.large_threshold.to_string(),
            ));
        }
        if self.arena_block_size == 0 {
            return Err(ConfigError::InvalidValue("CORD_ARENA_BLOCK_SIZE", "0".to_string()));
        }
        Ok(())
    }

    /// IDENTIFY payload for a fresh connection
    pub(crate) fn identify_payload(&self) -> IdentifyPayload {
        IdentifyPayload::new(self.token.clone(), self.intents)
            .with_large_threshold(self.large_threshold)
            .with_properties(self.properties.clone())
    }
}

impl From<&CordConfig> for SessionConfig {
    fn from(config: &CordConfig) -> Self {
        Self {
            token: config.token.clone(),
            intents: config.intents,
            large_threshold: config.large_threshold,
            arena_block_size: config.arena_block_size,
            properties: IdentifyProperties::default(),
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("token", &"<redacted>")
            .field("intents", &self.intents)
            .field("large_threshold", &self.large_threshold)
            .field("arena_block_size", &self.arena_block_size)
            .field("properties", &self.properties)
            .finish()
    }
}
