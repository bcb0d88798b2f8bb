//! Client configuration
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use cord_core::Intents;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Gateway URL used when `CORD_GATEWAY_URL` is not set
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Member count above which a guild is considered large
pub const DEFAULT_LARGE_THRESHOLD: u16 = 50;

/// Default block size for the session arena
pub const DEFAULT_ARENA_BLOCK_SIZE: usize = 16 * 1024;

/// Default period of the arena memory report
pub const DEFAULT_MEMORY_REPORT_SECS: u64 = 360;

/// Range the gateway accepts for `large_threshold`
pub const LARGE_THRESHOLD_RANGE: std::ops::RangeInclusive<u16> = 50..=250;

/// Main client configuration
#[derive(Clone)]
pub struct CordConfig {
    /// Bot credential sent in IDENTIFY
    pub token: String,
    pub gateway_url: String,
    pub intents: Intents,
    pub large_threshold: u16,
    pub arena_block_size: usize,
    /// `None` disables the periodic memory report
    pub memory_report_interval: Option<Duration>,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl CordConfig {
    /// Configuration with the given token and every other value at its default
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            intents: Intents::DEFAULT,
            large_threshold: DEFAULT_LARGE_THRESHOLD,
            arena_block_size: DEFAULT_ARENA_BLOCK_SIZE,
            memory_report_interval: Some(Duration::from_secs(DEFAULT_MEMORY_REPORT_SECS)),
            env: Environment::Development,
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `CORD_APPLICATION_TOKEN` is missing or a value fails to parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = var("CORD_APPLICATION_TOKEN")
            .ok_or(ConfigError::MissingVar("CORD_APPLICATION_TOKEN"))?;

        let intents = match var("CORD_INTENTS") {
            Some(raw) => {
                let bits = parse_bits(&raw)
                    .ok_or_else(|| ConfigError::InvalidValue("CORD_INTENTS", raw.clone()))?;
                Intents::from_bits(bits)
                    .ok_or(ConfigError::InvalidValue("CORD_INTENTS", raw))?
            }
            None => Intents::DEFAULT,
        };

        let large_threshold = parse_or(
            "CORD_LARGE_THRESHOLD",
            var("CORD_LARGE_THRESHOLD"),
            DEFAULT_LARGE_THRESHOLD,
        )?;
        if !LARGE_THRESHOLD_RANGE.contains(&large_threshold) {
            return Err(ConfigError::InvalidValue(
                "CORD_LARGE_THRESHOLD",
                large_threshold.to_string(),
            ));
        }

        let arena_block_size = parse_or(
            "CORD_ARENA_BLOCK_SIZE",
            var("CORD_ARENA_BLOCK_SIZE"),
            DEFAULT_ARENA_BLOCK_SIZE,
        )?;
        if arena_block_size == 0 {
            return Err(ConfigError::InvalidValue("CORD_ARENA_BLOCK_SIZE", "0".to_string()));
        }

        let report_secs: u64 = parse_or(
            "CORD_MEMORY_REPORT_SECS",
            var("CORD_MEMORY_REPORT_SECS"),
            DEFAULT_MEMORY_REPORT_SECS,
        )?;

        Ok(Self {
            token,
            gateway_url: var("CORD_GATEWAY_URL")
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            intents,
            large_threshold,
            arena_block_size,
            memory_report_interval: (report_secs > 0).then(|| Duration::from_secs(report_secs)),
            env: var("APP_ENV")
                .and_then(|s| match s.to_lowercase().as_str() {
                    "production" => Some(Environment::Production),
                    "development" => Some(Environment::Development),
                    _ => None,
                })
                .unwrap_or_default(),
        })
    }
}

impl fmt::Debug for CordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CordConfig")
            .field("token", &"<redacted>")
            .field("gateway_url", &self.gateway_url)
            .field("intents", &self.intents)
            .field("large_threshold", &self.large_threshold)
            .field("arena_block_size", &self.arena_block_size)
            .field("memory_report_interval", &self.memory_report_interval)
            .field("env", &self.env)
            .finish()
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Decimal or `0x`-prefixed hexadecimal
fn parse_bits(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<CordConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CordConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_token() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("CORD_APPLICATION_TOKEN")));

        let err = load(&[("CORD_APPLICATION_TOKEN", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("CORD_APPLICATION_TOKEN")));
    }

    #[test]
    fn test_default_values() {
        let config = load(&[("CORD_APPLICATION_TOKEN", "secret")]).unwrap();
        assert_eq!(config.token, "secret");
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY_URL);
        assert_eq!(config.intents, Intents::DEFAULT);
        assert_eq!(config.large_threshold, 50);
        assert_eq!(config.arena_block_size, 16 * 1024);
        assert_eq!(config.memory_report_interval, Some(Duration::from_secs(360)));
        assert!(config.env.is_development());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CORD_APPLICATION_TOKEN", "secret"),
            ("CORD_GATEWAY_URL", "ws://127.0.0.1:9000"),
            ("CORD_INTENTS", "0x201"),
            ("CORD_LARGE_THRESHOLD", "250"),
            ("CORD_ARENA_BLOCK_SIZE", "4096"),
            ("CORD_MEMORY_REPORT_SECS", "0"),
            ("APP_ENV", "Production"),
        ])
        .unwrap();

        assert_eq!(config.gateway_url, "ws://127.0.0.1:9000");
        assert_eq!(config.intents, Intents::GUILDS | Intents::GUILD_MESSAGES);
        assert_eq!(config.large_threshold, 250);
        assert_eq!(config.arena_block_size, 4096);
        assert_eq!(config.memory_report_interval, None);
        assert!(config.env.is_production());
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[
            ("CORD_APPLICATION_TOKEN", "secret"),
            ("CORD_LARGE_THRESHOLD", "20"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("CORD_LARGE_THRESHOLD", _)));

        let err = load(&[
            ("CORD_APPLICATION_TOKEN", "secret"),
            ("CORD_ARENA_BLOCK_SIZE", "lots"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("CORD_ARENA_BLOCK_SIZE", _)));

        let err = load(&[
            ("CORD_APPLICATION_TOKEN", "secret"),
            ("CORD_INTENTS", "0xzz"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("CORD_INTENTS", _)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = CordConfig::new("very-secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
