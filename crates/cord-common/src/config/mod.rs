//! Configuration structs

mod cord_config;

pub use cord_config::{
    ConfigError, CordConfig, Environment, DEFAULT_ARENA_BLOCK_SIZE, DEFAULT_GATEWAY_URL,
    DEFAULT_LARGE_THRESHOLD, DEFAULT_MEMORY_REPORT_SECS, LARGE_THRESHOLD_RANGE,
};
