//! Gateway session
//!
//! The connection-lifecycle state machine and its settings.

mod config;
mod session;
mod state;

pub use config::SessionConfig;
pub use session::GatewaySession;
pub use state::SessionState;
