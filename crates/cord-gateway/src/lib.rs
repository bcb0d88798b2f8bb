//! # cord-gateway
//!
//! Gateway client: protocol types, the session state machine with its
//! heartbeat, the dispatch table and the transport it runs over.

pub mod client;
pub mod error;
pub mod events;
pub mod handlers;
pub mod heartbeat;
pub mod protocol;
pub mod session;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use error::GatewayError;
pub use events::{Context, DispatchTable, EventCallbacks, GatewayEventType};
pub use session::{GatewaySession, SessionConfig, SessionState};
pub use transport::{Connector, Transport, TransportError, TransportEvent, WebSocketConnector};
