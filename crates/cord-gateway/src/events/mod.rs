//! Gateway events
//!
//! Event names, the dispatch table that routes them, and the callback
//! surface exposed to the embedding application.

mod callbacks;
mod dispatch;
mod event_types;
mod payloads;

pub use callbacks::{Context, EventCallbacks, MessageCallback, TransportErrorCallback};
pub use dispatch::{
    DispatchContext, DispatchEntry, DispatchError, DispatchTable, EventHandler, Lookup,
};
pub use event_types::GatewayEventType;
pub use payloads::{ReadyEvent, UnavailableGuild};
