//! Dispatch event handlers
//!
//! Built-in handlers bound in the default dispatch table. Each one decodes
//! its payload and passes the result on to the application callbacks.

mod error;
mod message_create;
mod ready;

pub use error::{HandlerError, HandlerResult};
pub use message_create::message_create;
pub use ready::ready;
