//! Gateway protocol definitions
//!
//! Defines the envelope format, op codes, payloads, and close codes.

mod close_codes;
mod error;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use error::FrameError;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{
    Activity, ActivityType, HelloPayload, IdentifyPayload, IdentifyProperties,
    PresenceUpdatePayload, Status, LIBRARY_NAME,
};
