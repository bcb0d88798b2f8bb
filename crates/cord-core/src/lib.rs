//! # cord-core
//!
//! Core layer containing the block-chained arena allocator, the typed gateway
//! entities, and the decoder that materializes them inside an arena.
//! This crate has no I/O and no dependency on the gateway transport.

pub mod entities;
pub mod error;
pub mod memory;
pub mod serialize;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Message, MessageView, User, UserView};
pub use error::{ArenaError, DecodeError};
pub use memory::{Arena, ArenaSlice, ArenaStats, ArenaStr, TempScope, DEFAULT_BLOCK_SIZE, MAX_ALIGN};
pub use serialize::Decode;
pub use value_objects::Intents;
