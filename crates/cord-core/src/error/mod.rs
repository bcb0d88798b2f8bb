//! Core error types

mod arena_error;
mod decode_error;

pub use arena_error::ArenaError;
pub use decode_error::DecodeError;
