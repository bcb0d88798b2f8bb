//! Arena memory management
//!
//! Per-message working memory is carved out of a chain of fixed-capacity
//! blocks and reclaimed in bulk, either by rolling back a [`TempScope`] or by
//! resetting the whole arena.

mod arena;
mod block;
mod handle;

pub use arena::{Arena, ArenaStats, TempScope, DEFAULT_BLOCK_SIZE, MAX_ALIGN};
pub use handle::{ArenaSlice, ArenaStr};
