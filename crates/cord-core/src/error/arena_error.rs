//! Arena allocation errors

use thiserror::Error;

/// Errors returned by [`crate::Arena`] allocation.
///
/// An allocation failure is local to the call that produced it; the arena
/// itself stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("Allocation size overflows when aligned: {requested} bytes")]
    SizeOverflow { requested: usize },

    #[error("Out of memory: could not obtain a block of {requested} bytes")]
    OutOfMemory { requested: usize },
}
