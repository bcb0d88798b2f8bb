//! A single fixed-capacity arena block

use crate::error::ArenaError;

/// Flat buffer with a bump offset.
///
/// `used` only grows through allocation; it shrinks only through scope
/// rollback or an arena reset.
#[derive(Debug)]
pub(super) struct Block {
    data: Vec<u8>,
    pub(super) used: usize,
}

impl Block {
    /// Create a zero-filled block, reporting allocator exhaustion as an error
    pub(super) fn try_with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| ArenaError::OutOfMemory { requested: capacity })?;
        data.resize(capacity, 0);
        Ok(Self { data, used: 0 })
    }

    /// Create the initial block of an arena
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            used: 0,
        }
    }

    #[inline]
    pub(super) fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(super) fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Carve `size` bytes at the current offset, zero them and bump `used`.
    ///
    /// The caller guarantees `size <= self.remaining()`.
    pub(super) fn bump(&mut self, size: usize) -> usize {
        let offset = self.used;
        self.data[offset..offset + size].fill(0);
        self.used += size;
        offset
    }

    /// Bytes in `offset..offset + len`, if the range is currently allocated
    pub(super) fn get(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.used {
            return None;
        }
        self.data.get(offset..end)
    }

    pub(super) fn get_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        let end = offset.checked_add(len)?;
        if end > self.used {
            return None;
        }
        self.data.get_mut(offset..end)
    }
}
