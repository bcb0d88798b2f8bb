//! Block-chained bump arena
//!
//! Allocation only ever happens in the last block of the chain. When the last
//! block cannot satisfy a request a new one is appended; the chain never
//! shrinks, and every block is released together when the arena is dropped.

use super::block::Block;
use super::handle::{ArenaSlice, ArenaStr};
use crate::error::ArenaError;

/// Default capacity of blocks appended on demand (4 KiB)
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024;

/// Every allocation is rounded up to this alignment
pub const MAX_ALIGN: usize = 16;

/// Round `size` up to [`MAX_ALIGN`]
fn align_up(size: usize) -> Result<usize, ArenaError> {
    size.checked_add(MAX_ALIGN - 1)
        .map(|n| n & !(MAX_ALIGN - 1))
        .ok_or(ArenaError::SizeOverflow { requested: size })
}

/// Checkpoint of an arena: chain position and bump offset at scope entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a scope releases nothing unless it is passed to Arena::end_scope"]
pub struct TempScope {
    block_index: usize,
    offset: usize,
}

impl TempScope {
    /// Index of the block that was last when the scope began
    #[inline]
    pub fn origin_block_index(&self) -> usize {
        self.block_index
    }

    /// Bump offset of the origin block when the scope began
    #[inline]
    pub fn origin_offset(&self) -> usize {
        self.offset
    }
}

/// Memory usage snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    pub blocks: usize,
    pub used: usize,
    pub capacity: usize,
}

/// Bump allocator over a chain of fixed-capacity blocks
#[derive(Debug)]
pub struct Arena {
    blocks: Vec<Block>,
    default_block_size: usize,
}

impl Arena {
    /// Create an arena whose first and subsequent blocks are [`DEFAULT_BLOCK_SIZE`]
    pub fn new() -> Self {
        Self::with_sizes(DEFAULT_BLOCK_SIZE, DEFAULT_BLOCK_SIZE)
    }

    /// Create an arena with a first block of `initial_capacity` bytes.
    ///
    /// Blocks appended later use [`DEFAULT_BLOCK_SIZE`].
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_sizes(initial_capacity, DEFAULT_BLOCK_SIZE)
    }

    /// Create an arena with explicit first-block and growth block sizes
    pub fn with_sizes(initial_capacity: usize, default_block_size: usize) -> Self {
        Self {
            blocks: vec![Block::with_capacity(initial_capacity)],
            default_block_size,
        }
    }

    /// Capacity used for blocks appended on demand
    #[inline]
    pub fn default_block_size(&self) -> usize {
        self.default_block_size
    }

    fn last_index(&self) -> usize {
        self.blocks.len() - 1
    }

    /// Free bytes left in the last block
    pub fn remaining(&self) -> usize {
        self.blocks[self.last_index()].remaining()
    }

    /// Number of blocks in the chain
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Bump offset of the block at `index`
    pub fn block_used(&self, index: usize) -> Option<usize> {
        self.blocks.get(index).map(|b| b.used)
    }

    /// Capacity of the block at `index`
    pub fn block_capacity(&self, index: usize) -> Option<usize> {
        self.blocks.get(index).map(Block::capacity)
    }

    /// Allocate `size` zero-filled bytes.
    ///
    /// The request is rounded up to [`MAX_ALIGN`]. If it does not fit in the
    /// last block, a block of `max(default_block_size, aligned_size)` bytes is
    /// appended first.
    pub fn alloc(&mut self, size: usize) -> Result<ArenaSlice, ArenaError> {
        let aligned = align_up(size)?;

        if aligned > self.remaining() {
            let capacity = self.default_block_size.max(aligned);
            let block = Block::try_with_capacity(capacity)?;
            self.blocks.push(block);
        }

        let index = self.last_index();
        let offset = self.blocks[index].bump(aligned);
        Ok(ArenaSlice {
            block: index,
            offset,
            len: size,
        })
    }

    /// Copy `bytes` into the arena
    pub fn alloc_bytes(&mut self, bytes: &[u8]) -> Result<ArenaSlice, ArenaError> {
        let slice = self.alloc(bytes.len())?;
        if let Some(dst) = self.bytes_mut(slice) {
            dst.copy_from_slice(bytes);
        }
        Ok(slice)
    }

    /// Copy a string into the arena
    pub fn alloc_str(&mut self, s: &str) -> Result<ArenaStr, ArenaError> {
        self.alloc_bytes(s.as_bytes()).map(ArenaStr)
    }

    /// Resolve a handle to its bytes
    pub fn bytes(&self, slice: ArenaSlice) -> Option<&[u8]> {
        self.blocks.get(slice.block)?.get(slice.offset, slice.len)
    }

    /// Resolve a handle to its bytes, mutably
    pub fn bytes_mut(&mut self, slice: ArenaSlice) -> Option<&mut [u8]> {
        self.blocks.get_mut(slice.block)?.get_mut(slice.offset, slice.len)
    }

    /// Resolve a string handle
    pub fn str(&self, s: ArenaStr) -> Option<&str> {
        self.bytes(s.0).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Record the current chain position and offset
    pub fn begin_scope(&self) -> TempScope {
        let index = self.last_index();
        TempScope {
            block_index: index,
            offset: self.blocks[index].used,
        }
    }

    /// Roll back everything allocated since `scope` began.
    ///
    /// Blocks appended during the scope stay in the chain with `used == 0`.
    pub fn end_scope(&mut self, scope: TempScope) {
        let last = self.last_index();
        if scope.block_index > last {
            return;
        }

        if scope.block_index == last {
            let block = &mut self.blocks[last];
            let allocated = block.used.saturating_sub(scope.offset);
            block.used = block.used.saturating_sub(allocated);
            return;
        }

        let origin = &mut self.blocks[scope.block_index];
        origin.used = scope.offset.min(origin.capacity());
        for block in &mut self.blocks[scope.block_index + 1..] {
            block.used = 0;
        }
    }

    /// Run `f` inside a scope that is ended when `f` returns
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Arena) -> R) -> R {
        let scope = self.begin_scope();
        let result = f(self);
        self.end_scope(scope);
        result
    }

    /// Mark every block empty without releasing any of them
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.used = 0;
        }
    }

    pub fn stats(&self) -> ArenaStats {
        self.blocks.iter().fold(
            ArenaStats {
                blocks: self.blocks.len(),
                ..ArenaStats::default()
            },
            |mut stats, block| {
                stats.used += block.used;
                stats.capacity += block.capacity();
                stats
            },
        )
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: usize = 1024;
    const E: usize = 16;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0).unwrap(), 0);
        assert_eq!(align_up(1).unwrap(), 16);
        assert_eq!(align_up(16).unwrap(), 16);
        assert_eq!(align_up(17).unwrap(), 32);
        assert!(matches!(
            align_up(usize::MAX),
            Err(ArenaError::SizeOverflow { .. })
        ));
    }

    #[test]
    fn test_remaining_tracks_allocations() {
        let mut arena = Arena::with_capacity(C);
        assert_eq!(arena.remaining(), C);

        for n in 1..=C / E {
            arena.alloc(E).unwrap();
            assert_eq!(arena.remaining(), C - n * E);
        }
        assert_eq!(arena.block_count(), 1);
    }

    #[test]
    fn test_full_block_appends_new_block() {
        let mut arena = Arena::with_capacity(C);
        for _ in 0..C / E {
            arena.alloc(E).unwrap();
        }

        let slice = arena.alloc(E).unwrap();
        assert_eq!(arena.block_count(), 2);
        assert_eq!(slice.block(), 1);
        assert_eq!(slice.offset(), 0);
        assert_eq!(arena.block_capacity(1), Some(DEFAULT_BLOCK_SIZE.max(E)));
        assert_eq!(arena.remaining(), DEFAULT_BLOCK_SIZE - E);
    }

    #[test]
    fn test_growth_preserves_earlier_contents() {
        let mut arena = Arena::with_capacity(C);
        let mut slices = Vec::new();
        for n in 0..C / E {
            let slice = arena.alloc(E).unwrap();
            arena.bytes_mut(slice).unwrap().fill(n as u8);
            slices.push(slice);
        }

        let extra = arena.alloc(E).unwrap();
        arena.bytes_mut(extra).unwrap().fill(0xAB);

        for (n, slice) in slices.iter().enumerate() {
            assert!(arena.bytes(*slice).unwrap().iter().all(|b| *b == n as u8));
        }
        assert!(arena.bytes(extra).unwrap().iter().all(|b| *b == 0xAB));
    }

    #[test]
    fn test_oversized_request_gets_dedicated_block() {
        let mut arena = Arena::with_sizes(64, 256);
        let slice = arena.alloc(1000).unwrap();
        assert_eq!(slice.block(), 1);
        assert_eq!(arena.block_capacity(1), Some(1008));
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn test_allocations_are_aligned() {
        let mut arena = Arena::new();
        let a = arena.alloc(1).unwrap();
        let b = arena.alloc(17).unwrap();
        let c = arena.alloc(3).unwrap();
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 16);
        assert_eq!(c.offset(), 48);
        assert_eq!(b.len(), 17);
    }

    #[test]
    fn test_scope_rollback_within_block() {
        let mut arena = Arena::with_capacity(C);
        arena.alloc(32).unwrap();
        let before = arena.block_used(0).unwrap();

        let scope = arena.begin_scope();
        arena.alloc(100).unwrap();
        arena.alloc(7).unwrap();
        assert!(arena.block_used(0).unwrap() > before);
        arena.end_scope(scope);

        assert_eq!(arena.block_used(0), Some(before));
        assert_eq!(arena.block_count(), 1);
    }

    #[test]
    fn test_scope_rollback_across_blocks() {
        let mut arena = Arena::with_capacity(C);
        arena.alloc(E).unwrap();

        let scope = arena.begin_scope();
        assert_eq!(scope.origin_block_index(), 0);
        assert_eq!(scope.origin_offset(), E);

        arena.alloc(C - E).unwrap();
        arena.alloc(E).unwrap();
        arena.alloc(E).unwrap();
        assert_eq!(arena.block_count(), 2);

        arena.end_scope(scope);

        assert_eq!(arena.block_count(), 2);
        assert_eq!(arena.block_used(0), Some(E));
        assert_eq!(arena.block_used(1), Some(0));
    }

    #[test]
    fn test_nested_scopes() {
        let mut arena = Arena::with_capacity(C);
        let outer = arena.begin_scope();
        arena.alloc(64).unwrap();

        let inner = arena.begin_scope();
        arena.alloc(128).unwrap();
        arena.end_scope(inner);
        assert_eq!(arena.block_used(0), Some(64));

        arena.end_scope(outer);
        assert_eq!(arena.block_used(0), Some(0));
    }

    #[test]
    fn test_reused_memory_is_zeroed() {
        let mut arena = Arena::with_capacity(C);
        let scope = arena.begin_scope();
        let dirty = arena.alloc(E).unwrap();
        arena.bytes_mut(dirty).unwrap().fill(0xFF);
        arena.end_scope(scope);

        let fresh = arena.alloc(E).unwrap();
        assert_eq!(fresh.offset(), dirty.offset());
        assert!(arena.bytes(fresh).unwrap().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_released_handle_does_not_resolve() {
        let mut arena = Arena::with_capacity(C);
        let kept = arena.alloc_str("kept").unwrap();

        let scope = arena.begin_scope();
        let temp = arena.alloc_str("temporary").unwrap();
        assert_eq!(arena.str(temp), Some("temporary"));
        arena.end_scope(scope);

        assert_eq!(arena.str(temp), None);
        assert_eq!(arena.str(kept), Some("kept"));
    }

    #[test]
    fn test_scoped_closure() {
        let mut arena = Arena::with_capacity(C);
        let len = arena.scoped(|arena| {
            let s = arena.alloc_str("hello").unwrap();
            arena.str(s).map(str::len)
        });
        assert_eq!(len, Some(5));
        assert_eq!(arena.block_used(0), Some(0));
    }

    #[test]
    fn test_reset_and_stats() {
        let mut arena = Arena::with_sizes(64, 64);
        arena.alloc(48).unwrap();
        arena.alloc(48).unwrap();

        let stats = arena.stats();
        assert_eq!(stats.blocks, 2);
        assert_eq!(stats.used, 96);
        assert_eq!(stats.capacity, 128);

        arena.reset();
        assert_eq!(arena.stats().used, 0);
        assert_eq!(arena.block_count(), 2);
    }

    #[test]
    fn test_allocation_failure_is_local() {
        let mut arena = Arena::with_capacity(C);

        let err = arena.alloc(usize::MAX / 2).unwrap_err();
        assert!(matches!(err, ArenaError::OutOfMemory { .. }));
        assert_eq!(arena.block_count(), 1);

        let slice = arena.alloc(E).unwrap();
        assert_eq!(slice.block(), 0);
        assert_eq!(slice.offset(), 0);
    }

    #[test]
    fn test_boundary_crossing_scopes_grow_the_chain() {
        // emptied earlier blocks are not revisited; each crossing appends one
        let mut arena = Arena::with_sizes(64, 64);
        for _ in 0..100 {
            arena.scoped(|arena| {
                arena.alloc(48).unwrap();
                arena.alloc(48).unwrap();
            });
        }

        assert_eq!(arena.block_count(), 101);
        assert_eq!(arena.stats().used, 0);
    }

    #[test]
    fn test_zero_sized_allocation() {
        let mut arena = Arena::with_capacity(C);
        let slice = arena.alloc(0).unwrap();
        assert!(slice.is_empty());
        assert_eq!(arena.remaining(), C);
        assert_eq!(arena.bytes(slice), Some(&[][..]));
    }
}
