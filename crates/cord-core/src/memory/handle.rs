//! Opaque handles into arena memory

/// A region of arena memory.
///
/// Handles are plain values; resolving one goes through the [`crate::Arena`]
/// that produced it. A handle whose region was released by a scope rollback
/// resolves to `None` once the region lies beyond the block's bump offset, and
/// may observe reused bytes if the region was handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaSlice {
    pub(crate) block: usize,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl ArenaSlice {
    /// Index of the block holding this region
    #[inline]
    pub fn block(&self) -> usize {
        self.block
    }

    /// Byte offset of the region inside its block
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Requested length in bytes (before alignment)
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A UTF-8 string copied into arena memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaStr(pub(crate) ArenaSlice);

impl ArenaStr {
    /// The underlying byte region
    #[inline]
    pub fn as_slice(&self) -> ArenaSlice {
        self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }
}
