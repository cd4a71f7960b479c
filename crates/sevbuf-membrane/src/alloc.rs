//! Allocation capability.
//!
//! A [`Block`] is a zero-initialised byte region with exactly one owner.
//! Blocks are handed out by an [`Allocator`] and consumed by
//! [`Allocator::release`], so the type system rules out a double release
//! and a block shared between two buffers.

use std::fmt;
use std::sync::Arc;

/// Exclusively owned, fixed-length byte region.
pub struct Block {
    bytes: Box<[u8]>,
}

impl Block {
    fn zeroed(bytes: Box<[u8]>) -> Self {
        Self { bytes }
    }

    /// Length of the region in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for a zero-length region. Allocators never produce one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Base address of the region. Stable for the block's lifetime and
    /// unique among live blocks.
    #[must_use]
    pub fn addr(&self) -> usize {
        self.bytes.as_ptr() as usize
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block").field("len", &self.len()).finish()
    }
}

/// Allocate/release capability consumed by buffers.
pub trait Allocator {
    /// Request a zeroed block of `size` bytes.
    ///
    /// Returns `None` when the request cannot be satisfied. A request for
    /// zero bytes always returns `None`.
    fn allocate(&self, size: usize) -> Option<Block>;

    /// Return a block obtained from this allocator.
    fn release(&self, block: Block);
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, size: usize) -> Option<Block> {
        (**self).allocate(size)
    }

    fn release(&self, block: Block) {
        (**self).release(block);
    }
}

impl<A: Allocator + ?Sized> Allocator for Arc<A> {
    fn allocate(&self, size: usize) -> Option<Block> {
        (**self).allocate(size)
    }

    fn release(&self, block: Block) {
        (**self).release(block);
    }
}

/// Process heap allocator.
///
/// Uses fallible reservation so that heap exhaustion and oversized requests
/// come back as `None` instead of aborting the process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Option<Block> {
        if size == 0 {
            return None;
        }
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(size).ok()?;
        bytes.resize(size, 0);
        Some(Block::zeroed(bytes.into_boxed_slice()))
    }

    fn release(&self, block: Block) {
        drop(block);
    }
}
