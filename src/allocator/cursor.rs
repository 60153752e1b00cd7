//! Packed position cursor
//!
//! Layout of the 64-bit word:
//! - high 32 bits: index of the buffer being filled
//! - low 32 bits: byte offset of the next free byte in that buffer
//!
//! Both halves advance together through a single `fetch_add`, so concurrent
//! reservations never need a lock.

use std::sync::atomic::{AtomicU64, Ordering};

const OFFSET_BITS: u32 = 32;
const OFFSET_MASK: u64 = 0xFFFF_FFFF;

/// Combine a buffer index and a byte offset into one word.
#[inline(always)]
pub const fn pack(buffer_index: usize, offset: usize) -> u64 {
    ((buffer_index as u64) << OFFSET_BITS) | (offset as u64 & OFFSET_MASK)
}

/// Split a packed word into `(buffer_index, offset)`.
#[inline(always)]
pub const fn unpack(pos: u64) -> (usize, usize) {
    ((pos >> OFFSET_BITS) as usize, (pos & OFFSET_MASK) as usize)
}

/// Atomic packed cursor shared by every allocating thread.
pub struct Cursor {
    pos: AtomicU64,
}

impl Cursor {
    #[inline]
    pub const fn new() -> Self {
        Self { pos: AtomicU64::new(0) }
    }

    /// Reserve `size` bytes and return the position just past the
    /// reservation. The reservation may overrun the current buffer; the
    /// caller checks.
    #[inline(always)]
    pub fn advance(&self, size: usize) -> (usize, usize) {
        let size = size as u64;
        unpack(self.pos.fetch_add(size, Ordering::AcqRel).wrapping_add(size))
    }

    #[inline]
    pub fn load(&self) -> (usize, usize) {
        unpack(self.pos.load(Ordering::Acquire))
    }

    /// Point the cursor at the start of `buffer_index`.
    #[inline]
    pub fn move_to(&self, buffer_index: usize) {
        self.pos.store(pack(buffer_index, 0), Ordering::Release);
    }

    #[inline]
    pub fn rewind(&self) {
        self.move_to(0);
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
