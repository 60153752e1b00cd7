//! Backing buffers - raw memory owned by an arena slot
//!
//! Each buffer is a single zeroed heap block. It never moves or resizes, so
//! spans carved out of it stay valid for as long as the buffer lives.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;

use super::NODE_ALIGN;

/// One contiguous, fixed-size block of arena memory.
pub struct Buffer {
    start: NonNull<u8>,
    layout: Layout,
}

// Safety: the buffer owns its block exclusively. Concurrent access goes
// through disjoint spans handed out by the cursor.
unsafe impl Send for Buffer {}
unsafe impl Sync for Buffer {}

impl Buffer {
    /// Allocate a zeroed buffer of `size` bytes (at least one).
    ///
    /// Aborts through `handle_alloc_error` if the system allocator fails.
    pub fn new(size: usize) -> Self {
        let layout = match Layout::from_size_align(size.max(1), NODE_ALIGN) {
            Ok(layout) => layout,
            Err(_) => panic!("invalid arena buffer size: {}", size),
        };

        let ptr = unsafe { alloc_zeroed(layout) };
        let Some(start) = NonNull::new(ptr) else {
            handle_alloc_error(layout);
        };

        Self { start, layout }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Mutable view of `[offset, offset + len)`.
    ///
    /// # Safety
    ///
    /// The range must lie inside the buffer and must not overlap any other
    /// live view of this buffer.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn span(&self, offset: usize, len: usize) -> &mut [u8] {
        debug_assert!(offset + len <= self.len(), "span out of bounds");
        std::slice::from_raw_parts_mut(self.start.as_ptr().add(offset), len)
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            dealloc(self.start.as_ptr(), self.layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_zeroed_and_aligned() {
        let buffer = Buffer::new(4096);
        assert_eq!(buffer.len(), 4096);

        let all = unsafe { buffer.span(0, 4096) };
        assert!(all.iter().all(|&b| b == 0));
        assert_eq!(all.as_ptr() as usize % NODE_ALIGN, 0);
    }

    #[test]
    fn span_writes_are_visible() {
        let buffer = Buffer::new(64);
        unsafe {
            buffer.span(8, 4).copy_from_slice(&[1, 2, 3, 4]);
            assert_eq!(buffer.span(8, 4), &[1, 2, 3, 4]);
            assert_eq!(buffer.span(0, 8), &[0; 8]);
        }
    }
}
