//! Word-aligned allocation
//!
//! Over-reserves `NODE_ALIGN - 1` bytes and slices the span so it starts on
//! an aligned address. The pointer-to-integer arithmetic lives only here.

use super::{Arena, NODE_ALIGN};
use crate::error::ArenaError;

/// Align address upward to next multiple of alignment
///
/// Uses bit manipulation for branch-free execution:
/// - Add (align - 1) to round up
/// - Mask with !(align - 1) to align down
#[inline(always)]
pub(super) const fn align_up(addr: usize, align: usize) -> usize {
    (addr.wrapping_add(align).wrapping_sub(1)) & !align.wrapping_sub(1)
}

/// Slice `span` so it starts at the first `NODE_ALIGN` boundary and is
/// exactly `size` bytes long. `span` must carry `NODE_ALIGN - 1` bytes of
/// slack.
#[inline]
fn aligned_within(span: &mut [u8], size: usize) -> &mut [u8] {
    let addr = span.as_ptr() as usize;
    let start = align_up(addr, NODE_ALIGN) - addr;
    &mut span[start..start + size]
}

impl Arena {
    /// Allocate `size` bytes starting on an 8-byte boundary.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Arena::allocate`].
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_aligned(&self, size: usize) -> &mut [u8] {
        self.try_allocate_aligned(size)
            .unwrap_or_else(|err| self.fatal(err))
    }

    /// Checked variant of [`Arena::allocate_aligned`].
    #[allow(clippy::mut_from_ref)]
    pub fn try_allocate_aligned(&self, size: usize) -> Result<&mut [u8], ArenaError> {
        let padded = size.saturating_add(NODE_ALIGN - 1);
        let span = self.try_allocate(padded)?;
        Ok(aligned_within(span, size))
    }
}
