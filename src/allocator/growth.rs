//! Buffer growth - the serialized slow path
//!
//! Entered only when a reservation overruns the current buffer. Growth is
//! geometric (each new buffer at least doubles the previous one), so an
//! arena reaches any size in O(log n) growth steps.

use super::buffer::Buffer;
use super::{Arena, MAX_ALLOC, MAX_BUFFERS};
use crate::error::ArenaError;
use crate::logging::{log_buffer_grown, log_growth_race};

impl Arena {
    /// Make room for a `min_size` request that overran buffer `seen_index`.
    ///
    /// On return the cursor points at a buffer that can hold `min_size`
    /// bytes, or another thread already moved it on. Either way the caller
    /// retries the fast path.
    pub(super) fn grow(&self, seen_index: usize, min_size: usize) -> Result<(), ArenaError> {
        let _guard = self.grow_lock.lock();

        let (current_index, _) = self.cursor.load();
        if current_index != seen_index {
            log_growth_race(self.reference, seen_index, current_index);
            return Ok(());
        }

        let target = self.add_buffer_at(seen_index + 1, min_size)?;
        self.cursor.move_to(target);
        Ok(())
    }

    /// Return the first slot at or after `start` that is empty or already
    /// large enough, populating it if empty.
    fn add_buffer_at(&self, start: usize, min_size: usize) -> Result<usize, ArenaError> {
        let mut index = start;
        loop {
            let Some(slot) = self.buffers.get(index) else {
                return Err(ArenaError::BufferSlotsExhausted { slots: MAX_BUFFERS });
            };
            match slot.get() {
                None => break,
                Some(buffer) if buffer.len() >= min_size => return Ok(index),
                Some(_) => index += 1,
            }
        }

        // Slot 0 is populated at construction, so index > 0 here.
        let previous = self.buffers[index - 1].get().map_or(0, Buffer::len);
        let size = next_buffer_size(previous, min_size);

        self.buffers[index].get_or_init(|| Buffer::new(size));
        log_buffer_grown(self.reference, index, size);
        Ok(index)
    }
}

/// Twice the previous buffer, doubled until it holds `min_size`, capped at
/// `MAX_ALLOC`.
pub(super) fn next_buffer_size(previous: usize, min_size: usize) -> usize {
    let mut size = previous.max(1).saturating_mul(2);
    while size < min_size {
        size = size.saturating_mul(2);
    }
    size.min(MAX_ALLOC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_previous_buffer() {
        assert_eq!(next_buffer_size(512, 100), 1024);
        assert_eq!(next_buffer_size(1024, 1), 2048);
    }

    #[test]
    fn keeps_doubling_until_request_fits() {
        assert_eq!(next_buffer_size(512, 5000), 8192);
        assert_eq!(next_buffer_size(512, 8192), 8192);
    }

    #[test]
    fn clamped_to_max_alloc() {
        assert_eq!(next_buffer_size(MAX_ALLOC, 10), MAX_ALLOC);
        assert_eq!(next_buffer_size(1 << 29, MAX_ALLOC), MAX_ALLOC);
    }
}
