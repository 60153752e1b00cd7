//! Region allocator - bump allocation over a fixed table of growing buffers
//!
//! Design: Three-layer architecture:
//! 1. Packed atomic cursor (fast path, lock-free)
//! 2. Buffer growth (slow path, one mutex per arena, amortized cost)
//! 3. System memory (one zeroed block per populated slot)
//!
//! Spans are never freed individually. The whole arena goes away when the
//! last `Arc<Arena>` is dropped.

mod align;
mod buffer;
mod cursor;
mod growth;
mod log2;
mod span;


pub use log2::{initial_buffer_size, log2};
pub use span::{allocate, copy, release, Span};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{Mutex, RwLock};
use rand::Rng;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::logging::{log_allocation_failure, log_arena_created, log_arena_released, log_arena_reset};
use crate::registry;
use buffer::Buffer;
use cursor::Cursor;

/// Largest single allocation an arena will serve (1 GiB).
pub const MAX_ALLOC: usize = 1 << 30;

/// Number of buffer slots per arena.
pub const MAX_BUFFERS: usize = 32;

/// First buffer size when no size hint is given.
pub const DEFAULT_SIZE: usize = 512;

/// Alignment guaranteed by [`Arena::allocate_aligned`].
pub const NODE_ALIGN: usize = std::mem::size_of::<u64>();

/// Reference counter. The top 16 bits are random per process.
static NEXT_REFERENCE: Lazy<AtomicU64> = Lazy::new(|| {
    let prefix: u64 = rand::thread_rng().gen_range(0..1u64 << 16);
    AtomicU64::new(prefix << 48)
});

#[inline]
fn next_reference() -> u64 {
    NEXT_REFERENCE.fetch_add(1, Ordering::Relaxed) + 1
}

/// Concurrent region allocator
///
/// Allocation takes `&self` and is lock-free unless the current buffer is
/// full. Every arena is registered in the process-wide registry on creation
/// and can be found again with [`crate::arena_from`] until it is released
/// or dropped.
pub struct Arena {
    reference: u64,
    tag: RwLock<String>,
    cursor: Cursor,
    buffers: [OnceCell<Buffer>; MAX_BUFFERS],
    grow_lock: Mutex<()>,
}

impl Arena {
    /// Create and register an arena whose first buffer holds at least
    /// `size_hint` bytes (0 means [`DEFAULT_SIZE`]).
    pub fn new(size_hint: usize) -> Arc<Self> {
        Self::with_config(ArenaConfig::default().with_size_hint(size_hint))
    }

    /// Create and register a tagged arena.
    pub fn with_tag(size_hint: usize, tag: impl Into<String>) -> Arc<Self> {
        Self::with_config(ArenaConfig::default().with_size_hint(size_hint).with_tag(tag))
    }

    pub fn with_config(config: ArenaConfig) -> Arc<Self> {
        let first = initial_buffer_size(config.size_hint);
        let arena = Self {
            reference: next_reference(),
            tag: RwLock::new(config.tag.unwrap_or_default()),
            cursor: Cursor::new(),
            buffers: std::array::from_fn(|_| OnceCell::new()),
            grow_lock: Mutex::new(()),
        };
        arena.buffers[0].get_or_init(|| Buffer::new(first));

        let arena = Arc::new(arena);
        registry::register(&arena);
        log_arena_created(arena.reference, &arena.tag.read(), first);
        arena
    }

    /// Process-unique identifier, usable with [`crate::arena_from`].
    #[inline]
    pub fn reference(&self) -> u64 {
        self.reference
    }

    pub fn tag(&self) -> String {
        self.tag.read().clone()
    }

    pub fn set_tag(&self, tag: impl Into<String>) {
        *self.tag.write() = tag.into();
    }

    /// Largest request accepted by a single allocation.
    #[inline]
    pub const fn max_alloc(&self) -> usize {
        MAX_ALLOC
    }

    /// Allocate `size` bytes.
    ///
    /// The bytes are zero the first time a region is handed out; after
    /// [`Arena::reset`] they hold whatever was written before.
    ///
    /// # Panics
    ///
    /// Panics if `size > MAX_ALLOC` or all buffer slots are used up.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate(&self, size: usize) -> &mut [u8] {
        self.try_allocate(size).unwrap_or_else(|err| self.fatal(err))
    }

    /// Checked variant of [`Arena::allocate`].
    #[allow(clippy::mut_from_ref)]
    pub fn try_allocate(&self, size: usize) -> Result<&mut [u8], ArenaError> {
        if size > MAX_ALLOC {
            return Err(ArenaError::AllocationTooLarge { requested: size, max: MAX_ALLOC });
        }
        if size == 0 {
            return Ok(Default::default());
        }

        loop {
            let (index, end) = self.cursor.advance(size);
            match self.buffers.get(index).and_then(OnceCell::get) {
                Some(buffer) if end >= size && end <= buffer.len() => {
                    // Safety: the fetch-add reserved [end - size, end) for
                    // this caller alone, and the buffer outlives `&self`.
                    return Ok(unsafe { buffer.span(end - size, size) });
                }
                _ => self.grow(index, size)?,
            }
        }
    }

    /// Copy `src` into freshly allocated arena bytes.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Arena::allocate`].
    #[allow(clippy::mut_from_ref)]
    pub fn copy(&self, src: &[u8]) -> &mut [u8] {
        let out = self.allocate(src.len());
        out.copy_from_slice(src);
        out
    }

    /// Rewind the cursor to the start of the first buffer, keeping every
    /// buffer for reuse.
    ///
    /// # Safety
    ///
    /// No span returned by this arena before the call may be used after it.
    /// Later allocations hand the same bytes out again.
    pub unsafe fn reset(&self) {
        self.cursor.rewind();
        log_arena_reset(self.reference);
    }

    /// Remove this arena from the process-wide registry. Idempotent.
    ///
    /// The memory itself is freed when the last `Arc<Arena>` is dropped.
    pub fn release(&self) {
        if registry::unregister(self.reference) {
            log_arena_released(self.reference, self.allocated());
        }
    }

    /// Bytes handed out so far, including the unused tails of buffers the
    /// cursor has moved past.
    pub fn size(&self) -> usize {
        let (index, offset) = self.cursor.load();
        let passed: usize = self.buffers[..index.min(MAX_BUFFERS)]
            .iter()
            .filter_map(OnceCell::get)
            .map(Buffer::len)
            .sum();
        let current = self
            .buffers
            .get(index)
            .and_then(OnceCell::get)
            .map_or(0, Buffer::len);
        passed + offset.min(current)
    }

    /// Total capacity of all populated buffers.
    pub fn allocated(&self) -> usize {
        self.populated().map(Buffer::len).sum()
    }

    /// Number of populated buffer slots.
    pub fn buffer_count(&self) -> usize {
        self.populated().count()
    }

    /// Lengths of the populated buffers, in slot order.
    pub fn buffer_sizes(&self) -> Vec<usize> {
        self.populated().map(Buffer::len).collect()
    }

    /// Point-in-time snapshot for monitoring and debugging.
    pub fn stats(&self) -> ArenaStats {
        let (buffer_index, offset) = self.cursor.load();
        ArenaStats {
            reference: self.reference,
            size: self.size(),
            allocated: self.allocated(),
            buffers: self.buffer_count(),
            buffer_index,
            offset,
        }
    }

    fn populated(&self) -> impl Iterator<Item = &Buffer> {
        self.buffers.iter().map_while(OnceCell::get)
    }

    #[cold]
    fn fatal(&self, err: ArenaError) -> ! {
        log_allocation_failure(self.reference, &err);
        panic!("{}", err)
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        registry::unregister(self.reference);
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("reference", &format_args!("{:x}", self.reference))
            .field("tag", &*self.tag.read())
            .field("stats", &self.stats())
            .finish()
    }
}

impl fmt::Display for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arena: {:x}", self.reference)?;
        let mut cumulative = 0;
        for (index, buffer) in self.populated().enumerate() {
            cumulative += buffer.len();
            writeln!(f, "idx: {} len: {} cum: {}", index, buffer.len(), cumulative)?;
        }
        let (buffer_index, offset) = self.cursor.load();
        writeln!(f, "bi: {} pi: {}", buffer_index, offset)?;
        writeln!(f, "Size: {}", self.size())
    }
}

/// Arena statistics for monitoring and debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub reference: u64,
    pub size: usize,
    pub allocated: usize,
    pub buffers: usize,
    pub buffer_index: usize,
    pub offset: usize,
}
