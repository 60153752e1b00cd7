//! Region Arena - concurrent bump allocation for short-lived byte spans
//!
//! Many small allocations are carved out of a few large buffers. Nothing is
//! freed individually; an arena's memory goes away all at once when its
//! last handle is dropped.
//!
//! ```
//! use region_arena::{arena_from, Arena};
//!
//! let arena = Arena::with_tag(1024, "example");
//! let key = arena.copy(b"key");
//! assert_eq!(&*key, b"key");
//! assert_eq!(arena.size(), 3);
//!
//! let found = arena_from(arena.reference()).expect("registered");
//! assert!(std::sync::Arc::ptr_eq(&arena, &found));
//!
//! arena.release();
//! assert!(arena_from(arena.reference()).is_none());
//! ```

pub mod allocator;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;

// Re-export core types
pub use allocator::{Arena, ArenaStats, Span, DEFAULT_SIZE, MAX_ALLOC, MAX_BUFFERS, NODE_ALIGN};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use registry::{arena_from, report, report_all_arenas, write_report, TagUsage};
