//! Allocation error types

use std::fmt;

/// Conditions under which an arena refuses an allocation.
///
/// The panicking entry points (`allocate`, `allocate_aligned`, `copy`) treat
/// both variants as caller bugs. The `try_*` variants hand them back instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// A single request exceeded the per-allocation ceiling.
    AllocationTooLarge { requested: usize, max: usize },
    /// Every buffer slot is populated and none can hold the request.
    BufferSlotsExhausted { slots: usize },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationTooLarge { requested, max } => {
                write!(f, "Unable to allocate more than {} (requested {})", max, requested)
            }
            Self::BufferSlotsExhausted { slots } => {
                write!(f, "Arena can not allocate more than {} buffers", slots)
            }
        }
    }
}

impl std::error::Error for ArenaError {}
