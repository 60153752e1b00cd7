//! Arena-optional allocation
//!
//! Code that sometimes runs with an arena and sometimes without can go
//! through these helpers: with an arena the bytes come from it, without one
//! they are an ordinary owned `Vec<u8>`.

use std::ops::{Deref, DerefMut};

use super::Arena;

/// Bytes from an arena, or owned bytes when no arena was supplied.
#[derive(Debug)]
pub enum Span<'a> {
    Arena(&'a mut [u8]),
    Owned(Vec<u8>),
}

impl Span<'_> {
    /// True when the bytes live inside an arena.
    pub fn is_arena(&self) -> bool {
        matches!(self, Span::Arena(_))
    }

    /// Detach from the arena, copying if needed.
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            Span::Arena(bytes) => bytes.to_vec(),
            Span::Owned(bytes) => bytes,
        }
    }
}

impl Deref for Span<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Span::Arena(bytes) => bytes,
            Span::Owned(bytes) => bytes,
        }
    }
}

impl DerefMut for Span<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            Span::Arena(bytes) => bytes,
            Span::Owned(bytes) => bytes,
        }
    }
}

/// `size` zeroed bytes from `arena`, or a fresh owned buffer.
pub fn allocate(arena: Option<&Arena>, size: usize) -> Span<'_> {
    match arena {
        Some(arena) => Span::Arena(arena.allocate(size)),
        None => Span::Owned(vec![0; size]),
    }
}

/// Duplicate `src` into `arena`, or into a fresh owned buffer.
pub fn copy<'a>(arena: Option<&'a Arena>, src: &[u8]) -> Span<'a> {
    match arena {
        Some(arena) => Span::Arena(arena.copy(src)),
        None => Span::Owned(src.to_vec()),
    }
}

/// Unregister `arena` if there is one.
pub fn release(arena: Option<&Arena>) {
    if let Some(arena) = arena {
        arena.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_without_arena_is_owned() {
        let span = copy(None, b"hello");
        assert!(!span.is_arena());
        assert_eq!(&*span, b"hello");
    }

    #[test]
    fn copy_with_arena_lands_in_arena() {
        let arena = Arena::new(64);
        let span = copy(Some(&*arena), b"hello");
        assert!(span.is_arena());
        assert_eq!(&*span, b"hello");
        assert_eq!(arena.size(), 5);
    }

    #[test]
    fn allocate_without_arena_is_zeroed() {
        let mut span = allocate(None, 16);
        assert_eq!(span.len(), 16);
        assert!(span.iter().all(|&b| b == 0));
        span[0] = 7;
        assert_eq!(span.into_vec()[0], 7);
    }

    #[test]
    fn release_none_is_noop() {
        release(None);
    }
}
