//! Base-2 logarithms for buffer sizing
//!
//! Small values come from a table built at compile time; anything above
//! 1024 is derived by shifting.

use super::{DEFAULT_SIZE, MAX_ALLOC};

const TABLE_LEN: usize = 1025;

/// floor(log2(i)) for 1 <= i <= 1024. Index 0 is unused.
static LOG2_TABLE: [u8; TABLE_LEN] = build_table();

const fn build_table() -> [u8; TABLE_LEN] {
    let mut table = [0u8; TABLE_LEN];
    let mut i = 2;
    while i < TABLE_LEN {
        table[i] = table[i / 2] + 1;
        i += 1;
    }
    table
}

/// floor(log2(n)); returns 0 for 0 and 1.
#[inline]
pub fn log2(n: usize) -> u32 {
    if n < TABLE_LEN {
        return LOG2_TABLE[n] as u32;
    }
    let mut pow = 10;
    let mut n = n >> 10;
    while n > 1 {
        n >>= 1;
        pow += 1;
    }
    pow
}

/// Size of the first backing buffer for a given hint.
///
/// A hint that is already a power of two is used as is, anything else is
/// bumped to the next power of two. Zero means "no preference" and yields
/// `DEFAULT_SIZE`. The result never exceeds `MAX_ALLOC`, since byte offsets
/// within a buffer must fit the cursor's low 32 bits.
pub fn initial_buffer_size(size_hint: usize) -> usize {
    let hint = if size_hint == 0 { DEFAULT_SIZE } else { size_hint.min(MAX_ALLOC) };

    let mut l2 = log2(hint);
    if hint.count_ones() > 1 {
        l2 += 1;
    }
    1 << l2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_float_log2() {
        for n in 1..=4096usize {
            assert_eq!(log2(n), (n as f64).log2().floor() as u32, "n = {}", n);
        }
    }

    #[test]
    fn log2_above_table() {
        assert_eq!(log2(1025), 10);
        assert_eq!(log2(2048), 11);
        assert_eq!(log2(1 << 30), 30);
        assert_eq!(log2((1 << 30) + 1), 30);
    }

    #[test]
    fn power_of_two_hint_is_kept() {
        assert_eq!(initial_buffer_size(512), 512);
        assert_eq!(initial_buffer_size(1024), 1024);
        assert_eq!(initial_buffer_size(1 << 20), 1 << 20);
    }

    #[test]
    fn other_hints_round_up() {
        assert_eq!(initial_buffer_size(500), 512);
        assert_eq!(initial_buffer_size(100), 128);
        assert_eq!(initial_buffer_size(513), 1024);
        assert_eq!(initial_buffer_size(3), 4);
    }

    #[test]
    fn zero_hint_uses_default() {
        assert_eq!(initial_buffer_size(0), DEFAULT_SIZE);
    }

    #[test]
    fn huge_hint_is_clamped() {
        assert_eq!(initial_buffer_size(usize::MAX), MAX_ALLOC);
    }
}
