//! Process-wide arena registry - lookup by reference and per-tag reports
//!
//! Holds weak handles only, so registration never keeps an arena alive.
//! The registry lock is never held while an `Arc<Arena>` could be dropped:
//! dropping the last handle unregisters the arena, which takes this lock.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::allocator::Arena;
use crate::logging::log_tag_usage;

/// Global registry (single mutex, held only for map access)
static ARENAS: Lazy<Mutex<HashMap<u64, Weak<Arena>>>> =
    Lazy::new(|| Mutex::new(HashMap::with_capacity(64)));

pub(crate) fn register(arena: &Arc<Arena>) {
    ARENAS.lock().insert(arena.reference(), Arc::downgrade(arena));
}

/// Returns true if an entry was removed.
pub(crate) fn unregister(reference: u64) -> bool {
    ARENAS.lock().remove(&reference).is_some()
}

/// Find a live, unreleased arena by its reference.
pub fn arena_from(reference: u64) -> Option<Arc<Arena>> {
    let handle = ARENAS.lock().get(&reference).cloned()?;
    handle.upgrade()
}

/// Number of registry entries.
pub fn registered_count() -> usize {
    ARENAS.lock().len()
}

/// Capacity held by all arenas sharing one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUsage {
    pub tag: String,
    pub arenas: usize,
    pub allocated: usize,
}

/// Aggregate [`Arena::allocated`] per tag, sorted by tag.
pub fn report() -> Vec<TagUsage> {
    let handles: Vec<Weak<Arena>> = ARENAS.lock().values().cloned().collect();

    let mut totals: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for arena in handles.iter().filter_map(Weak::upgrade) {
        let entry = totals.entry(arena.tag()).or_default();
        entry.0 += 1;
        entry.1 += arena.allocated();
    }

    totals
        .into_iter()
        .map(|(tag, (arenas, allocated))| TagUsage { tag, arenas, allocated })
        .collect()
}

/// Write one `Arena Tag: <tag> Size: <bytes>` line per tag.
pub fn write_report<W: Write>(out: &mut W) -> io::Result<()> {
    write_usages(out, &report())
}

/// Log the per-tag summary and print it to stdout.
pub fn report_all_arenas() -> io::Result<()> {
    let usages = report();
    for usage in &usages {
        log_tag_usage(&usage.tag, usage.arenas, usage.allocated);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_usages(&mut out, &usages)?;
    out.flush()
}

fn write_usages<W: Write>(out: &mut W, usages: &[TagUsage]) -> io::Result<()> {
    for usage in usages {
        writeln!(out, "Arena Tag: {} Size: {}", usage.tag, format_bytes(usage.allocated))?;
    }
    Ok(())
}

/// IEC byte count: `512 B`, `1.5 KiB`, `64 MiB`.
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if value < 10.0 {
        format!("{:.1} {}", value, UNITS[unit])
    } else {
        format!("{:.0} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_same_instance() {
        let arena = Arena::new(64);
        let found = arena_from(arena.reference()).expect("registered");
        assert!(Arc::ptr_eq(&arena, &found));
    }

    #[test]
    fn release_removes_entry() {
        let arena = Arena::new(64);
        let reference = arena.reference();

        arena.release();
        assert!(arena_from(reference).is_none());

        // Idempotent
        arena.release();
        assert!(arena_from(reference).is_none());
    }

    #[test]
    fn drop_removes_entry() {
        let arena = Arena::new(64);
        let reference = arena.reference();
        drop(arena);
        assert!(arena_from(reference).is_none());
    }

    #[test]
    fn report_groups_by_tag() {
        let a = Arena::with_tag(512, "registry-test-report");
        let b = Arena::with_tag(1024, "registry-test-report");

        let usage = report()
            .into_iter()
            .find(|u| u.tag == "registry-test-report")
            .expect("tag present");
        assert_eq!(usage.arenas, 2);
        assert_eq!(usage.allocated, 512 + 1024);

        drop((a, b));
        assert!(report().iter().all(|u| u.tag != "registry-test-report"));
    }

    #[test]
    fn write_report_formats_lines() {
        let _arena = Arena::with_tag(2048, "registry-test-write");

        let mut out = Vec::new();
        write_report(&mut out).expect("write to vec");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Arena Tag: registry-test-write Size: 2.0 KiB"));
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KiB");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(64 * 1024 * 1024), "64 MiB");
        assert_eq!(format_bytes(1 << 30), "1.0 GiB");
    }
}
