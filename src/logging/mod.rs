//! Logging infrastructure - structured tracing for arena lifecycle events
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log level via environment
//! - Zero-cost when disabled (nothing here sits on the allocation fast path)
//! - Console or file output, human-readable or JSON

use once_cell::sync::OnceCell;
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::error::ArenaError;

pub use tracing::{debug, error, info, trace, warn};

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Enable file logging
    pub file_output: bool,
    /// Log file path (if file_output enabled)
    pub log_path: Option<String>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_output: false,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // ARENA_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("ARENA_LOG_LEVEL") {
            config.level = parse_level(&level_str);
        }

        // ARENA_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("ARENA_LOG_FILE") {
            config.file_output = true;
            config.log_path = Some(path);
        }

        // ARENA_LOG_JSON: enable JSON format
        config.json_format = std::env::var("ARENA_LOG_JSON").is_ok();

        // ARENA_LOG_SPANS: show span events
        config.show_spans = std::env::var("ARENA_LOG_SPANS").is_ok();

        config
    }

    /// Create high-performance config (minimal logging)
    pub fn performance() -> Self {
        Self {
            level: Level::ERROR,
            ..Self::default()
        }
    }

    /// Create debug config (verbose logging)
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            file_output: true,
            log_path: Some("region_arena.log".to_string()),
            json_format: false,
            show_spans: true,
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging with default configuration
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration
///
/// Only the first call installs a subscriber. If another subscriber is
/// already installed globally, that one stays in place.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "region_arena={}",
                config.level.as_str().to_lowercase()
            ))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let writer = match (config.file_output, config.log_path.as_deref()) {
            (true, Some(path)) => file_writer(path),
            _ => BoxMakeWriter::new(io::stdout),
        };

        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_target(true)
            .with_thread_ids(cfg!(debug_assertions))
            .with_line_number(cfg!(debug_assertions));

        let registry = tracing_subscriber::registry().with(env_filter);
        let _ = if config.json_format {
            registry.with(layer.json()).try_init()
        } else {
            registry.with(layer.compact()).try_init()
        };
    });
}

fn file_writer(path: &str) -> BoxMakeWriter {
    let path = Path::new(path);
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "region_arena.log".into());

    BoxMakeWriter::new(tracing_appender::rolling::never(directory, file_name))
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

/// Log arena creation
#[inline]
pub fn log_arena_created(reference: u64, tag: &str, initial_size: usize) {
    debug!(
        target: "arena",
        reference = format_args!("{:x}", reference),
        tag,
        initial_size,
        "arena created"
    );
}

/// Log a new backing buffer
#[inline]
pub fn log_buffer_grown(reference: u64, slot: usize, size: usize) {
    debug!(
        target: "arena",
        reference = format_args!("{:x}", reference),
        slot,
        size,
        "buffer added"
    );
}

/// Log a growth attempt that found the work already done
#[inline]
pub fn log_growth_race(reference: u64, seen_slot: usize, current_slot: usize) {
    trace!(
        target: "arena",
        reference = format_args!("{:x}", reference),
        seen_slot,
        current_slot,
        "arena already grown, retrying"
    );
}

#[inline]
pub fn log_arena_reset(reference: u64) {
    trace!(
        target: "arena",
        reference = format_args!("{:x}", reference),
        "arena reset"
    );
}

#[inline]
pub fn log_arena_released(reference: u64, allocated: usize) {
    debug!(
        target: "arena",
        reference = format_args!("{:x}", reference),
        allocated,
        "arena released"
    );
}

/// Log an allocation the arena refuses to serve
#[inline]
pub fn log_allocation_failure(reference: u64, err: &ArenaError) {
    error!(
        target: "arena",
        reference = format_args!("{:x}", reference),
        error = %err,
        "allocation failed"
    );
}

/// Log one line of the per-tag report
#[inline]
pub fn log_tag_usage(tag: &str, arenas: usize, allocated: usize) {
    info!(
        target: "registry",
        tag,
        arenas,
        allocated,
        "arena tag usage"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.file_output);

        let perf_config = LogConfig::performance();
        assert_eq!(perf_config.level, Level::ERROR);

        let debug_config = LogConfig::debug();
        assert_eq!(debug_config.level, Level::TRACE);
        assert!(debug_config.show_spans);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("bogus"), Level::INFO);
    }

    #[test]
    fn test_init_idempotent() {
        init_with_config(LogConfig::performance());
        init_with_config(LogConfig::performance()); // Should not panic
        assert!(is_initialized());
    }

    #[test]
    fn test_logging_functions() {
        // These should not panic
        log_arena_created(0xabc, "tag", 512);
        log_buffer_grown(0xabc, 1, 1024);
        log_growth_race(0xabc, 0, 1);
        log_arena_reset(0xabc);
        log_arena_released(0xabc, 1536);
        log_allocation_failure(0xabc, &ArenaError::BufferSlotsExhausted { slots: 32 });
        log_tag_usage("tag", 2, 1536);
    }
}
