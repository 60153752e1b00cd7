//! Arena construction parameters

/// Settings for a new arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Requested size of the first buffer, rounded up to a power of two.
    /// Zero selects the default (512 bytes).
    pub size_hint: usize,
    /// Label used to group arenas in reports.
    pub tag: Option<String>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            size_hint: crate::allocator::DEFAULT_SIZE,
            tag: None,
        }
    }
}

impl ArenaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // ARENA_SIZE_HINT: first buffer size in bytes
        if let Some(hint) = std::env::var("ARENA_SIZE_HINT")
            .ok()
            .and_then(|value| value.trim().parse().ok())
        {
            config.size_hint = hint;
        }

        // ARENA_TAG: report label
        if let Ok(tag) = std::env::var("ARENA_TAG") {
            if !tag.is_empty() {
                config.tag = Some(tag);
            }
        }

        config
    }

    pub fn with_size_hint(mut self, size_hint: usize) -> Self {
        self.size_hint = size_hint;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ArenaConfig::default();
        assert_eq!(config.size_hint, 512);
        assert!(config.tag.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ArenaConfig::new().with_size_hint(4096).with_tag("skiplist");
        assert_eq!(config.size_hint, 4096);
        assert_eq!(config.tag.as_deref(), Some("skiplist"));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("ARENA_SIZE_HINT", "2048");
        std::env::set_var("ARENA_TAG", "from-env");
        let config = ArenaConfig::from_env();
        std::env::remove_var("ARENA_SIZE_HINT");
        std::env::remove_var("ARENA_TAG");

        assert_eq!(config.size_hint, 2048);
        assert_eq!(config.tag.as_deref(), Some("from-env"));
    }
}
