//! Generation settings that are not part of the persisted settings

use std::time::Duration;

/// Time after which a generation request is abandoned
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Separator between the strings of one request
pub const DEFAULT_SEPARATOR: &str = "\n";

/// Configuration for a [`Generator`](crate::Generator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of strings to generate per request
    pub count: usize,

    /// Seed of the random source, or `None` for a fresh seed per request
    pub seed: Option<u64>,

    /// Time after which a request fails
    pub timeout: Duration,

    /// Separator used when joining the generated strings
    pub separator: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 1,
            seed: None,
            timeout: DEFAULT_TIMEOUT,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Set the number of strings per request
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Use a fixed seed, making output reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the separator
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.count, 1);
        assert_eq!(config.seed, None);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.separator, "\n");
    }

    #[test]
    fn test_builders() {
        let config = GeneratorConfig::default()
            .with_count(3)
            .with_seed(42)
            .with_timeout(Duration::from_millis(10))
            .with_separator(", ");
        assert_eq!(config.count, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.timeout, Duration::from_millis(10));
        assert_eq!(config.separator, ", ");
    }
}
