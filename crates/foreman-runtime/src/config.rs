//! Watcher configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the outline watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Outline file to watch.
    pub outline_path: PathBuf,
    /// How often the file is checked for changes.
    pub poll_interval: Duration,
    /// Quiet period after the last change before detection runs.
    pub debounce: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            outline_path: foreman_core::structure_file(),
            poll_interval: Duration::from_secs(2),
            debounce: Duration::from_millis(1500),
        }
    }
}

impl WatcherConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the outline file.
    pub fn with_outline_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.outline_path = path.into();
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatcherConfig::default();

        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.debounce, Duration::from_millis(1500));
    }

    #[test]
    fn test_config_builder() {
        let config = WatcherConfig::new()
            .with_outline_path("/tmp/structure.txt")
            .with_poll_interval(Duration::from_millis(100))
            .with_debounce(Duration::from_millis(50));

        assert_eq!(config.outline_path, PathBuf::from("/tmp/structure.txt"));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.debounce, Duration::from_millis(50));
    }
}
