//! Shared configuration paths for Pocket Foreman.
//!
//! All local data lives under `~/.pocket-foreman/`:
//!
//! ```text
//! ~/.pocket-foreman/
//! ├── config/       # .env.local with API tokens
//! ├── logs/         # Application logs
//! ├── cache/        # Temporary downloads
//! └── state/        # Baseline structure snapshot
//! ```
//!
//! # Environment Variables
//!
//! - `FOREMAN_STATE_DIR`: Override the base state directory
//! - `FOREMAN_CONFIG_DIR`: Override the config directory
//! - `FOREMAN_LOG_DIR`: Override the log directory
//! - `STRUCTURE_FILE`: Path of the watched outline file

use std::path::PathBuf;
use std::sync::OnceLock;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "FOREMAN_STATE_DIR";

/// Environment variable for custom config directory.
pub const CONFIG_DIR_ENV: &str = "FOREMAN_CONFIG_DIR";

/// Environment variable for custom log directory.
pub const LOG_DIR_ENV: &str = "FOREMAN_LOG_DIR";

/// Environment variable naming the outline file.
pub const STRUCTURE_FILE_ENV: &str = "STRUCTURE_FILE";

const DEFAULT_STATE_DIR: &str = ".pocket-foreman";
const DEFAULT_STRUCTURE_FILE: &str = "structure.txt";

const LOGS_SUBDIR: &str = "logs";
const CONFIG_SUBDIR: &str = "config";
const CACHE_SUBDIR: &str = "cache";
const STATE_SUBDIR: &str = "state";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the Pocket Foreman state directory.
///
/// Resolved once per process from:
/// 1. `FOREMAN_STATE_DIR` if set
/// 2. `~/.pocket-foreman` if a home directory is available
/// 3. `.pocket-foreman` in the current directory
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the logs directory.
pub fn logs_dir() -> PathBuf {
    std::env::var(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(LOGS_SUBDIR))
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(CONFIG_SUBDIR))
}

/// Get the cache directory.
pub fn cache_dir() -> PathBuf {
    state_dir().join(CACHE_SUBDIR)
}

/// Get the runtime state directory.
pub fn runtime_state_dir() -> PathBuf {
    state_dir().join(STATE_SUBDIR)
}

/// Get the baseline snapshot file path.
///
/// Holds the last applied structure as `{"root": ..., "paths": [...]}`.
pub fn structure_cache_file() -> PathBuf {
    runtime_state_dir().join("structure_cache.json")
}

/// Get the .env.local file path.
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Get the watched outline file.
///
/// Defaults to `structure.txt` in the working directory.
pub fn structure_file() -> PathBuf {
    std::env::var(STRUCTURE_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STRUCTURE_FILE))
}

/// Ensure the state directory and all subdirectories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(logs_dir())?;
    std::fs::create_dir_all(config_dir())?;
    std::fs::create_dir_all(cache_dir())?;
    std::fs::create_dir_all(runtime_state_dir())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables can't be isolated between parallel tests, so
    // these check file and directory names rather than full paths.

    #[test]
    fn test_state_dir_shape() {
        let dir = state_dir();
        assert!(dir.is_absolute() || dir.ends_with(".pocket-foreman"));
    }

    #[test]
    fn test_runtime_state_dir_name() {
        assert!(runtime_state_dir().ends_with("state"));
    }

    #[test]
    fn test_cache_dir_name() {
        assert!(cache_dir().ends_with("cache"));
    }

    #[test]
    fn test_structure_cache_file_name() {
        let file = structure_cache_file();
        assert!(file.ends_with("structure_cache.json"));
        assert!(file.parent().is_some_and(|p| p.ends_with("state")));
    }

    #[test]
    fn test_env_file_name() {
        assert!(env_file().ends_with(".env.local"));
    }
}
