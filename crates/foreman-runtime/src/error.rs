//! Error types for the runtime crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The outline file couldn't be read.
    #[error("failed to read outline {path}: {source}")]
    Outline {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Detection failed in the reconciliation service.
    #[error(transparent)]
    Core(#[from] foreman_core::CoreError),

    /// Watcher not started.
    #[error("watcher not started")]
    NotStarted,

    /// Watcher already started.
    #[error("watcher already started")]
    AlreadyStarted,

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
