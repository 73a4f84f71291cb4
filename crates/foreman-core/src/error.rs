//! Error types shared by the store traits and the reconciliation workflow.

use thiserror::Error;

/// Errors surfaced by core operations and by the external stores behind them.
///
/// The variants follow the failure classes the handlers report on:
/// connectivity problems, rejected input, missing records and local storage.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Connectivity failure or server error after retries were exhausted.
    #[error("remote service unavailable: {0}")]
    Transport(String),

    /// Input rejected before or by the remote service.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Local persistence failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
