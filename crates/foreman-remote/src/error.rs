//! Error types for remote service clients.

use thiserror::Error;

use foreman_core::CoreError;

/// Errors returned by the Notion, Cloudinary and local mirror clients.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection failure, timeout or other transport problem.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// The requested page or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input rejected before sending.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The response body didn't have the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Whether retrying the same request may succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Status { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

impl From<RemoteError> for CoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(what) => CoreError::NotFound(what),
            RemoteError::Validation(msg) | RemoteError::Config(msg) => CoreError::Validation(msg),
            RemoteError::Status { code, body } if (400..500).contains(&code) && code != 429 => {
                CoreError::Validation(format!("HTTP {code}: {body}"))
            }
            RemoteError::Io(e) => CoreError::Io(e),
            other => CoreError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> RemoteError {
        RemoteError::Status {
            code,
            body: String::new(),
        }
    }

    #[test]
    fn test_retriable_statuses() {
        for code in [429, 500, 502, 503, 504] {
            assert!(status(code).is_retriable(), "{code} should be retriable");
        }
        for code in [400, 401, 403, 404, 409, 501] {
            assert!(!status(code).is_retriable(), "{code} should not be retriable");
        }
        assert!(!RemoteError::NotFound("page".into()).is_retriable());
    }

    #[test]
    fn test_core_error_mapping() {
        assert!(matches!(
            CoreError::from(RemoteError::NotFound("x".into())),
            CoreError::NotFound(_)
        ));
        assert!(matches!(CoreError::from(status(400)), CoreError::Validation(_)));
        assert!(matches!(CoreError::from(status(503)), CoreError::Transport(_)));
        assert!(matches!(CoreError::from(status(429)), CoreError::Transport(_)));
        assert!(matches!(
            CoreError::from(RemoteError::Parse("no id".into())),
            CoreError::Transport(_)
        ));
    }
}
