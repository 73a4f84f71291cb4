//! Error types for the Telegram bot.

use thiserror::Error;

use foreman_core::CoreError;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    NoToken,

    /// A required setting is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Input rejected before any remote call.
    #[error("{0}")]
    Validation(String),

    /// No task with the given identifier.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// No asset store is configured for photo uploads.
    #[error("Photo uploads are not configured. Set CLOUD_NAME/CLOUD_API_KEY/CLOUD_API_SECRET or ONEDRIVE_ROOT.")]
    NoPhotoStore,

    /// Downloading a file from Telegram failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// Error from the task/structure core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Structure watcher error.
    #[error("Sync error: {0}")]
    Sync(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

impl From<foreman_runtime::RuntimeError> for TelegramError {
    fn from(e: foreman_runtime::RuntimeError) -> Self {
        match e {
            foreman_runtime::RuntimeError::Core(core) => TelegramError::Core(core),
            other => TelegramError::Sync(other.to_string()),
        }
    }
}

impl From<foreman_remote::RemoteError> for TelegramError {
    fn from(e: foreman_remote::RemoteError) -> Self {
        TelegramError::Core(e.into())
    }
}

impl TelegramError {
    /// Text shown to the user who started the failed operation.
    pub fn user_message(&self) -> String {
        match self {
            TelegramError::Core(CoreError::Validation(msg)) | TelegramError::Validation(msg) => {
                format!("⚠️ {msg}")
            }
            TelegramError::Core(CoreError::NotFound(what)) => format!("🔍 Not found: {what}"),
            TelegramError::TaskNotFound(code) => format!("🔍 Task {code} not found."),
            TelegramError::Core(CoreError::Transport(_)) => {
                "❌ The remote service is not responding. Please try again later.".to_string()
            }
            other => format!("❌ Error: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_classes() {
        let validation = TelegramError::Core(CoreError::Validation("bad status".into()));
        assert_eq!(validation.user_message(), "⚠️ bad status");

        let missing = TelegramError::TaskNotFound("INTEL-034".into());
        assert!(missing.user_message().contains("INTEL-034"));

        let transport = TelegramError::Core(CoreError::Transport("timeout".into()));
        assert!(transport.user_message().contains("try again"));
        assert!(!transport.user_message().contains("timeout"));
    }

    #[test]
    fn test_runtime_core_error_unwrapped() {
        let err: TelegramError =
            foreman_runtime::RuntimeError::Core(CoreError::Storage("corrupt".into())).into();
        assert!(matches!(err, TelegramError::Core(CoreError::Storage(_))));
    }
}
