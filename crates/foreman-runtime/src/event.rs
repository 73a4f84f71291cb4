//! Watcher events.

use foreman_core::PendingChange;

/// Events emitted by the outline watcher.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// The outline differs from the baseline; confirmation is needed.
    ChangeDetected(PendingChange),
    /// A detection attempt failed. The watcher keeps running.
    DetectionFailed {
        /// Error message.
        error: String,
    },
}
