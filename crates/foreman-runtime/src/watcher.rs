//! Outline file watcher.
//!
//! Polls the outline file, and once its content has been stable for the
//! debounce window runs detection on the [`ReconcileService`]. Detected
//! changes are broadcast as [`WatchEvent`]s.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use foreman_core::{Detection, ReconcileService};

use crate::config::WatcherConfig;
use crate::error::{Result, RuntimeError};
use crate::event::WatchEvent;

/// Read the outline at `path` and compare it with the baseline.
pub async fn check_outline(service: &ReconcileService, path: &Path) -> Result<Detection> {
    let text = tokio::fs::read_to_string(path).await.map_err(|source| RuntimeError::Outline {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(service.detect(&text).await?)
}

/// Run [`check_outline`] and publish the outcome.
pub async fn check_and_publish(
    service: &ReconcileService,
    path: &Path,
    events: &broadcast::Sender<WatchEvent>,
) -> Result<Detection> {
    let result = check_outline(service, path).await;
    let event = match &result {
        Ok(Detection::Detected(change)) => WatchEvent::ChangeDetected(change.clone()),
        Ok(Detection::Unchanged) => return result,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Structure check failed");
            WatchEvent::DetectionFailed {
                error: e.to_string(),
            }
        }
    };
    if events.send(event).is_err() {
        debug!("No subscribers for watcher event");
    }
    result
}

async fn fingerprint(path: &Path) -> Option<u64> {
    let text = tokio::fs::read(path).await.ok()?;
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    Some(hasher.finish())
}

/// Watches the outline file until shutdown.
pub struct OutlineWatcher {
    service: Arc<ReconcileService>,
    config: WatcherConfig,
    events: broadcast::Sender<WatchEvent>,
    shutdown: watch::Receiver<bool>,
}

impl OutlineWatcher {
    pub fn new(
        service: Arc<ReconcileService>,
        config: WatcherConfig,
        events: broadcast::Sender<WatchEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            service,
            config,
            events,
            shutdown,
        }
    }

    /// Check once, then watch until the shutdown signal.
    pub async fn run(&mut self) {
        let path = self.config.outline_path.clone();
        let mut last = fingerprint(&path).await;

        info!(path = %path.display(), "Running startup structure check");
        let _ = check_and_publish(&self.service, &path, &self.events).await;

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut deadline: Option<Instant> = None;

        debug!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            debounce_ms = self.config.debounce.as_millis() as u64,
            "Starting outline watcher"
        );

        loop {
            let wake = deadline;
            let debounced = async move {
                match wake {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = ticker.tick() => {
                    let current = fingerprint(&path).await;
                    if current != last {
                        trace!(path = %path.display(), "Outline changed");
                        last = current;
                        deadline = Some(Instant::now() + self.config.debounce);
                    }
                }
                _ = debounced => {
                    deadline = None;
                    let _ = check_and_publish(&self.service, &path, &self.events).await;
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        debug!("Watcher received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("Outline watcher stopped");
    }
}
