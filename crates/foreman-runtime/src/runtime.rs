//! Structure sync runtime: owns the watcher task and its shutdown signal.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use foreman_core::{Detection, ReconcileService};

use crate::config::WatcherConfig;
use crate::error::{Result, RuntimeError};
use crate::event::WatchEvent;
use crate::watcher::{check_and_publish, OutlineWatcher};

const EVENT_CAPACITY: usize = 16;

/// Runs the outline watcher in the background.
pub struct SyncRuntime {
    service: Arc<ReconcileService>,
    config: WatcherConfig,
    events: broadcast::Sender<WatchEvent>,
    watcher_handle: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SyncRuntime {
    pub fn new(service: Arc<ReconcileService>, config: WatcherConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            service,
            config,
            events,
            watcher_handle: None,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Receive watcher events, including those from [`check_now`](Self::check_now).
    pub fn subscribe(&self) -> broadcast::Receiver<WatchEvent> {
        self.events.subscribe()
    }

    pub fn service(&self) -> Arc<ReconcileService> {
        Arc::clone(&self.service)
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.watcher_handle.is_some()
    }

    /// Check the outline immediately, publishing a detected change.
    pub async fn check_now(&self) -> Result<Detection> {
        check_and_publish(&self.service, &self.config.outline_path, &self.events).await
    }

    /// Spawn the watcher. It runs a startup check first.
    pub fn start(&mut self) -> Result<()> {
        if self.watcher_handle.is_some() {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!(path = %self.config.outline_path.display(), "Starting structure watcher");
        let mut watcher = OutlineWatcher::new(
            Arc::clone(&self.service),
            self.config.clone(),
            self.events.clone(),
            self.shutdown_rx.clone(),
        );
        self.watcher_handle = Some(tokio::spawn(async move {
            watcher.run().await;
        }));
        Ok(())
    }

    /// Stop the watcher and wait for it to finish.
    pub async fn shutdown(&mut self) -> Result<()> {
        let handle = self.watcher_handle.take().ok_or(RuntimeError::NotStarted)?;

        self.shutdown_tx
            .send(true)
            .map_err(|e| RuntimeError::Shutdown(format!("failed to send shutdown signal: {}", e)))?;

        debug!("Waiting for watcher to stop");
        handle
            .await
            .map_err(|e| RuntimeError::Shutdown(format!("watcher task panicked: {}", e)))?;

        info!("Structure watcher stopped");
        Ok(())
    }
}

impl Drop for SyncRuntime {
    fn drop(&mut self) {
        if self.watcher_handle.is_some() {
            let _ = self.shutdown_tx.send(true);
        }
    }
}
