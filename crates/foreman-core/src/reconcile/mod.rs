//! Confirmation workflow for structure changes.
//!
//! The outline file is compared with the baseline snapshot. A non-empty
//! difference becomes a [`PendingChange`] that does nothing until an operator
//! confirms it by id. Confirmation creates the added folders on every asset
//! store and then replaces the baseline. Removed paths are reported but never
//! deleted anywhere.
//!
//! Only the latest detection is live: a new one orphans its predecessor, as
//! does an outline that is back in line with the baseline. Decisions on
//! orphaned, resolved or unknown ids resolve as [`Resolution::Stale`].

mod types;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use foreman_models::ChangeId;

use crate::error::{CoreError, Result};
use crate::outline::{parse_outline, StructureDiff, StructureSnapshot};
use crate::store::{AssetStore, Baseline, BaselineStore, FolderOutcome};

pub use self::types::{
    ApplyReport, ChangeState, Detection, PendingChange, Resolution, Transition, WorkflowState,
};

struct Entry {
    change: PendingChange,
    state: ChangeState,
}

impl Entry {
    fn transition(&mut self, transition: Transition) -> Result<()> {
        match self.state.on(transition) {
            Some(next) => {
                self.state = next;
                Ok(())
            }
            None => Err(CoreError::Validation(format!(
                "change {} cannot {:?} from {:?}",
                self.change.id, transition, self.state
            ))),
        }
    }
}

struct Ledger {
    next_id: ChangeId,
    pending: HashMap<ChangeId, Entry>,
}

/// Owns the pending-change map and the stores an apply touches.
pub struct ReconcileService {
    root: String,
    baseline: Arc<dyn BaselineStore>,
    assets: Vec<Arc<dyn AssetStore>>,
    ledger: Mutex<Ledger>,
}

impl ReconcileService {
    pub fn new(
        root: impl Into<String>,
        baseline: Arc<dyn BaselineStore>,
        assets: Vec<Arc<dyn AssetStore>>,
    ) -> Self {
        Self {
            root: root.into(),
            baseline,
            assets,
            ledger: Mutex::new(Ledger {
                next_id: ChangeId::FIRST,
                pending: HashMap::new(),
            }),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// The baseline snapshot currently on disk.
    pub fn baseline_snapshot(&self) -> Result<StructureSnapshot> {
        Ok(StructureSnapshot::from_paths(self.baseline.load()?.paths))
    }

    /// Compare `outline` with the baseline, opening a pending change if they
    /// differ.
    pub async fn detect(&self, outline: &str) -> Result<Detection> {
        let mut ledger = self.ledger.lock().await;
        let old = self.baseline_snapshot()?;
        let new = parse_outline(outline);
        let diff = StructureDiff::compute(&old, &new);

        for entry in ledger.pending.values_mut() {
            entry.transition(Transition::Supersede)?;
            debug!(change_id = %entry.change.id, "Pending change orphaned");
        }
        ledger.pending.clear();

        if diff.is_empty() {
            debug!(paths = new.len(), "Outline matches baseline");
            return Ok(Detection::Unchanged);
        }

        let id = ledger.next_id;
        ledger.next_id = id.next();

        let change = PendingChange {
            id,
            root: self.root.clone(),
            diff,
            snapshot: new,
            detected_at: Utc::now(),
        };
        info!(
            change_id = %id,
            added = change.diff.added.len(),
            removed = change.diff.removed.len(),
            "Structure change detected"
        );
        ledger.pending.insert(
            id,
            Entry {
                change: change.clone(),
                state: ChangeState::Detected,
            },
        );

        Ok(Detection::Detected(change))
    }

    /// Apply the change `id`.
    ///
    /// On failure the change stays pending and can be confirmed again.
    ///
    /// The ledger lock is held across the remote calls, so `detect`, `cancel`
    /// and `is_pending` wait until the apply finishes and see its outcome. A
    /// change is never applied twice or cancelled halfway through.
    pub async fn confirm(&self, id: ChangeId) -> Result<Resolution> {
        let mut ledger = self.ledger.lock().await;
        let Some(entry) = ledger.pending.get_mut(&id) else {
            debug!(change_id = %id, "Confirmation for stale change");
            return Ok(Resolution::Stale(id));
        };

        match self.apply(&entry.change).await {
            Ok(report) => {
                entry.transition(Transition::Confirm)?;
                let change = entry.change.clone();
                ledger.pending.remove(&id);
                info!(
                    change_id = %id,
                    created = report.created,
                    existing = report.existing,
                    "Structure change applied"
                );
                Ok(Resolution::Applied { change, report })
            }
            Err(e) => {
                entry.transition(Transition::ApplyFailed)?;
                warn!(change_id = %id, error = %e, "Applying structure change failed");
                Err(e)
            }
        }
    }

    /// Drop the change `id` without touching anything.
    pub async fn cancel(&self, id: ChangeId) -> Result<Resolution> {
        let mut ledger = self.ledger.lock().await;
        let Some(mut entry) = ledger.pending.remove(&id) else {
            debug!(change_id = %id, "Cancellation for stale change");
            return Ok(Resolution::Stale(id));
        };
        entry.transition(Transition::Cancel)?;
        info!(change_id = %id, "Structure change cancelled");
        Ok(Resolution::Cancelled(entry.change))
    }

    /// Whether `id` still awaits a decision.
    pub async fn is_pending(&self, id: ChangeId) -> bool {
        self.ledger.lock().await.pending.contains_key(&id)
    }

    pub async fn state(&self) -> WorkflowState {
        let ledger = self.ledger.lock().await;
        ledger
            .pending
            .keys()
            .max()
            .map_or(WorkflowState::Idle, |id| WorkflowState::Detected(*id))
    }

    async fn apply(&self, change: &PendingChange) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        for path in &change.diff.added {
            for store in &self.assets {
                match store.create_folder(path).await? {
                    FolderOutcome::Created => report.created += 1,
                    FolderOutcome::AlreadyExists => {
                        debug!(store = store.name(), path = %path, "Folder already exists");
                        report.existing += 1;
                    }
                }
            }
        }

        let baseline = Baseline::new(&change.root, change.snapshot.paths().to_vec());
        self.baseline.save(&baseline)?;
        report.total_paths = baseline.paths.len();

        Ok(report)
    }
}
