//! Type definitions for structure reconciliation.

use chrono::{DateTime, Utc};

use foreman_models::ChangeId;

use crate::outline::{StructureDiff, StructureSnapshot};

/// Lifecycle state of a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeState {
    /// Waiting for the operator.
    Detected,
    /// Folders created and baseline replaced.
    Applied,
    /// Rejected by the operator; nothing touched.
    Cancelled,
    /// Replaced by a newer detection, or by the outline matching the
    /// baseline again, before it was resolved.
    Orphaned,
}

/// Events that move a change between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Confirm,
    Cancel,
    Supersede,
    ApplyFailed,
}

impl ChangeState {
    /// The state reached by `transition`, or `None` if it isn't allowed.
    ///
    /// | from       | event        | to         |
    /// |------------|--------------|------------|
    /// | Detected   | Confirm      | Applied    |
    /// | Detected   | Cancel       | Cancelled  |
    /// | Detected   | Supersede    | Orphaned   |
    /// | Detected   | ApplyFailed  | Detected   |
    ///
    /// Terminal states accept nothing.
    pub fn on(self, transition: Transition) -> Option<ChangeState> {
        match (self, transition) {
            (ChangeState::Detected, Transition::Confirm) => Some(ChangeState::Applied),
            (ChangeState::Detected, Transition::Cancel) => Some(ChangeState::Cancelled),
            (ChangeState::Detected, Transition::Supersede) => Some(ChangeState::Orphaned),
            (ChangeState::Detected, Transition::ApplyFailed) => Some(ChangeState::Detected),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ChangeState::Detected)
    }
}

/// A structure change awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub id: ChangeId,
    /// Asset root the paths are relative to.
    pub root: String,
    pub diff: StructureDiff,
    /// Snapshot that becomes the baseline once applied.
    pub snapshot: StructureSnapshot,
    pub detected_at: DateTime<Utc>,
}

/// Result of comparing the outline with the baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Unchanged,
    Detected(PendingChange),
}

/// What an apply did, summed over all asset stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Folders newly created.
    pub created: usize,
    /// Folders that were already there.
    pub existing: usize,
    /// Paths in the new baseline.
    pub total_paths: usize,
}

/// Outcome of an operator decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied {
        change: PendingChange,
        report: ApplyReport,
    },
    Cancelled(PendingChange),
    /// The id is unknown, already resolved or superseded. Nothing was done.
    Stale(ChangeId),
}

/// Coarse state of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Detected(ChangeId),
}
