//! Foreman Core - task identifier and structure reconciliation logic.
//!
//! - **deadline**: loose deadline text to calendar dates
//! - **split**: task code / display name splitting
//! - **counter**: next sequential identifier from recent tasks
//! - **outline**: indented outline parsing, snapshot diffing, navigation
//! - **reconcile**: operator-confirmed structure changes
//! - **status**: status alias normalisation
//! - **links**: attachment URL helpers
//! - **store**: traits for the task database, asset stores and baseline
//! - **config**: shared paths

pub mod config;
pub mod counter;
pub mod deadline;
pub mod error;
pub mod links;
pub mod outline;
pub mod reconcile;
pub mod split;
pub mod status;
pub mod store;

pub use config::{
    cache_dir, config_dir, ensure_all_dirs, env_file, logs_dir, runtime_state_dir, state_dir,
    structure_cache_file, structure_file,
};
pub use counter::{next_identifier, resolve_next_identifier, COUNTER_SAMPLE_SIZE};
pub use deadline::{format_deadline, parse_deadline, parse_deadline_on};
pub use error::{CoreError, Result};
pub use links::{link_name_from_url, sanitize_url};
pub use outline::{leaf_name, parent_of, parse_outline, OutlineIndex, StructureDiff, StructureSnapshot};
pub use reconcile::{
    ApplyReport, ChangeState, Detection, PendingChange, ReconcileService, Resolution, Transition,
    WorkflowState,
};
pub use split::{split_title, split_title_at, SplitTitle};
pub use status::{allowed_statuses, normalize_status, parse_status};
pub use store::{AssetStore, Baseline, BaselineStore, FolderOutcome, RecordStore};
