//! Persistence layer for Pocket Foreman.
//!
//! Local state is small: the baseline structure snapshot. It is written with
//! atomic file operations (write to a temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use foreman_core::{Baseline, BaselineStore};
//! use foreman_persistence::FileBaselineStore;
//!
//! let store = FileBaselineStore::new("/home/user/.pocket-foreman/state/structure_cache.json");
//! store.save(&Baseline::new("Project", vec!["Building".into()])).unwrap();
//! let baseline = store.load().unwrap();
//! ```

pub mod atomic;
pub mod baseline_store;
pub mod error;

pub use atomic::{atomic_write, atomic_write_json, read_json_optional};
pub use baseline_store::FileBaselineStore;
pub use error::{PersistenceError, Result};
