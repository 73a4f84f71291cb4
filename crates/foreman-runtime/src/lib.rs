//! Structure sync runtime for Pocket Foreman.
//!
//! - `OutlineWatcher` polls the outline file and runs detection once edits
//!   settle
//! - `SyncRuntime` owns the watcher task, its shutdown signal and the event
//!   channel the bot subscribes to
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use foreman_runtime::{SyncRuntime, WatchEvent, WatcherConfig};
//!
//! let mut runtime = SyncRuntime::new(service, WatcherConfig::default());
//! let mut events = runtime.subscribe();
//! runtime.start()?;
//!
//! while let Ok(event) = events.recv().await {
//!     if let WatchEvent::ChangeDetected(change) = event {
//!         println!("change {} awaits confirmation", change.id);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod runtime;
pub mod watcher;


pub use config::WatcherConfig;
pub use error::{Result, RuntimeError};
pub use event::WatchEvent;
pub use runtime::SyncRuntime;
pub use watcher::{check_and_publish, check_outline, OutlineWatcher};
