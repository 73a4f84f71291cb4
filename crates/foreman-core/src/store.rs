//! Traits for the external stores behind the bot.
//!
//! - [`RecordStore`]: the task database and photo journal (Notion).
//! - [`AssetStore`]: folder-based media storage (Cloudinary, a local mirror).
//! - [`BaselineStore`]: the last applied structure snapshot.
//!
//! Implementations map their own wire formats onto the typed models, so
//! nothing above this layer touches raw JSON.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use foreman_models::{ExternalLink, JournalEntry, PageId, TaskRecord, TaskStatus};

use crate::error::Result;

/// Task database operations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Most recently edited tasks, newest first, at most `limit` of them.
    ///
    /// Rows that can't be mapped onto a [`TaskRecord`] are skipped.
    async fn recent_tasks(&self, limit: usize) -> Result<Vec<TaskRecord>>;

    /// Find a task whose identifier equals `code` exactly.
    async fn find_task(&self, code: &str) -> Result<Option<TaskRecord>>;

    /// Create a task and return its page id.
    async fn create_task(&self, task: &TaskRecord) -> Result<PageId>;

    /// Change the status of an existing task.
    async fn update_status(&self, page: &PageId, status: TaskStatus) -> Result<()>;

    /// Append a link to a task's attachment list, keeping what is already
    /// there. Returns the new number of attachments.
    async fn append_attachment(&self, page: &PageId, link: &ExternalLink) -> Result<usize>;

    /// Create a photo journal row.
    async fn create_journal_entry(&self, entry: &JournalEntry) -> Result<PageId>;
}

/// Outcome of creating a folder on an asset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderOutcome {
    Created,
    AlreadyExists,
}

/// Folder-based media storage.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Create `path` (slash-separated, relative to the store root).
    ///
    /// An existing folder is reported as [`FolderOutcome::AlreadyExists`],
    /// never as an error.
    async fn create_folder(&self, path: &str) -> Result<FolderOutcome>;

    /// Upload an image into `folder` under `name`, returning its public URL.
    async fn upload_image(&self, bytes: Vec<u8>, folder: &str, name: &str) -> Result<String>;
}

/// The structure snapshot last applied to the asset stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// Root folder the paths are relative to.
    #[serde(default)]
    pub root: String,
    /// Materialized paths in outline order.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl Baseline {
    pub fn new(root: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            root: root.into(),
            paths,
        }
    }
}

/// Persistence for the baseline snapshot.
pub trait BaselineStore: Send + Sync {
    /// Load the baseline. A missing baseline is empty, not an error.
    fn load(&self) -> Result<Baseline>;

    /// Replace the baseline.
    fn save(&self, baseline: &Baseline) -> Result<()>;
}
