//! In-memory stores shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use foreman_core::{AssetStore, Baseline, BaselineStore, CoreError, FolderOutcome, RecordStore};
use foreman_models::{ExternalLink, JournalEntry, PageId, TaskIdentifier, TaskRecord, TaskStatus};

#[derive(Default)]
pub struct MemoryTasks {
    pub tasks: Mutex<Vec<TaskRecord>>,
    pub journal: Mutex<Vec<JournalEntry>>,
    pub offline: bool,
}

impl MemoryTasks {
    pub fn with_codes(codes: &[&str]) -> Self {
        let store = Self::default();
        for (i, code) in codes.iter().enumerate() {
            let mut task = TaskRecord::new(TaskIdentifier::from_code(code), format!("task {i}"));
            task.page_id = Some(PageId::from_string(format!("page-{i}")));
            store.tasks.lock().unwrap().push(task);
        }
        store
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn check(&self) -> foreman_core::Result<()> {
        if self.offline {
            Err(CoreError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }

    pub fn task(&self, code: &str) -> TaskRecord {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.identifier.render() == code)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl RecordStore for MemoryTasks {
    async fn recent_tasks(&self, limit: usize) -> foreman_core::Result<Vec<TaskRecord>> {
        self.check()?;
        Ok(self.tasks.lock().unwrap().iter().rev().take(limit).cloned().collect())
    }

    async fn find_task(&self, code: &str) -> foreman_core::Result<Option<TaskRecord>> {
        self.check()?;
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.identifier.render() == code)
            .cloned())
    }

    async fn create_task(&self, task: &TaskRecord) -> foreman_core::Result<PageId> {
        self.check()?;
        let mut tasks = self.tasks.lock().unwrap();
        let page = PageId::from_string(format!("page-{}", tasks.len()));
        let mut stored = task.clone();
        stored.page_id = Some(page.clone());
        tasks.push(stored);
        Ok(page)
    }

    async fn update_status(&self, page: &PageId, status: TaskStatus) -> foreman_core::Result<()> {
        self.check()?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.page_id.as_ref() == Some(page))
            .ok_or_else(|| CoreError::NotFound(page.to_string()))?;
        task.status = status;
        Ok(())
    }

    async fn append_attachment(&self, page: &PageId, link: &ExternalLink) -> foreman_core::Result<usize> {
        self.check()?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.page_id.as_ref() == Some(page))
            .ok_or_else(|| CoreError::NotFound(page.to_string()))?;
        task.attachments.push(link.clone());
        Ok(task.attachments.len())
    }

    async fn create_journal_entry(&self, entry: &JournalEntry) -> foreman_core::Result<PageId> {
        self.check()?;
        let mut journal = self.journal.lock().unwrap();
        journal.push(entry.clone());
        Ok(PageId::from_string(format!("journal-{}", journal.len())))
    }
}

#[derive(Default)]
pub struct MemoryUploads {
    pub uploads: Mutex<Vec<(String, String, usize)>>,
}

#[async_trait]
impl AssetStore for MemoryUploads {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_folder(&self, _path: &str) -> foreman_core::Result<FolderOutcome> {
        Ok(FolderOutcome::Created)
    }

    async fn upload_image(&self, bytes: Vec<u8>, folder: &str, name: &str) -> foreman_core::Result<String> {
        self.uploads
            .lock()
            .unwrap()
            .push((folder.to_string(), name.to_string(), bytes.len()));
        Ok(format!("https://cdn.example/{folder}/{name}.jpg"))
    }
}

#[derive(Default)]
pub struct MemoryBaseline {
    pub inner: Mutex<Baseline>,
}

impl MemoryBaseline {
    pub fn with_paths(paths: &[&str]) -> Self {
        Self {
            inner: Mutex::new(Baseline::new("Project", paths.iter().map(|p| p.to_string()).collect())),
        }
    }
}

impl BaselineStore for MemoryBaseline {
    fn load(&self) -> foreman_core::Result<Baseline> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn save(&self, baseline: &Baseline) -> foreman_core::Result<()> {
        *self.inner.lock().unwrap() = baseline.clone();
        Ok(())
    }
}
