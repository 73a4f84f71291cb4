//! Shared state for the Telegram bot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use teloxide::types::{ChatId, InlineKeyboardMarkup};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use foreman_core::{AssetStore, Detection, OutlineIndex, ReconcileService, RecordStore};
use foreman_runtime::check_outline;

use crate::error::{Result, TelegramError};
use crate::keyboards::navigation_keyboard;
use crate::registry::PathRegistry;
use crate::session::Conversation;

/// State shared by all handlers.
pub struct BotState {
    records: Arc<dyn RecordStore>,
    /// Store photos are uploaded to, if any.
    photos: Option<Arc<dyn AssetStore>>,
    sync: Arc<ReconcileService>,
    structure_file: PathBuf,
    admin_chat: Option<ChatId>,
    conversations: RwLock<HashMap<ChatId, Conversation>>,
    registry: Mutex<PathRegistry>,
}

impl BotState {
    pub fn new(
        records: Arc<dyn RecordStore>,
        photos: Option<Arc<dyn AssetStore>>,
        sync: Arc<ReconcileService>,
        structure_file: impl Into<PathBuf>,
        admin_chat: Option<ChatId>,
    ) -> Self {
        Self {
            records,
            photos,
            sync,
            structure_file: structure_file.into(),
            admin_chat,
            conversations: RwLock::new(HashMap::new()),
            registry: Mutex::new(PathRegistry::new()),
        }
    }

    pub fn records(&self) -> &dyn RecordStore {
        self.records.as_ref()
    }

    pub fn photo_store(&self) -> Result<&dyn AssetStore> {
        self.photos.as_deref().ok_or(TelegramError::NoPhotoStore)
    }

    pub fn sync_service(&self) -> &ReconcileService {
        &self.sync
    }

    pub fn structure_file(&self) -> &Path {
        &self.structure_file
    }

    pub fn admin_chat(&self) -> Option<ChatId> {
        self.admin_chat
    }

    /// Whether `chat` may resolve structure changes. Without a configured
    /// admin chat every chat may.
    pub fn is_admin(&self, chat: ChatId) -> bool {
        self.admin_chat.map_or(true, |admin| admin == chat)
    }

    /// Current conversation of `chat`.
    pub async fn conversation(&self, chat: ChatId) -> Conversation {
        self.conversations
            .read()
            .await
            .get(&chat)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the conversation of `chat`. `Idle` removes it.
    pub async fn set_conversation(&self, chat: ChatId, conversation: Conversation) {
        let mut conversations = self.conversations.write().await;
        if conversation.is_idle() {
            conversations.remove(&chat);
        } else {
            debug!(chat_id = %chat, state = ?conversation, "Conversation state changed");
            conversations.insert(chat, conversation);
        }
    }

    /// Drop any conversation of `chat`. Returns whether one was active.
    pub async fn clear_conversation(&self, chat: ChatId) -> bool {
        self.conversations.write().await.remove(&chat).is_some()
    }

    /// Navigation keyboard over the baseline structure below `path`.
    pub async fn navigation(&self, path: Option<&str>) -> Result<InlineKeyboardMarkup> {
        let snapshot = self.sync.baseline_snapshot()?;
        let index = OutlineIndex::new(&snapshot);
        let mut registry = self.registry.lock().await;
        Ok(navigation_keyboard(&index, &mut registry, path))
    }

    /// Path behind a navigation button.
    pub async fn resolve_path(&self, id: u32) -> Option<String> {
        self.registry.lock().await.path_for(id).map(str::to_string)
    }

    /// Top-level sections of the baseline structure.
    pub fn top_sections(&self) -> Result<Vec<String>> {
        let snapshot = self.sync.baseline_snapshot()?;
        Ok(OutlineIndex::new(&snapshot)
            .roots()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Compare the outline file with the baseline now.
    pub async fn check_structure(&self) -> Result<Detection> {
        Ok(check_outline(&self.sync, &self.structure_file).await?)
    }
}

#[cfg(test)]
mod tests {
    use foreman_core::BaselineStore;

    use super::*;
    use crate::testing::{MemoryBaseline, MemoryTasks, MemoryUploads};

    fn state(admin: Option<ChatId>, baseline: &[&str], outline: &Path) -> BotState {
        let baseline: Arc<dyn BaselineStore> = Arc::new(MemoryBaseline::with_paths(baseline));
        let service = Arc::new(ReconcileService::new("Project", baseline, Vec::new()));
        BotState::new(
            Arc::new(MemoryTasks::default()),
            Some(Arc::new(MemoryUploads::default())),
            service,
            outline,
            admin,
        )
    }

    #[tokio::test]
    async fn test_conversation_lifecycle() {
        let state = state(None, &[], Path::new("structure.txt"));
        let chat = ChatId(1);

        assert_eq!(state.conversation(chat).await, Conversation::Idle);
        state.set_conversation(chat, Conversation::AddName).await;
        assert_eq!(state.conversation(chat).await, Conversation::AddName);
        assert_eq!(state.conversation(ChatId(2)).await, Conversation::Idle);

        assert!(state.clear_conversation(chat).await);
        assert!(!state.clear_conversation(chat).await);
        assert_eq!(state.conversation(chat).await, Conversation::Idle);
    }

    #[tokio::test]
    async fn test_admin_check() {
        let open = state(None, &[], Path::new("structure.txt"));
        assert!(open.is_admin(ChatId(5)));

        let locked = state(Some(ChatId(7)), &[], Path::new("structure.txt"));
        assert!(locked.is_admin(ChatId(7)));
        assert!(!locked.is_admin(ChatId(5)));
    }

    #[tokio::test]
    async fn test_sections_and_navigation() {
        let state = state(None, &["B", "A", "A/A1"], Path::new("structure.txt"));

        assert_eq!(state.top_sections().unwrap(), vec!["A", "B"]);

        let markup = state.navigation(Some("A")).await.unwrap();
        assert_eq!(markup.inline_keyboard[0][0].text, "📄 A1");
        assert_eq!(state.resolve_path(0).await.as_deref(), Some("A/A1"));
        assert_eq!(state.resolve_path(99).await, None);
    }

    #[tokio::test]
    async fn test_check_structure_reads_outline() {
        let dir = tempfile::tempdir().unwrap();
        let outline = dir.path().join("structure.txt");
        std::fs::write(&outline, "Building/\n  Facades/\n").unwrap();
        let state = state(None, &[], &outline);

        match state.check_structure().await.unwrap() {
            Detection::Detected(change) => {
                assert_eq!(change.diff.added, vec!["Building", "Building/Facades"]);
                assert!(change.diff.removed.is_empty());
            }
            Detection::Unchanged => panic!("expected a change"),
        }
    }

    #[tokio::test]
    async fn test_photo_store_missing() {
        let baseline: Arc<dyn BaselineStore> = Arc::new(MemoryBaseline::default());
        let service = Arc::new(ReconcileService::new("", baseline, Vec::new()));
        let state = BotState::new(Arc::new(MemoryTasks::default()), None, service, "s.txt", None);
        assert!(matches!(state.photo_store(), Err(TelegramError::NoPhotoStore)));
    }
}
