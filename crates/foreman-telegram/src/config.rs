//! Bot configuration read from the environment.

use std::path::PathBuf;

use teloxide::types::ChatId;

use foreman_remote::{CloudinaryConfig, PropertyNames};

use crate::error::{Result, TelegramError};

/// Settings the bot needs at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub notion_token: String,
    /// Task database.
    pub tasks_db: String,
    /// Photo journal database; the task database when unset.
    pub journal_db: Option<String>,
    /// Chat that receives structure confirmation requests.
    pub admin_chat: Option<ChatId>,
    pub cloudinary: Option<CloudinaryConfig>,
    /// Root of the local folder mirror.
    pub mirror_root: Option<PathBuf>,
    /// Watched outline file.
    pub structure_file: PathBuf,
    pub properties: PropertyNames,
}

impl BotConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            var(key).ok_or_else(|| TelegramError::Config(format!("{key} is not set")))
        };

        let telegram_token = var("TELEGRAM_BOT_TOKEN").ok_or(TelegramError::NoToken)?;
        let admin_chat = match var("FOREMAN_ADMIN_CHAT_ID") {
            Some(raw) => Some(ChatId(raw.parse::<i64>().map_err(|_| {
                TelegramError::Config(format!("FOREMAN_ADMIN_CHAT_ID is not a chat id: {raw}"))
            })?)),
            None => None,
        };

        Ok(Self {
            telegram_token,
            notion_token: required("NOTION_TOKEN")?,
            tasks_db: required("NOTION_DATABASE_ID")?,
            journal_db: var("NOTION_JOURNAL_DATABASE_ID"),
            admin_chat,
            cloudinary: CloudinaryConfig::from_env(),
            mirror_root: var(foreman_remote::local::ONEDRIVE_ROOT_ENV).map(PathBuf::from),
            structure_file: foreman_core::structure_file(),
            properties: PropertyNames::from_env(),
        })
    }

    /// Override the watched outline file.
    pub fn with_structure_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.structure_file = path.into();
        self
    }
}
