//! Telegram bot interface for Pocket Foreman.
//!
//! Site staff log construction tasks into a Notion database and file photos
//! under the project structure from a Telegram chat. The bot also watches
//! the structure outline and asks the admin chat to confirm folder changes.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `NOTION_TOKEN`: Notion integration token
//! - `NOTION_DATABASE_ID`: Task database
//!
//! Optional:
//! - `NOTION_JOURNAL_DATABASE_ID`: Photo journal database (default: task database)
//! - `FOREMAN_ADMIN_CHAT_ID`: Chat that confirms structure changes
//! - `CLOUD_NAME`, `CLOUD_API_KEY`, `CLOUD_API_SECRET`, `CLOUD_ROOT`: Cloudinary
//! - `ONEDRIVE_ROOT`: Local folder mirror
//! - `STRUCTURE_FILE`: Outline file (default: `structure.txt`)
//! - `PROP_*`: Notion property name overrides
//!
//! # Example
//!
//! ```no_run
//! use foreman_runtime::WatcherConfig;
//! use foreman_telegram::{BotConfig, ForemanBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::from_env()?;
//!     let mut bot = ForemanBot::new(config, WatcherConfig::default())?;
//!     bot.start_polling(true).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/add` - Create a task (dialogue or one-line form)
//! - `/status` - Change a task status
//! - `/attach` - Attach a link to a task
//! - `/report` - Recent tasks
//! - `/photo` - File a photo under a section
//! - `/sections` - List top-level sections
//! - `/sync` - Check the structure outline (admin)
//! - `/cancel` - Leave the current dialogue

pub mod actions;
pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod keyboards;
pub mod registry;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use bot::ForemanBot;
pub use config::BotConfig;
pub use error::{Result, TelegramError};
pub use registry::PathRegistry;
pub use session::{Conversation, Outcome, Step, TaskDraft};
pub use state::BotState;
