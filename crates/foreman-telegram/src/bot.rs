//! Main Telegram bot implementation.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use foreman_core::{AssetStore, ReconcileService};
use foreman_persistence::FileBaselineStore;
use foreman_remote::{CloudinaryStore, LocalMirrorStore, NotionClient, NotionTaskStore};
use foreman_runtime::{SyncRuntime, WatchEvent, WatcherConfig};

use crate::config::BotConfig;
use crate::error::{Result, TelegramError};
use crate::handlers::{handle_callback, handle_command, handle_message, handle_photo_message, Command};
use crate::keyboards::{change_summary, sync_keyboard};
use crate::state::BotState;

/// The Telegram bot for Pocket Foreman.
pub struct ForemanBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<BotState>,
    /// Structure watcher.
    runtime: SyncRuntime,
}

impl ForemanBot {
    /// Wire the stores, the reconciliation service and the watcher.
    pub fn new(config: BotConfig, watcher: WatcherConfig) -> Result<Self> {
        let client = NotionClient::new(config.notion_token.clone())?;
        let records = NotionTaskStore::new(client, config.tasks_db.clone(), config.journal_db.clone())
            .with_properties(config.properties.clone());

        let mut assets: Vec<Arc<dyn AssetStore>> = Vec::new();
        let mut root = String::new();
        if let Some(cloud) = config.cloudinary.clone() {
            root = cloud.root.clone();
            assets.push(Arc::new(CloudinaryStore::new(cloud)?));
        }
        if let Some(mirror) = &config.mirror_root {
            assets.push(Arc::new(LocalMirrorStore::new(mirror)));
        }
        if assets.is_empty() {
            warn!("No asset store configured; structure changes only update the baseline");
        }
        let photos = assets.first().cloned();

        let baseline = Arc::new(FileBaselineStore::from_default_location());
        let service = Arc::new(ReconcileService::new(root, baseline, assets));
        let runtime = SyncRuntime::new(
            Arc::clone(&service),
            watcher.with_outline_path(config.structure_file.clone()),
        );

        let state = Arc::new(BotState::new(
            Arc::new(records),
            photos,
            service,
            config.structure_file.clone(),
            config.admin_chat,
        ));

        Ok(Self {
            bot: Bot::new(config.telegram_token),
            state,
            runtime,
        })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    pub fn state(&self) -> Arc<BotState> {
        Arc::clone(&self.state)
    }

    /// Run the bot in polling mode until Ctrl+C.
    ///
    /// With `watch` the outline watcher runs in the background; without it
    /// the outline is checked once at startup.
    pub async fn start_polling(&mut self, watch: bool) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let events = self.runtime.subscribe();
        let forward_bot = self.bot.clone();
        let forward_state = Arc::clone(&self.state);
        tokio::spawn(async move {
            forward_watch_events(forward_bot, forward_state, events).await;
        });

        if watch {
            self.runtime.start()?;
        } else if let Err(e) = self.runtime.check_now().await {
            warn!(error = %e, "Startup structure check failed");
        }

        let bot = self.bot.clone();
        let state_for_commands = Arc::clone(&self.state);
        let state_for_messages = Arc::clone(&self.state);
        let state_for_photos = Arc::clone(&self.state);
        let state_for_callbacks = Arc::clone(&self.state);

        let handler = dptree::entry()
            .branch(
                Update::filter_callback_query()
                    .endpoint(move |bot: Bot, q: teloxide::types::CallbackQuery| {
                        let state = Arc::clone(&state_for_callbacks);
                        async move { handle_callback(bot, q, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        msg.text().map(|t| t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(|bot: Bot, msg: Message| async move {
                        if let Some(text) = msg.text() {
                            info!(cmd = %text, "Unrecognized command");
                            bot.send_message(
                                msg.chat.id,
                                format!(
                                    "Unknown command: {}\n\nUse /help to see available commands.",
                                    text.split_whitespace().next().unwrap_or(text)
                                ),
                            )
                            .await?;
                        }
                        Ok(())
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.photo().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_photos);
                        debug!(chat_id = %msg.chat.id, "Photo received");
                        async move { handle_photo_message(bot, msg, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_messages);
                        debug!(chat_id = %msg.chat.id, "Text message received");
                        async move { handle_message(bot, msg, state).await }
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(bot, handler)
            .default_handler(|upd| async move {
                debug!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        if self.runtime.is_started() {
            self.runtime.shutdown().await?;
        }
        info!("Bot stopped");
        Ok(())
    }
}

/// Forward watcher events to the admin chat.
async fn forward_watch_events(
    bot: Bot,
    state: Arc<BotState>,
    mut events: broadcast::Receiver<WatchEvent>,
) {
    loop {
        match events.recv().await {
            Ok(WatchEvent::ChangeDetected(change)) => {
                let Some(admin) = state.admin_chat() else {
                    warn!(
                        change_id = %change.id,
                        "Structure change detected but FOREMAN_ADMIN_CHAT_ID is not set; use /sync"
                    );
                    continue;
                };
                match bot
                    .send_message(admin, change_summary(&change))
                    .reply_markup(sync_keyboard(change.id))
                    .await
                {
                    Ok(_) => info!(chat_id = %admin, change_id = %change.id, "Confirmation request sent"),
                    Err(e) => warn!(chat_id = %admin, error = %e, "Failed to send confirmation request"),
                }
            }
            Ok(WatchEvent::DetectionFailed { error }) => {
                warn!(error = %error, "Structure detection failed");
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Watcher events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!("Watch event forwarder stopped");
}
