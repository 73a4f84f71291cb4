//! Command, message and callback handlers for the Telegram bot.

use std::sync::Arc;

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineKeyboardMarkup, MessageId};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use foreman_core::{Detection, Resolution};
use foreman_models::{ChangeId, TaskRecord};

use crate::actions::{self, local_now};
use crate::error::{Result, TelegramError};
use crate::keyboards::{
    back_target, change_summary, source_keyboard, status_keyboard, sync_keyboard, CallbackAction,
};
use crate::session::{Advance, Conversation, Outcome, Step};
use crate::state::BotState;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Create a task: /add or /add <title> | <deadline> | <object> | <source>")]
    Add(String),

    #[command(description = "Change a task status: /status or /status <ID> <Status>")]
    Status(String),

    #[command(description = "Attach a link to a task: /attach <ID> <URL> [name]")]
    Attach(String),

    #[command(description = "Show the 10 most recently edited tasks")]
    Report,

    #[command(description = "File a photo under a section of the structure")]
    Photo,

    #[command(description = "List the top-level sections")]
    Sections,

    #[command(description = "Compare the structure file with the baseline (admin)")]
    Sync,

    #[command(description = "Cancel the current dialogue")]
    Cancel,
}

async fn reply_error(bot: &Bot, chat: ChatId, err: &TelegramError) -> ResponseResult<()> {
    warn!(chat_id = %chat, error = %err, "Operation failed");
    bot.send_message(chat, err.user_message()).await?;
    Ok(())
}

fn task_line(task: &TaskRecord) -> String {
    format!("{} — {} ({})", task.identifier, task.title, task.status)
}

/// Show the prompt for `conversation`, with its keyboard if it has one.
async fn send_prompt(
    bot: &Bot,
    chat: ChatId,
    state: &BotState,
    conversation: &Conversation,
) -> ResponseResult<()> {
    let keyboard: Option<InlineKeyboardMarkup> = match conversation {
        Conversation::AddSource { .. } => Some(source_keyboard()),
        Conversation::StatusValue { .. } => Some(status_keyboard()),
        Conversation::PhotoBrowse { path } => match state.navigation(path.as_deref()).await {
            Ok(markup) => Some(markup),
            Err(e) => return reply_error(bot, chat, &e).await,
        },
        _ => None,
    };

    let mut req = bot.send_message(chat, conversation.prompt());
    if let Some(kb) = keyboard {
        req = req.reply_markup(kb);
    }
    req.await?;
    Ok(())
}

/// Feed a step to the chat's conversation and act on the result.
async fn apply_step(bot: &Bot, chat: ChatId, state: &BotState, step: Step) -> ResponseResult<()> {
    let current = state.conversation(chat).await;
    if current.is_idle() {
        bot.send_message(chat, "Nothing in progress. Use /help to see the commands.")
            .await?;
        return Ok(());
    }

    match current.advance(step) {
        Advance::Next(next) => {
            state.set_conversation(chat, next.clone()).await;
            send_prompt(bot, chat, state, &next).await
        }
        Advance::Done(outcome) => {
            state.set_conversation(chat, Conversation::Idle).await;
            run_outcome(bot, chat, state, outcome).await
        }
        Advance::Rejected(kept) => {
            debug!(chat_id = %chat, state = ?kept, "Input does not fit the conversation");
            bot.send_message(chat, format!("That doesn't fit here. {}", kept.prompt()))
                .await?;
            Ok(())
        }
    }
}

async fn run_outcome(bot: &Bot, chat: ChatId, state: &BotState, outcome: Outcome) -> ResponseResult<()> {
    let result = match outcome {
        Outcome::CreateTask(draft) => actions::create_task(state.records(), draft, local_now())
            .await
            .map(|task| format!("✅ Task created: {}", task_line(&task))),
        Outcome::SetStatus { code, status } => actions::set_status(state.records(), &code, status)
            .await
            .map(|task| format!("✅ Status updated: {}", task_line(&task))),
        Outcome::RecordPhoto {
            path,
            file_id,
            comment,
        } => {
            bot.send_chat_action(chat, teloxide::types::ChatAction::UploadPhoto)
                .await?;
            record_photo(bot, state, &path, &file_id, comment).await
        }
    };

    match result {
        Ok(text) => {
            bot.send_message(chat, text).await?;
            Ok(())
        }
        Err(e) => reply_error(bot, chat, &e).await,
    }
}

async fn download_photo(bot: &Bot, file_id: &str) -> Result<Vec<u8>> {
    let file = bot
        .get_file(file_id.to_owned())
        .await
        .map_err(|e| TelegramError::Download(e.to_string()))?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes)
        .await
        .map_err(|e| TelegramError::Download(e.to_string()))?;
    debug!(file_id = %file_id, size = bytes.len(), "Photo downloaded");
    Ok(bytes)
}

async fn record_photo(
    bot: &Bot,
    state: &BotState,
    path: &str,
    file_id: &str,
    comment: Option<String>,
) -> Result<String> {
    let assets = state.photo_store()?;
    let bytes = download_photo(bot, file_id).await?;
    let entry = actions::record_photo(assets, state.records(), path, bytes, comment, local_now()).await?;
    Ok(format!("📸 Saved to {}\n{}", entry.section, entry.url))
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let welcome = format!(
        "Welcome to Pocket Foreman! 👷\n\n\
        <b>Tasks:</b>\n\
        - /add to create a task\n\
        - /status to change a status\n\
        - /attach to link a document\n\
        - /report for recent tasks\n\n\
        <b>Photos:</b>\n\
        - /photo to file a photo under a section\n\
        - /sections to list sections\n\n\
        <b>Status:</b>\n\
        - Photo uploads: {}\n\
        - Structure admin: {}\n\n\
        Type /help for all commands.",
        if state.photo_store().is_ok() { "✅ enabled" } else { "⚠️ not configured" },
        match state.admin_chat() {
            Some(admin) if admin == msg.chat.id => "✅ this chat",
            Some(_) => "another chat",
            None => "⚠️ any chat (set FOREMAN_ADMIN_CHAT_ID)",
        }
    );

    bot.send_message(msg.chat.id, welcome)
        .parse_mode(teloxide::types::ParseMode::Html)
        .await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Handle the /add command: one-line form or the dialogue.
pub async fn handle_add(bot: Bot, msg: Message, state: Arc<BotState>, args: String) -> ResponseResult<()> {
    let chat = msg.chat.id;
    if args.trim().is_empty() {
        let next = Conversation::AddName;
        state.set_conversation(chat, next.clone()).await;
        return send_prompt(&bot, chat, &state, &next).await;
    }

    let draft = match actions::parse_quick_add(&args) {
        Ok(draft) => draft,
        Err(e) => return reply_error(&bot, chat, &e).await,
    };
    state.clear_conversation(chat).await;
    run_outcome(&bot, chat, &state, Outcome::CreateTask(draft)).await
}

/// Handle the /status command: one-line form or the dialogue.
pub async fn handle_status(bot: Bot, msg: Message, state: Arc<BotState>, args: String) -> ResponseResult<()> {
    let chat = msg.chat.id;
    if args.trim().is_empty() {
        let next = Conversation::StatusCode;
        state.set_conversation(chat, next.clone()).await;
        return send_prompt(&bot, chat, &state, &next).await;
    }

    match actions::parse_status_args(&args) {
        Ok((code, status)) => {
            state.clear_conversation(chat).await;
            run_outcome(&bot, chat, &state, Outcome::SetStatus { code, status }).await
        }
        Err(e) => reply_error(&bot, chat, &e).await,
    }
}

/// Handle the /attach command.
pub async fn handle_attach(bot: Bot, msg: Message, state: Arc<BotState>, args: String) -> ResponseResult<()> {
    let chat = msg.chat.id;
    let result = match actions::parse_attach_args(&args) {
        Ok(request) => actions::attach_link(state.records(), &request)
            .await
            .map(|(task, count)| {
                format!(
                    "📎 Attached \"{}\" to {} ({} attachment(s))",
                    request.link.name, task.identifier, count
                )
            }),
        Err(e) => Err(e),
    };

    match result {
        Ok(text) => {
            bot.send_message(chat, text).await?;
            Ok(())
        }
        Err(e) => reply_error(&bot, chat, &e).await,
    }
}

/// Handle the /report command.
pub async fn handle_report(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    match actions::recent_report(state.records()).await {
        Ok(text) => {
            bot.send_message(msg.chat.id, text).await?;
            Ok(())
        }
        Err(e) => reply_error(&bot, msg.chat.id, &e).await,
    }
}

/// Handle the /photo command: open navigation at the top level.
pub async fn handle_photo(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let chat = msg.chat.id;
    if let Err(e) = state.photo_store() {
        return reply_error(&bot, chat, &e).await;
    }
    let next = Conversation::PhotoBrowse { path: None };
    state.set_conversation(chat, next.clone()).await;
    send_prompt(&bot, chat, &state, &next).await
}

/// Handle the /sections command.
pub async fn handle_sections(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let text = match state.top_sections() {
        Ok(sections) if sections.is_empty() => {
            "No sections yet. Apply a structure with /sync first.".to_string()
        }
        Ok(sections) => format!("Sections:\n{}", sections.join("\n")),
        Err(e) => return reply_error(&bot, msg.chat.id, &e).await,
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle the /sync command: detect now and ask for confirmation.
pub async fn handle_sync(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let chat = msg.chat.id;
    if !state.is_admin(chat) {
        bot.send_message(chat, "Only the admin chat can run /sync.").await?;
        return Ok(());
    }

    match state.check_structure().await {
        Ok(Detection::Unchanged) => {
            bot.send_message(chat, "Structure matches the baseline. Nothing to do.")
                .await?;
        }
        Ok(Detection::Detected(change)) => {
            bot.send_message(chat, change_summary(&change))
                .reply_markup(sync_keyboard(change.id))
                .await?;
        }
        Err(e) => return reply_error(&bot, chat, &e).await,
    }
    Ok(())
}

/// Handle the /cancel command.
pub async fn handle_cancel(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let text = if state.clear_conversation(msg.chat.id).await {
        "Cancelled."
    } else {
        "Nothing to cancel."
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle regular text messages: the next answer in a dialogue.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat = msg.chat.id;

    match state.conversation(chat).await.read_text(text) {
        Ok(step) => apply_step(&bot, chat, &state, step).await,
        Err(correction) => {
            bot.send_message(chat, correction).await?;
            Ok(())
        }
    }
}

/// Handle photo messages.
pub async fn handle_photo_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };
    let file_id = largest.file.id.to_string();
    apply_step(&bot, msg.chat.id, &state, Step::Photo(file_id)).await
}

async fn resolve_sync(
    bot: &Bot,
    chat: ChatId,
    message_id: MessageId,
    state: &BotState,
    action: CallbackAction,
    id: ChangeId,
) -> ResponseResult<()> {
    if !state.is_admin(chat) {
        bot.send_message(chat, "Only the admin chat can resolve structure changes.")
            .await?;
        return Ok(());
    }

    let service = state.sync_service();
    let result = match action {
        CallbackAction::ApplyChange(_) => service.confirm(id).await,
        _ => service.cancel(id).await,
    };

    match result {
        Ok(Resolution::Applied { change, report }) => {
            bot.edit_message_text(
                chat,
                message_id,
                format!(
                    "✅ Change #{} applied: {} folder(s) created, {} already existed. Baseline now has {} path(s).",
                    change.id, report.created, report.existing, report.total_paths
                ),
            )
            .await?;
        }
        Ok(Resolution::Cancelled(change)) => {
            bot.edit_message_text(
                chat,
                message_id,
                format!("✖️ Change #{} cancelled. Nothing was touched.", change.id),
            )
            .await?;
        }
        Ok(Resolution::Stale(id)) => {
            bot.edit_message_text(
                chat,
                message_id,
                format!("ℹ️ Change #{id} is no longer pending. No action taken."),
            )
            .await?;
        }
        Err(e) => {
            error!(change_id = %id, error = %e, "Structure change failed");
            bot.send_message(
                chat,
                format!("❌ Change #{id} failed: {e}\nIt is still pending; press Apply to retry."),
            )
            .await?;
        }
    }
    Ok(())
}

/// Handle inline button presses.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.regular_message() else {
        debug!("Callback without an accessible message");
        return Ok(());
    };
    let chat = message.chat.id;
    let Some(action) = q.data.as_deref().and_then(CallbackAction::decode) else {
        debug!(chat_id = %chat, data = ?q.data, "Unknown callback data");
        return Ok(());
    };
    info!(chat_id = %chat, action = ?action, "Callback received");

    let step = match action {
        CallbackAction::ApplyChange(id) | CallbackAction::CancelChange(id) => {
            return resolve_sync(&bot, chat, message.id, &state, action, id).await;
        }
        CallbackAction::Status(status) => Step::Status(status),
        CallbackAction::Source(source) => Step::Source(source),
        CallbackAction::Open(id) | CallbackAction::Back(id) | CallbackAction::Choose(id) => {
            let Some(path) = state.resolve_path(id).await else {
                bot.send_message(chat, "That button has expired. Use /photo again.")
                    .await?;
                return Ok(());
            };
            match action {
                CallbackAction::Open(_) => Step::Navigate(Some(path)),
                CallbackAction::Back(_) => Step::Navigate(back_target(&path)),
                _ => Step::Choose(path),
            }
        }
    };

    if let Step::Navigate(path) = &step {
        if matches!(state.conversation(chat).await, Conversation::PhotoBrowse { .. }) {
            return navigate_in_place(&bot, chat, message.id, &state, path.clone()).await;
        }
    }
    apply_step(&bot, chat, &state, step).await
}

/// Redraw the navigation message for `path` instead of sending a new one.
async fn navigate_in_place(
    bot: &Bot,
    chat: ChatId,
    message_id: MessageId,
    state: &BotState,
    path: Option<String>,
) -> ResponseResult<()> {
    let markup = match state.navigation(path.as_deref()).await {
        Ok(markup) => markup,
        Err(e) => return reply_error(bot, chat, &e).await,
    };
    let title = match &path {
        Some(p) => format!("Choose a section: {}", foreman_models::section_label(p)),
        None => "Choose a section:".to_string(),
    };
    state
        .set_conversation(chat, Conversation::PhotoBrowse { path })
        .await;
    bot.edit_message_text(chat, message_id, title)
        .reply_markup(markup)
        .await?;
    Ok(())
}

/// Dispatch commands to appropriate handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Add(args) => handle_add(bot, msg, state, args).await,
        Command::Status(args) => handle_status(bot, msg, state, args).await,
        Command::Attach(args) => handle_attach(bot, msg, state, args).await,
        Command::Report => handle_report(bot, msg, state).await,
        Command::Photo => handle_photo(bot, msg, state).await,
        Command::Sections => handle_sections(bot, msg, state).await,
        Command::Sync => handle_sync(bot, msg, state).await,
        Command::Cancel => handle_cancel(bot, msg, state).await,
    }
}
