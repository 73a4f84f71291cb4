//! Operations behind the bot commands, independent of Telegram.

use chrono::{Local, NaiveDateTime};
use tracing::info;

use foreman_core::{
    format_deadline, leaf_name, link_name_from_url, parse_deadline, parse_status,
    resolve_next_identifier, sanitize_url, split_title_at, AssetStore, RecordStore,
};
use foreman_models::{ExternalLink, JournalEntry, PageId, TaskIdentifier, TaskRecord, TaskStatus};

use crate::error::{Result, TelegramError};
use crate::session::{is_skip, TaskDraft};

/// Tasks listed by `/report`.
pub const REPORT_SIZE: usize = 10;

/// Parse `/add <title> | <deadline> | <object> | <source>`.
///
/// Only the title is required.
pub fn parse_quick_add(args: &str) -> Result<TaskDraft> {
    let mut parts = args.split('|').map(str::trim);
    let title = parts.next().unwrap_or_default();
    if title.is_empty() {
        return Err(TelegramError::Validation("The task name cannot be empty.".into()));
    }

    let deadline = match parts.next() {
        Some(text) if !is_skip(text) => Some(parse_deadline(text).ok_or_else(|| {
            TelegramError::Validation(format!("Could not read the deadline '{text}'."))
        })?),
        _ => None,
    };
    let mut optional = || parts.next().filter(|s| !is_skip(s)).map(str::to_string);
    let object = optional();
    let source = optional();

    Ok(TaskDraft {
        title: title.to_string(),
        deadline,
        object,
        source,
    })
}

/// Create a task from a finished draft.
///
/// An explicit code in the title becomes the identifier; otherwise the next
/// number is taken from the recent tasks, or the `TMP-` placeholder when the
/// counter has no usable successor.
pub async fn create_task(
    store: &dyn RecordStore,
    draft: TaskDraft,
    now: NaiveDateTime,
) -> Result<TaskRecord> {
    let split = split_title_at(&draft.title, now);
    let identifier = if split.explicit {
        TaskIdentifier::from_code(&split.identifier)
    } else {
        resolve_next_identifier(store)
            .await
            .unwrap_or_else(|| TaskIdentifier::Explicit(split.identifier.clone()))
    };
    let name = if split.name.is_empty() {
        draft.title.trim().to_string()
    } else {
        split.name
    };

    let mut task = TaskRecord::new(identifier, name)
        .with_deadline(draft.deadline)
        .with_category(draft.object)
        .with_source(draft.source);
    task.page_id = Some(store.create_task(&task).await?);

    info!(identifier = %task.identifier, "Task created");
    Ok(task)
}

/// Parse `/status <ID> <Status>`.
pub fn parse_status_args(args: &str) -> Result<(String, TaskStatus)> {
    let usage = || TelegramError::Validation("Usage: /status <ID> <Status>".into());
    let (code, status) = args.trim().split_once(char::is_whitespace).ok_or_else(usage)?;
    if status.trim().is_empty() {
        return Err(usage());
    }
    Ok((code.to_uppercase(), parse_status(status)?))
}

async fn find(store: &dyn RecordStore, code: &str) -> Result<TaskRecord> {
    store
        .find_task(code)
        .await?
        .ok_or_else(|| TelegramError::TaskNotFound(code.to_string()))
}

fn page_of(task: &TaskRecord) -> Result<&PageId> {
    task.page_id
        .as_ref()
        .ok_or_else(|| TelegramError::TaskNotFound(task.identifier.render()))
}

/// Set the status of the task with identifier `code`.
pub async fn set_status(store: &dyn RecordStore, code: &str, status: TaskStatus) -> Result<TaskRecord> {
    let mut task = find(store, code).await?;
    store.update_status(page_of(&task)?, status).await?;
    task.status = status;
    info!(identifier = %task.identifier, status = %status, "Task status updated");
    Ok(task)
}

/// Parsed `/attach <ID> <URL> [name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachRequest {
    pub code: String,
    pub link: ExternalLink,
}

pub fn parse_attach_args(args: &str) -> Result<AttachRequest> {
    let mut words = args.split_whitespace();
    let (Some(code), Some(raw_url)) = (words.next(), words.next()) else {
        return Err(TelegramError::Validation("Usage: /attach <ID> <URL> [name]".into()));
    };
    let url = sanitize_url(raw_url).ok_or_else(|| {
        TelegramError::Validation(format!("'{raw_url}' is not an http(s) link."))
    })?;
    let name = words.collect::<Vec<_>>().join(" ");
    let name = if name.is_empty() { link_name_from_url(&url) } else { name };

    Ok(AttachRequest {
        code: code.to_uppercase(),
        link: ExternalLink::new(name, url),
    })
}

/// Append a link to a task. Returns the task and the new attachment count.
pub async fn attach_link(store: &dyn RecordStore, request: &AttachRequest) -> Result<(TaskRecord, usize)> {
    let task = find(store, &request.code).await?;
    let count = store.append_attachment(page_of(&task)?, &request.link).await?;
    info!(identifier = %task.identifier, attachments = count, "Link attached");
    Ok((task, count))
}

/// One line of the report.
pub fn report_line(task: &TaskRecord) -> String {
    let deadline = task
        .deadline
        .map(format_deadline)
        .unwrap_or_else(|| "—".to_string());
    format!(
        "{} · {} · {} · {}",
        task.identifier, task.title, task.status, deadline
    )
}

/// The most recently edited tasks, one per line.
pub async fn recent_report(store: &dyn RecordStore) -> Result<String> {
    let tasks = store.recent_tasks(REPORT_SIZE).await?;
    if tasks.is_empty() {
        return Ok("No tasks yet.".to_string());
    }
    let lines: Vec<String> = tasks.iter().map(report_line).collect();
    Ok(format!("Recent tasks:\n{}", lines.join("\n")))
}

/// Public id of an uploaded photo: `<leaf>_<YYYYmmdd_HHMMSS>`.
pub fn photo_name(path: &str, now: NaiveDateTime) -> String {
    format!("{}_{}", leaf_name(path), now.format("%Y%m%d_%H%M%S"))
}

/// Upload a photo under `path` and record it in the journal.
pub async fn record_photo(
    assets: &dyn AssetStore,
    records: &dyn RecordStore,
    path: &str,
    bytes: Vec<u8>,
    comment: Option<String>,
    now: NaiveDateTime,
) -> Result<JournalEntry> {
    let name = photo_name(path, now);
    let url = assets.upload_image(bytes, path, &name).await?;
    let entry = JournalEntry::for_path(path, name, url, now.date(), comment);
    records.create_journal_entry(&entry).await?;
    info!(section = %entry.section, store = assets.name(), "Photo recorded");
    Ok(entry)
}

/// Local wall-clock time, used to stamp placeholders and photos.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
