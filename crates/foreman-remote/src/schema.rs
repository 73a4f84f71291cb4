//! Typed mapping between Notion pages and the task/journal models.
//!
//! Notion returns each property as `{"type": "<kind>", "<kind>": ...}`.
//! [`PropertyValue`] decodes the kinds we use; everything else is
//! [`PropertyValue::Other`]. Outgoing properties are built as JSON by the
//! `*_properties` functions.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use foreman_models::{ExternalLink, JournalEntry, PageId, TaskIdentifier, TaskRecord, TaskStatus};

/// Column names of the task and journal databases.
///
/// Defaults match the Russian-language workspace; each can be overridden
/// with a `PROP_*` environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    pub title_id: String,
    pub name: String,
    pub status: String,
    pub deadline: String,
    pub source: String,
    pub object: String,
    pub attach: String,
    pub section: String,
    pub file: String,
    pub url: String,
    pub date: String,
    pub comment: String,
}

const DEFAULTS: [(&str, &str); 12] = [
    ("PROP_TITLE_ID", "ID (текст)"),
    ("PROP_NAME", "Название задачи"),
    ("PROP_STATUS", "Статус"),
    ("PROP_DEADLINE", "Срок ( Deadline)"),
    ("PROP_SOURCE", "Источник (Source)"),
    ("PROP_OBJECT", "Объект"),
    ("PROP_ATTACH", "Вложения"),
    ("PROP_SECTION", "Раздел"),
    ("PROP_FILE", "Файл / Фото"),
    ("PROP_URL", "URL"),
    ("PROP_DATE", "Дата"),
    ("PROP_COMMENT", "Комментарий"),
];

impl Default for PropertyNames {
    fn default() -> Self {
        Self::resolve(|_| None)
    }
}

impl PropertyNames {
    /// Defaults overridden by non-empty `PROP_*` environment variables.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut values = DEFAULTS.iter().map(|(key, default)| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        });
        let mut next = || values.next().unwrap_or_default();
        Self {
            title_id: next(),
            name: next(),
            status: next(),
            deadline: next(),
            source: next(),
            object: next(),
            attach: next(),
            section: next(),
            file: next(),
            url: next(),
            date: next(),
            comment: next(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateValue {
    pub start: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

/// A file entry: either an external link or a file hosted by Notion.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub external: Option<FileUrl>,
    #[serde(default)]
    pub file: Option<FileUrl>,
}

impl FileObject {
    pub fn url(&self) -> Option<&str> {
        self.external
            .as_ref()
            .or(self.file.as_ref())
            .map(|f| f.url.as_str())
    }
}

/// One decoded property value.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Status { status: Option<SelectOption> },
    Select { select: Option<SelectOption> },
    Date { date: Option<DateValue> },
    Files { files: Vec<FileObject> },
    Url { url: Option<String> },
    #[serde(other)]
    Other,
}

impl PropertyValue {
    /// Concatenated plain text of title/rich-text, or the option name of a
    /// select/status.
    pub fn text(&self) -> Option<String> {
        match self {
            PropertyValue::Title { title: parts } | PropertyValue::RichText { rich_text: parts } => {
                Some(parts.iter().map(|p| p.plain_text.as_str()).collect())
            }
            PropertyValue::Status { status: opt } | PropertyValue::Select { select: opt } => {
                opt.as_ref().map(|o| o.name.clone())
            }
            PropertyValue::Url { url } => url.clone(),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            // `start` may carry a time part; the date is the first 10 chars.
            PropertyValue::Date { date: Some(d) } => d
                .start
                .get(..10)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            _ => None,
        }
    }

    pub fn files(&self) -> &[FileObject] {
        match self {
            PropertyValue::Files { files } => files,
            _ => &[],
        }
    }
}

/// A page as returned by query and retrieve endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionPage {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl NotionPage {
    fn text(&self, name: &str) -> Option<String> {
        self.properties
            .get(name)
            .and_then(PropertyValue::text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Map onto a task. Pages without an identifier yield `None`.
    pub fn to_task(&self, props: &PropertyNames) -> Option<TaskRecord> {
        let code = self.text(&props.title_id)?;
        let status = self
            .text(&props.status)
            .and_then(|s| s.parse::<TaskStatus>().ok())
            .unwrap_or_default();
        let attachments = self
            .properties
            .get(&props.attach)
            .map(|p| {
                p.files()
                    .iter()
                    .filter_map(|f| f.url().map(|url| ExternalLink::new(&f.name, url)))
                    .collect()
            })
            .unwrap_or_default();

        let mut task = TaskRecord::new(
            TaskIdentifier::from_code(&code),
            self.text(&props.name).unwrap_or_default(),
        )
        .with_deadline(self.properties.get(&props.deadline).and_then(PropertyValue::date))
        .with_category(self.text(&props.object))
        .with_source(self.text(&props.source));
        task.page_id = Some(PageId::from_string(&self.id));
        task.status = status;
        task.attachments = attachments;
        Some(task)
    }
}

fn text_content(content: &str) -> Value {
    json!([{ "text": { "content": content } }])
}

/// Properties for a new task row.
pub fn task_properties(task: &TaskRecord, props: &PropertyNames) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        props.title_id.clone(),
        json!({ "title": text_content(&task.identifier.render()) }),
    );
    map.insert(props.name.clone(), json!({ "rich_text": text_content(&task.title) }));
    map.insert(props.status.clone(), status_property(task.status));
    if let Some(deadline) = task.deadline {
        map.insert(
            props.deadline.clone(),
            json!({ "date": { "start": deadline.format("%Y-%m-%d").to_string() } }),
        );
    }
    if let Some(source) = &task.source {
        map.insert(props.source.clone(), json!({ "select": { "name": source } }));
    }
    if let Some(category) = &task.category {
        map.insert(props.object.clone(), json!({ "select": { "name": category } }));
    }
    map
}

/// Value of a status property.
pub fn status_property(status: TaskStatus) -> Value {
    json!({ "status": { "name": status.as_str() } })
}

/// Properties for a photo journal row.
pub fn journal_properties(entry: &JournalEntry, props: &PropertyNames) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(props.section.clone(), json!({ "select": { "name": entry.section } }));
    map.insert(props.file.clone(), json!({ "rich_text": text_content(&entry.file_name) }));
    map.insert(props.url.clone(), json!({ "url": entry.url }));
    map.insert(
        props.date.clone(),
        json!({ "date": { "start": entry.date.format("%Y-%m-%d").to_string() } }),
    );
    if let Some(comment) = &entry.comment {
        map.insert(props.comment.clone(), json!({ "rich_text": text_content(comment) }));
    }
    map
}

/// Existing raw file entries of a page with `link` appended.
///
/// Entries are kept as returned so hosted files survive the update.
pub fn append_file(page: &Value, attach: &str, link: &ExternalLink) -> Vec<Value> {
    let mut files = page
        .pointer("/properties")
        .and_then(|p| p.get(attach))
        .and_then(|p| p.get("files"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    files.push(json!({
        "name": link.name,
        "type": "external",
        "external": { "url": link.url },
    }));
    files
}

/// Query body selecting the page whose identifier equals `code`.
pub fn find_by_code_query(code: &str, props: &PropertyNames) -> Value {
    json!({
        "filter": { "property": props.title_id, "title": { "equals": code } },
        "page_size": 1,
    })
}

/// Query body for the most recently edited pages.
pub fn recent_query(limit: usize) -> Value {
    json!({
        "sorts": [{ "timestamp": "last_edited_time", "direction": "descending" }],
        "page_size": limit.clamp(1, 100),
    })
}
