//! Task types for Pocket Foreman.
//!
//! A task is one row of the remote task database: an identifier shown in the
//! title column, a display name, a status and a few optional labels.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::PageId;

/// Width of generated numeric identifiers (`001`, `012`, `123`).
pub const GENERATED_ID_WIDTH: usize = 3;

/// Identifier of a task as shown in the title column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaskIdentifier {
    /// A code supplied by the user, e.g. `INTEL-034` or `АР-12-3`.
    Explicit(String),
    /// A sequence number assigned automatically.
    Generated(u128),
}

impl TaskIdentifier {
    /// Interpret a code read back from the remote store.
    ///
    /// Only codes that render back to exactly the same text are treated as
    /// generated, so `007` becomes `Generated(7)` while `0007` stays explicit.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = code.parse::<u128>() {
                let generated = TaskIdentifier::Generated(n);
                if generated.render() == code {
                    return generated;
                }
            }
        }
        TaskIdentifier::Explicit(code.to_string())
    }

    /// Render the identifier the way it is stored remotely.
    pub fn render(&self) -> String {
        match self {
            TaskIdentifier::Explicit(code) => code.clone(),
            TaskIdentifier::Generated(n) => format!("{:0width$}", n, width = GENERATED_ID_WIDTH),
        }
    }
}

impl fmt::Display for TaskIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not started")]
    NotStarted,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// All statuses in display order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::NotStarted, TaskStatus::InProgress, TaskStatus::Done];

    /// The exact option name used by the remote status field.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not started",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Parses the canonical option name only. Aliases are handled by the
    /// status normaliser in `foreman-core`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A link stored in a task's attachment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    /// Caption shown in the attachment list.
    pub name: String,
    /// Target URL.
    pub url: String,
}

impl ExternalLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A task row.
///
/// Records are created once by the creation flow and afterwards only the
/// status and the attachment list change. Nothing here deletes records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Remote page id; `None` until the record has been written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<PageId>,

    /// Identifier shown in the title column.
    pub identifier: TaskIdentifier,

    /// Human-readable task name.
    pub title: String,

    /// Current status.
    #[serde(default)]
    pub status: TaskStatus,

    /// Due date, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,

    /// Site object or category label (e.g. `Спортзал`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Where the task came from (e.g. `План`, `Дефект`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// External links attached to the task.
    #[serde(default)]
    pub attachments: Vec<ExternalLink>,
}

impl TaskRecord {
    /// Creates a new, not yet written task with status `Not started`.
    pub fn new(identifier: TaskIdentifier, title: impl Into<String>) -> Self {
        Self {
            page_id: None,
            identifier,
            title: title.into(),
            status: TaskStatus::NotStarted,
            deadline: None,
            category: None,
            source: None,
            attachments: Vec::new(),
        }
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the category label.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Sets the source label.
    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }
}
