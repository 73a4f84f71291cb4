//! Photo journal entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the attachment journal: an uploaded photo filed under a
/// section of the project structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Section label, path segments joined with ` / `.
    pub section: String,
    /// File name shown in the journal.
    pub file_name: String,
    /// Public URL of the uploaded file.
    pub url: String,
    /// Date the entry was made.
    pub date: NaiveDate,
    /// Optional free-text comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl JournalEntry {
    /// Creates an entry, turning a materialized path `A/B/C` into the
    /// section label `A / B / C`.
    pub fn for_path(
        path: &str,
        file_name: impl Into<String>,
        url: impl Into<String>,
        date: NaiveDate,
        comment: Option<String>,
    ) -> Self {
        Self {
            section: section_label(path),
            file_name: file_name.into(),
            url: url.into(),
            date,
            comment,
        }
    }
}

/// Formats a slash-joined path as a section label.
pub fn section_label(path: &str) -> String {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}
