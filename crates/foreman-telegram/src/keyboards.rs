//! Inline keyboards and their callback payloads.

use std::str::FromStr;

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use foreman_core::{leaf_name, parent_of, OutlineIndex, PendingChange};
use foreman_models::{ChangeId, TaskStatus};

use crate::registry::PathRegistry;

/// Source options offered by the creation dialogue.
pub const SOURCES: &[&str] = &["План", "Дефект", "Операции", "API"];

/// Entries listed per side of a structure diff.
pub const DIFF_PREVIEW: usize = 10;

const SYNC_PREFIX: &str = "safesync:";

/// Decoded callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    ApplyChange(ChangeId),
    CancelChange(ChangeId),
    /// Show the children of a registered path.
    Open(u32),
    /// Go to the parent of a registered path.
    Back(u32),
    /// Pick a registered path as the photo section.
    Choose(u32),
    Status(TaskStatus),
    /// `None` is the "no source" button.
    Source(Option<String>),
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::ApplyChange(id) => format!("{SYNC_PREFIX}apply|{id}"),
            CallbackAction::CancelChange(id) => format!("{SYNC_PREFIX}cancel|{id}"),
            CallbackAction::Open(id) => format!("p|{id}"),
            CallbackAction::Back(id) => format!("b|{id}"),
            CallbackAction::Choose(id) => format!("c|{id}"),
            CallbackAction::Status(status) => format!("st|{}", status.as_str()),
            CallbackAction::Source(Some(source)) => format!("src|{source}"),
            CallbackAction::Source(None) => "src|-".to_string(),
        }
    }

    pub fn decode(data: &str) -> Option<Self> {
        let (tag, value) = data.split_once('|')?;
        match tag {
            "safesync:apply" => ChangeId::from_str(value).ok().map(CallbackAction::ApplyChange),
            "safesync:cancel" => ChangeId::from_str(value).ok().map(CallbackAction::CancelChange),
            "p" => value.parse().ok().map(CallbackAction::Open),
            "b" => value.parse().ok().map(CallbackAction::Back),
            "c" => value.parse().ok().map(CallbackAction::Choose),
            "st" => TaskStatus::from_str(value).ok().map(CallbackAction::Status),
            "src" if value == "-" => Some(CallbackAction::Source(None)),
            "src" if !value.is_empty() => Some(CallbackAction::Source(Some(value.to_string()))),
            _ => None,
        }
    }
}

fn button(text: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.encode())
}

/// Apply / Cancel buttons for a pending structure change.
pub fn sync_keyboard(id: ChangeId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("✅ Apply", CallbackAction::ApplyChange(id)),
        button("✖️ Cancel", CallbackAction::CancelChange(id)),
    ]])
}

pub fn status_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![TaskStatus::ALL
        .into_iter()
        .map(|status| button(status.as_str(), CallbackAction::Status(status)))
        .collect::<Vec<_>>()])
}

pub fn source_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = SOURCES
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|s| button(*s, CallbackAction::Source(Some(s.to_string()))))
                .collect()
        })
        .collect();
    rows.push(vec![button("-", CallbackAction::Source(None))]);
    InlineKeyboardMarkup::new(rows)
}

/// Folder navigation below `path` (`None` for the top level).
///
/// Children are laid out two per row. Below a folder there is a row with
/// `Back` and `Choose here`.
pub fn navigation_keyboard(
    index: &OutlineIndex,
    registry: &mut PathRegistry,
    path: Option<&str>,
) -> InlineKeyboardMarkup {
    let children = index.children(path.unwrap_or_default());
    let mut rows: Vec<Vec<InlineKeyboardButton>> = children
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|child| {
                    let marker = if index.has_children(child) { "📁" } else { "📄" };
                    button(
                        format!("{marker} {}", leaf_name(child)),
                        CallbackAction::Open(registry.id_for(child)),
                    )
                })
                .collect()
        })
        .collect();

    if let Some(current) = path {
        let id = registry.id_for(current);
        rows.push(vec![
            button("⬅️ Back", CallbackAction::Back(id)),
            button("✅ Choose here", CallbackAction::Choose(id)),
        ]);
    }

    InlineKeyboardMarkup::new(rows)
}

/// The parent a `Back` press leads to.
pub fn back_target(path: &str) -> Option<String> {
    parent_of(path).map(str::to_string)
}

fn preview(out: &mut String, title: &str, paths: &[String]) {
    if paths.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title} ({}):\n", paths.len()));
    for path in paths.iter().take(DIFF_PREVIEW) {
        out.push_str(&format!("  • {path}\n"));
    }
    if paths.len() > DIFF_PREVIEW {
        out.push_str(&format!("  … and {} more\n", paths.len() - DIFF_PREVIEW));
    }
}

/// Message text asking the operator to confirm a structure change.
pub fn change_summary(change: &PendingChange) -> String {
    let mut text = format!(
        "🗂 Structure change #{} under {}\n",
        change.id,
        if change.root.is_empty() { "/" } else { change.root.as_str() }
    );
    preview(&mut text, "➕ Added", &change.diff.added);
    preview(&mut text, "➖ Removed", &change.diff.removed);
    if !change.diff.removed.is_empty() {
        text.push_str("\nRemoved folders are kept remotely.\n");
    }
    text.push_str("\nApply this change?");
    text
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use teloxide::types::InlineKeyboardButtonKind;

    use foreman_core::{parse_outline, StructureDiff, StructureSnapshot};

    use super::*;

    fn data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("unexpected button kind {other:?}"),
        }
    }

    #[test]
    fn test_sync_payloads() {
        let id = ChangeId::new(42);
        assert_eq!(CallbackAction::ApplyChange(id).encode(), "safesync:apply|42");
        assert_eq!(CallbackAction::CancelChange(id).encode(), "safesync:cancel|42");
        assert_eq!(
            CallbackAction::decode("safesync:apply|42"),
            Some(CallbackAction::ApplyChange(id))
        );
        assert_eq!(
            CallbackAction::decode("safesync:cancel|42"),
            Some(CallbackAction::CancelChange(id))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(CallbackAction::decode("safesync:apply|x"), None);
        assert_eq!(CallbackAction::decode("p|-1"), None);
        assert_eq!(CallbackAction::decode("st|Maybe"), None);
        assert_eq!(CallbackAction::decode("connect:foo"), None);
        assert_eq!(CallbackAction::decode("src|"), None);
    }

    #[test]
    fn test_status_and_source_payloads() {
        assert_eq!(
            CallbackAction::decode(&CallbackAction::Status(TaskStatus::InProgress).encode()),
            Some(CallbackAction::Status(TaskStatus::InProgress))
        );
        assert_eq!(CallbackAction::decode("src|-"), Some(CallbackAction::Source(None)));
        assert_eq!(
            CallbackAction::decode("src|Дефект"),
            Some(CallbackAction::Source(Some("Дефект".into())))
        );
    }

    #[test]
    fn test_payloads_fit_callback_limit() {
        let mut registry = PathRegistry::new();
        for i in 0..500 {
            registry.id_for(&format!("Очень длинное название раздела/{i}"));
        }
        let id = registry.id_for("Здание/Фасады/Северный фасад/Секция 4");
        assert!(CallbackAction::Choose(id).encode().len() <= 64);
        assert!(CallbackAction::Source(Some("Операции".into())).encode().len() <= 64);
    }

    #[test]
    fn test_navigation_top_level() {
        let index = OutlineIndex::new(&parse_outline("A\n  A1\nB\nC\n"));
        let mut registry = PathRegistry::new();
        let markup = navigation_keyboard(&index, &mut registry, None);

        let rows = &markup.inline_keyboard;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0][0].text, "📁 A");
        assert_eq!(rows[0][1].text, "📄 B");
        assert_eq!(rows[1][0].text, "📄 C");

        let CallbackAction::Open(id) = CallbackAction::decode(data(&rows[0][0])).unwrap() else {
            panic!("expected open");
        };
        assert_eq!(registry.path_for(id), Some("A"));
    }

    #[test]
    fn test_navigation_inside_folder() {
        let index = OutlineIndex::new(&parse_outline("A\n  A1\n"));
        let mut registry = PathRegistry::new();
        let markup = navigation_keyboard(&index, &mut registry, Some("A"));

        let rows = &markup.inline_keyboard;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].text, "📄 A1");
        let last = rows.last().unwrap();
        assert_eq!(last[0].text, "⬅️ Back");
        assert_eq!(last[1].text, "✅ Choose here");
        let CallbackAction::Choose(id) = CallbackAction::decode(data(&last[1])).unwrap() else {
            panic!("expected choose");
        };
        assert_eq!(registry.path_for(id), Some("A"));
    }

    #[test]
    fn test_back_target() {
        assert_eq!(back_target("A/B"), Some("A".to_string()));
        assert_eq!(back_target("A"), None);
    }

    #[test]
    fn test_source_keyboard_has_skip() {
        let markup = source_keyboard();
        let last = markup.inline_keyboard.last().unwrap();
        assert_eq!(data(&last[0]), "src|-");
        assert_eq!(markup.inline_keyboard.len(), 3);
    }

    #[test]
    fn test_change_summary_truncates() {
        let old = StructureSnapshot::from_paths(["Old"]);
        let new = StructureSnapshot::from_paths((0..12).map(|i| format!("New{i}")));
        let change = PendingChange {
            id: ChangeId::new(3),
            root: "Project".into(),
            diff: StructureDiff::compute(&old, &new),
            snapshot: new,
            detected_at: Utc::now(),
        };

        let text = change_summary(&change);
        assert!(text.contains("#3 under Project"));
        assert!(text.contains("➕ Added (12)"));
        assert!(text.contains("New9"));
        assert!(!text.contains("New10"));
        assert!(text.contains("and 2 more"));
        assert!(text.contains("➖ Removed (1)"));
        assert!(text.contains("kept remotely"));
    }
}
