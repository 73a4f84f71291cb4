//! Status alias normalisation.

use foreman_models::TaskStatus;

use crate::error::{CoreError, Result};

const ALIASES: &[(&str, TaskStatus)] = &[
    ("not started", TaskStatus::NotStarted),
    ("не начато", TaskStatus::NotStarted),
    ("не начата", TaskStatus::NotStarted),
    ("in progress", TaskStatus::InProgress),
    ("в работе", TaskStatus::InProgress),
    ("в процессе", TaskStatus::InProgress),
    ("done", TaskStatus::Done),
    ("сделано", TaskStatus::Done),
    ("готово", TaskStatus::Done),
];

/// Map user input onto a status, case-insensitively.
pub fn normalize_status(input: &str) -> Option<TaskStatus> {
    let key = input.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, status)| *status)
}

/// Like [`normalize_status`], but unknown input is a validation error that
/// lists the allowed values.
pub fn parse_status(input: &str) -> Result<TaskStatus> {
    normalize_status(input).ok_or_else(|| {
        CoreError::Validation(format!(
            "unknown status '{}', allowed: {}",
            input.trim(),
            allowed_statuses()
        ))
    })
}

/// Comma-separated canonical status names.
pub fn allowed_statuses() -> String {
    TaskStatus::ALL
        .iter()
        .map(TaskStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names() {
        for status in TaskStatus::ALL {
            assert_eq!(normalize_status(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_russian_aliases() {
        assert_eq!(normalize_status("В работе"), Some(TaskStatus::InProgress));
        assert_eq!(normalize_status("  готово "), Some(TaskStatus::Done));
        assert_eq!(normalize_status("НЕ НАЧАТА"), Some(TaskStatus::NotStarted));
    }

    #[test]
    fn test_unknown_status_is_validation_error() {
        let err = parse_status("blocked").unwrap_err();
        match err {
            CoreError::Validation(msg) => {
                assert!(msg.contains("blocked"));
                assert!(msg.contains("Not started, In progress, Done"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
