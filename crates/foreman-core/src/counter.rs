//! Next sequential identifier from a sample of recent tasks.
//!
//! Only the most recently edited tasks are scanned, so the result is unique
//! with respect to that window and nothing more. Two concurrent creations,
//! or a higher number that has dropped out of the window, can still collide.

use tracing::{debug, warn};

use foreman_models::TaskIdentifier;

use crate::store::RecordStore;

/// How many recent tasks are scanned.
pub const COUNTER_SAMPLE_SIZE: usize = 50;

/// Compute `max + 1` over all purely numeric codes, starting at 1.
///
/// Returns `None` when a numeric code does not fit in `u128` or the maximum
/// has no successor, since any number handed out then could repeat one in
/// the sample.
pub fn next_identifier<I, S>(codes: I) -> Option<TaskIdentifier>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut max: u128 = 0;
    for code in codes {
        let code = code.as_ref().trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        match code.parse::<u128>() {
            Ok(n) => max = max.max(n),
            Err(_) => {
                warn!(code, "Numeric task code is out of range");
                return None;
            }
        }
    }

    match max.checked_add(1) {
        Some(next) => Some(TaskIdentifier::Generated(next)),
        None => {
            warn!(max = %max, "Task counter overflowed");
            None
        }
    }
}

/// Resolve the next identifier from the store.
///
/// Store failures are logged and treated as an empty sample, giving `001`.
/// `None` means the sample holds a number with no usable successor.
pub async fn resolve_next_identifier(store: &dyn RecordStore) -> Option<TaskIdentifier> {
    match store.recent_tasks(COUNTER_SAMPLE_SIZE).await {
        Ok(tasks) => {
            let next = next_identifier(tasks.iter().map(|t| t.identifier.render()));
            debug!(sampled = tasks.len(), next = ?next, "Resolved next task identifier");
            next
        }
        Err(e) => {
            warn!(error = %e, "Counter scan failed, falling back to 001");
            Some(TaskIdentifier::Generated(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoreError, Result};
    use foreman_models::{ExternalLink, JournalEntry, PageId, TaskRecord, TaskStatus};

    #[test]
    fn test_mixed_sample() {
        let next = next_identifier(["001", "foo", "012", "7"]).unwrap();
        assert_eq!(next, TaskIdentifier::Generated(13));
        assert_eq!(next.render(), "013");
    }

    #[test]
    fn test_empty_sample_starts_at_one() {
        assert_eq!(next_identifier(Vec::<String>::new()).unwrap().render(), "001");
    }

    #[test]
    fn test_non_numeric_codes_ignored() {
        let next = next_identifier(["INTEL-034", "TMP-20250101-120000", "12a", " "]).unwrap();
        assert_eq!(next.render(), "001");
    }

    #[test]
    fn test_wider_than_padding() {
        assert_eq!(next_identifier(["999"]).unwrap().render(), "1000");
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(next_identifier([" 041 "]).unwrap().render(), "042");
    }

    #[test]
    fn test_large_codes_stay_in_the_max() {
        let next = next_identifier(["5000000000", "012"]).unwrap();
        assert_eq!(next.render(), "5000000001");
        assert_eq!(next_identifier(["4294967295"]).unwrap().render(), "4294967296");
    }

    #[test]
    fn test_overflow_yields_no_identifier() {
        assert_eq!(next_identifier([u128::MAX.to_string()]), None);
        assert_eq!(next_identifier(["7", "1000000000000000000000000000000000000000000"]), None);
    }

    struct FixedStore(Option<Vec<&'static str>>);

    #[async_trait::async_trait]
    impl RecordStore for FixedStore {
        async fn recent_tasks(&self, limit: usize) -> Result<Vec<TaskRecord>> {
            assert_eq!(limit, COUNTER_SAMPLE_SIZE);
            match &self.0 {
                Some(codes) => Ok(codes
                    .iter()
                    .map(|c| TaskRecord::new(TaskIdentifier::from_code(c), "task"))
                    .collect()),
                None => Err(CoreError::Transport("connection reset".into())),
            }
        }

        async fn find_task(&self, _code: &str) -> Result<Option<TaskRecord>> {
            Ok(None)
        }

        async fn create_task(&self, _task: &TaskRecord) -> Result<PageId> {
            unreachable!()
        }

        async fn update_status(&self, _page: &PageId, _status: TaskStatus) -> Result<()> {
            unreachable!()
        }

        async fn append_attachment(&self, _page: &PageId, _link: &ExternalLink) -> Result<usize> {
            unreachable!()
        }

        async fn create_journal_entry(&self, _entry: &JournalEntry) -> Result<PageId> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_resolve_from_store() {
        let store = FixedStore(Some(vec!["001", "INTEL-034", "012", "7"]));
        assert_eq!(resolve_next_identifier(&store).await.unwrap().render(), "013");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_failure() {
        let store = FixedStore(None);
        assert_eq!(resolve_next_identifier(&store).await.unwrap().render(), "001");
    }
}
