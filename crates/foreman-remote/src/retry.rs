//! Capped exponential backoff for remote calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

/// Attempts per request, including the first.
pub const RETRY_MAX: u32 = 4;

/// Per-request timeout applied to HTTP clients.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// How often and how long to wait between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay after the zero-based `attempt`: `base * 2^attempt`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Run `op` until it succeeds, fails with a non-retriable error, or the
    /// attempts run out. The last error is returned.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retriable() && attempt + 1 < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation = what,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Remote call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> RemoteError {
        RemoteError::Status {
            code: 503,
            body: "busy".into(),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let secs: Vec<u64> = (0..6).map(|a| policy.delay_for(a).as_secs()).collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 10, 10]);
        assert_eq!(policy.delay_for(40), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::default()
            .run("test", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok("ok")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = RetryPolicy::default()
            .run("test", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Status { code: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), RETRY_MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = RetryPolicy::default()
            .run("test", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RemoteError::NotFound("page".into()))
            })
            .await;

        assert!(matches!(result, Err(RemoteError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_none_tries_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let _ = RetryPolicy::none()
            .run("test", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(unavailable())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
