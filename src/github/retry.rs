// Bounded retry with exponential backoff.
// Wraps a single request; pagination stays unaware of retries.

use std::future::Future;
use std::time::Duration;

use crate::error::{MutualsError, Result};

/// How many times, and how patiently, to retry transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each later one.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `op`, retrying transient errors.
    ///
    /// Non-transient errors are returned as-is after the attempt that produced
    /// them. Once retries run out the last transient error becomes
    /// [`MutualsError::Fetch`].
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && retry < self.max_retries => {
                    let delay = self.backoff(retry);
                    tracing::warn!(
                        attempt = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transient error: {}",
                        err
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) if err.is_transient() => {
                    return Err(MutualsError::Fetch {
                        attempts: retry + 1,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
        };
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(5));
        assert_eq!(policy.backoff(40), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = instant()
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(MutualsError::Transient("reset".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_become_fetch_error() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = instant()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(MutualsError::Transient("timeout".into()))
            })
            .await;

        match result {
            Err(MutualsError::Fetch { attempts, reason }) => {
                assert_eq!(attempts, 4);
                assert!(reason.contains("timeout"));
            }
            other => panic!("expected Fetch, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = instant()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(MutualsError::NotFound("ghost".into()))
            })
            .await;

        assert!(matches!(result, Err(MutualsError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = instant()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(MutualsError::RateLimited {
                    reset_at: "12:00:00 UTC".into(),
                })
            })
            .await;

        assert!(matches!(result, Err(MutualsError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_retry_policy_fails_fast() {
        let policy = RetryPolicy {
            initial_backoff: Duration::ZERO,
            ..RetryPolicy::none()
        };
        let result: Result<()> = policy
            .run(|| async { Err(MutualsError::Transient("503".into())) })
            .await;
        assert!(matches!(result, Err(MutualsError::Fetch { attempts: 1, .. })));
    }
}
