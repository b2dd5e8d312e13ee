//! Retrying transient NATS failures.

use std::future::Future;
use std::time::Duration;

use crate::{Result, TRACING_TARGET_CONNECTION};

/// Exponential backoff for calls that may race the NATS server start-up.
///
/// The delay doubles after every failed attempt and is capped at
/// `max_backoff`. Errors for which [`Error::is_retryable`] is `false` are
/// returned at once.
///
/// [`Error::is_retryable`]: crate::Error::is_retryable
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            ..Self::default()
        }
    }

    fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `operation` until it succeeds, fails permanently or runs out of
    /// retries.
    pub async fn retry<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retry = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || retry >= self.max_retries {
                return Err(err);
            }

            let backoff = self.backoff(retry);
            retry += 1;
            tracing::warn!(
                target: TRACING_TARGET_CONNECTION,
                retry,
                max_retries = self.max_retries,
                backoff_ms = backoff.as_millis() as u64,
                error = %err,
                "NATS call failed, retrying"
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::Error;

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let config = RetryConfig {
            max_backoff: Duration::from_millis(300),
            ..RetryConfig::new(3, Duration::from_millis(100))
        };

        assert_eq!(config.backoff(0), Duration::from_millis(100));
        assert_eq!(config.backoff(1), Duration::from_millis(200));
        assert_eq!(config.backoff(2), Duration::from_millis(300));
        assert_eq!(config.backoff(40), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let config = RetryConfig::new(3, Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));

        let result = config
            .retry(|| {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(Error::timeout(Duration::from_secs(1)))
                    } else {
                        Ok("ready")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let config = RetryConfig::new(3, Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));

        let result = config
            .retry(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(Error::invalid_config("bad bucket"))
                }
            })
            .await;

        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let config = RetryConfig::new(2, Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<()> = config
            .retry(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(Error::timeout(Duration::from_secs(2)))
                }
            })
            .await;

        assert!(matches!(result, Err(Error::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
