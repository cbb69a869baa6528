use super::types::DownloadOptions;
use crate::error::IsRetryable;
use std::future::Future;
use std::time::Duration;

/// Bounded retries with a fixed pause between attempts.
///
/// The policy holds no per-task state; each call to [`RetryPolicy::run`] keeps
/// its own attempt counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl From<&DownloadOptions> for RetryPolicy {
    fn from(options: &DownloadOptions) -> Self {
        Self {
            max_attempts: options.max_attempts,
            delay: options.retry_delay,
        }
    }
}

impl RetryPolicy {
    /// Runs `operation` until it succeeds, fails with a non-retryable error, or
    /// has been tried `max_attempts` times.
    ///
    /// The operation receives the 1-based attempt number. Returns the number of
    /// attempts made together with the final result.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> (u32, Result<T, E>)
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: IsRetryable + std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(attempts = attempt, "Succeeded after retry");
                    }
                    return (attempt, Ok(value));
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_attempts,
                        delay_ms = self.delay.as_millis(),
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        tracing::debug!(error = %e, attempts = attempt, "Attempts exhausted");
                    } else {
                        tracing::debug!(error = %e, attempts = attempt, "Non-retryable failure");
                    }
                    return (attempt, Err(e));
                }
            }
        }
    }
}
