//! Bounded retry for mutating operations.
//!
//! Attempts are counted, not additional retries: a backoff limit of 1 means
//! the operation runs once with no retry. Only retryable errors (connection
//! failures) trigger another attempt; anything else propagates immediately.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Attempt budget and fixed inter-attempt delay for a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (1 = no retry).
    pub backoff_limit: u32,
    /// Fixed delay between attempts; may be zero.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_limit: 1,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    pub fn new(backoff_limit: u32, delay: Duration) -> Self {
        Self {
            backoff_limit,
            delay,
        }
    }
}

/// Run `operation` up to `policy.backoff_limit` times.
///
/// A non-retryable error stops immediately and propagates unchanged; when
/// attempts are exhausted the last observed error propagates. The delay
/// suspends the single flow of control, nothing else proceeds meanwhile.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let limit = policy.backoff_limit.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() || attempt >= limit {
                    return Err(err);
                }
                debug!(attempt, limit, error = %err, "retrying after failure");
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}
