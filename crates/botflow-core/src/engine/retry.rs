//! Bounded retry with a fixed backoff between attempts.
//!
//! Timing flows from the policy so tests can run with paused time instead of
//! real sleeps.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Run `op` until it succeeds or the attempt budget is exhausted, sleeping
/// `backoff` between attempts. Returns the last error on exhaustion.
///
/// `attempts` is clamped to at least one so the operation always runs.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => last_err = Some(err),
        }
        if attempt < attempts {
            sleep(policy.backoff).await;
        }
    }

    Err(last_err.expect("at least one attempt ran"))
}
