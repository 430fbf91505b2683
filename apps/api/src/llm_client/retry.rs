//! Exponential-backoff retry for outbound network calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Outcome of one attempt.
pub enum Attempt<T, E> {
    Done(T),
    /// Transient failure; try again if attempts remain.
    Retry(E),
    /// Permanent failure; give up immediately.
    Fail(E),
}

#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each retry.
    pub base_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl Backoff {
    fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Runs `op` until it succeeds, fails permanently or runs out of attempts.
/// `op` receives the zero-based attempt number.
pub async fn with_backoff<T, E, F, Fut>(policy: Backoff, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Attempt::Done(value) => return Ok(value),
            Attempt::Fail(e) => return Err(e),
            Attempt::Retry(e) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(e);
                }
                let delay = policy.delay_before(attempt);
                warn!(
                    "Attempt {attempt} failed ({e}), retrying after {}ms...",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
