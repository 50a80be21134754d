//! Fixed-cooldown retry loop.

use crate::{Sleeper, TokioSleeper};
use fabula_error::{FabulaResult, RetryableError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Retries an operation after a fixed cooldown until it succeeds.
///
/// With `max_attempts == None` the loop never gives up. When bounded, the
/// error of the final attempt is returned. Every failure is logged at
/// `warn` together with whether the error looks transient.
#[derive(Debug, Clone)]
pub struct CooldownRetry {
    cooldown: Duration,
    max_attempts: Option<u32>,
    sleeper: Arc<dyn Sleeper>,
}

impl CooldownRetry {
    /// Unbounded retry sleeping on the tokio timer.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            max_attempts: None,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Stop after `max_attempts` attempts (`None` for unbounded).
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Replace the sleeper used between attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Cooldown between attempts.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Attempt bound, if any.
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Run `attempt` until it succeeds or the attempt bound is reached.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> FabulaResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FabulaResult<T>>,
    {
        let mut count: u32 = 0;

        loop {
            count += 1;

            match attempt().await {
                Ok(value) => {
                    if count > 1 {
                        tracing::info!(operation, attempts = count, "Recovered after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if self.max_attempts.is_some_and(|max| count >= max) {
                        tracing::error!(
                            operation,
                            attempts = count,
                            error = %e,
                            "Giving up after final attempt"
                        );
                        return Err(e);
                    }

                    tracing::warn!(
                        operation,
                        attempt = count,
                        retryable = e.is_retryable(),
                        cooldown_secs = self.cooldown.as_secs(),
                        error = %e,
                        "Attempt failed, cooling down before retry"
                    );
                    self.sleeper.sleep(self.cooldown).await;
                }
            }
        }
    }
}
