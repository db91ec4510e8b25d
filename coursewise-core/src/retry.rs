//! Retry policy for store writes

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryConfig;

/// Exponential backoff: `initial`, `initial * factor`, ... capped at `max`
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    backoff_factor: u32,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// - `max_attempts`: total attempts including the first one
    /// - `initial_backoff`: delay before the first retry
    pub fn new(max_attempts: u32, initial_backoff: Duration, backoff_factor: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            backoff_factor: backoff_factor.max(1),
            max_backoff: Duration::from_secs(2),
        }
    }

    /// Upper bound for a single delay
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Default policy: 3 attempts, waiting 50ms then 250ms
    pub fn default_policy() -> Self {
        Self::from_config(&RetryConfig::default())
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            config.backoff_factor,
        )
        .with_max_backoff(Duration::from_millis(config.max_backoff_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `attempt` until it succeeds, fails permanently, or the attempts
    /// run out. Returns the last error in the latter two cases.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        mut attempt: F,
        is_transient: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut tries = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tries += 1;
                    if tries >= self.max_attempts || !is_transient(&e) {
                        return Err(e);
                    }
                    let delay = self.delay_for(tries - 1);
                    warn!(
                        operation,
                        attempt = tries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after failure"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::default_policy()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn default_policy_waits_50_then_250() {
        let policy = RetryPolicy::default_policy();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(50));
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
    }

    #[test]
    fn delay_caps_at_max_backoff() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100), 10)
            .with_max_backoff(Duration::from_millis(500));
        assert_eq!(policy.delay_for(5), Duration::from_millis(500));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::default_policy();
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = policy
            .run(
                "test",
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 { Err(format!("fail {}", n)) } else { Ok(n) }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::default_policy();
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .run(
                "test",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("down".to_string())
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let policy = RetryPolicy::default_policy();
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .run(
                "test",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("conflict".to_string())
                },
                |e| e != "conflict",
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
