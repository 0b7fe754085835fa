//! Fixed-delay retry for calls to external services.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

/// Async sleeping abstraction so retry delays are observable in tests.
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use std::time::Duration;
///
/// use async_trait::async_trait;
/// use hive_backend::domain::Sleeper;
///
/// #[derive(Default)]
/// struct Recording(Mutex<Vec<Duration>>);
///
/// #[async_trait]
/// impl Sleeper for Recording {
///     async fn sleep(&self, duration: Duration) {
///         self.0.lock().expect("delays lock").push(duration);
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio timer-backed sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded number of attempts separated by a constant delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl FixedRetryPolicy {
    /// Build a policy; at least one attempt is always made.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Pool creation: one call plus three retries, one second apart.
    pub fn pool_creation() -> Self {
        Self::new(4, Duration::from_millis(1000))
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between consecutive attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` until it succeeds or attempts are exhausted.
    ///
    /// `operation` receives the 1-based attempt number. The last error is
    /// returned once every attempt has failed.
    pub async fn run<T, E, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        label: &str,
        mut operation: F,
    ) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Display + Send,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts => {
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "attempt failed; retrying"
                    );
                    sleeper.sleep(self.delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(
                        operation = label,
                        attempts = attempt,
                        error = %error,
                        "retries exhausted"
                    );
                    return Err(error);
                }
            }
        }
    }
}
