use std::time::Duration;

use crate::foundation::error::{BannerError, BannerResult};

/// Bounded retry with a fixed delay between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Must be >= 1.
    pub attempts: u32,
    /// Pause between two consecutive attempts, in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn validate(&self) -> BannerResult<()> {
        if self.attempts == 0 {
            return Err(BannerError::validation("retry attempts must be >= 1"));
        }
        Ok(())
    }
}

/// Every attempt failed; carries the attempt count and the last error.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Run `op` until it succeeds or `policy.attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. The delay is applied between attempts only, never
/// after the final failure.
pub fn retry_fixed<T, E, F>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, Exhausted<E>>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                tracing::warn!(%label, attempt, attempts, error = %e, "attempt failed");
                if attempt >= attempts {
                    return Err(Exhausted { attempts, last: e });
                }
                if policy.delay_ms > 0 {
                    std::thread::sleep(policy.delay());
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/retry.rs"]
mod tests;
