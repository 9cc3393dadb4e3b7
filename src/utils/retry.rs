use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed delay between attempts.
///
/// The remote API does not guarantee that a freshly created entity is
/// immediately readable, so callers that need read-after-write use this to
/// poll until the write becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(3),
        }
    }
}

/// Runs `op` until it succeeds or the policy's attempts are exhausted.
///
/// Each failed attempt except the last is logged as a warning and followed by
/// the policy's delay; a success short-circuits immediately. The final error
/// is returned unchanged.
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    mut op: F,
) -> std::result::Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.attempts => {
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = policy.attempts,
                    error = %err,
                    "attempt failed, retrying after delay"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = policy.attempts,
                    error = %err,
                    "final attempt failed"
                );
                return Err(err);
            }
        }
    }
}
