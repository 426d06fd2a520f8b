// src/search/retry.rs
// =============================================================================
// Retries a flaky async operation a fixed number of times.
//
// How it works:
// 1. Run the operation
// 2. If it succeeds, return the value
// 3. If it fails and we have attempts left, sleep for `delay` and try again
// 4. If the last attempt fails, hand that error back to the caller
//
// The delay is fixed (no exponential growth, no jitter) and every error is
// treated as worth retrying. Logging is left to the caller.
//
// Rust concepts:
// - Generics with trait bounds: works for any operation returning a future
// - FnMut: the operation is a closure we can call more than once
// =============================================================================

use std::future::Future;
use std::time::Duration;

// How many times to try, and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    // max_attempts is clamped to at least 1: the operation always runs once
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

// Runs `operation` until it succeeds or the policy runs out of attempts
//
// Parameters:
//   operation: closure producing a fresh future for each attempt
//   policy: attempt count and delay between attempts
//
// Returns: the first Ok value, or the error from the final attempt
//
// Example:
//   let html = retry(|| client.get(url).send(), RetryPolicy::new(3, Duration::from_secs(2))).await?;
pub async fn retry<T, E, F, Fut>(mut operation: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_attempts() => return Err(e),
            Err(_) => {
                tokio::time::sleep(policy.delay()).await;
                attempt += 1;
            }
        }
    }
}
