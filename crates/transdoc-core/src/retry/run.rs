//! Retry loop: run an async operation until success or policy says stop.

use std::future::Future;

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::clock::Clock;
use crate::error::TranslateError;

/// Runs `op` until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again;
/// the last error is returned unchanged.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    clock: &dyn Clock,
    mut op: F,
) -> Result<T, TranslateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TranslateError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            attempt,
                            max_attempts = policy.max_attempts,
                            "operation failed, retrying in {:?}: {}",
                            d,
                            e
                        );
                        clock.sleep(d).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}
