//! Bounded retry with a fixed delay.

use crate::config::RetryPolicy;
use crate::error::{ScrapeError, ScrapeResult};
use std::fmt::Display;
use std::future::Future;

/// Run `op` until it succeeds or `policy.attempts` tries have failed.
///
/// `op` receives the 1-based attempt number. Between failures the loop sleeps
/// for `policy.delay`; there is no sleep after the last failure. Exhaustion
/// yields [`ScrapeError::RetriesExhausted`] carrying the last error.
pub async fn retry_fixed<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> ScrapeResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    "request failed: {e}. retrying in {}s ({attempt}/{attempts})",
                    policy.delay.as_secs_f32()
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::warn!("request failed: {e}. giving up after {attempts} attempts");
                return Err(ScrapeError::RetriesExhausted {
                    attempts,
                    last_error: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::from_secs(5),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_attempt() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let out = retry_fixed(&policy(5), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 5 {
                    Err("connection reset")
                } else {
                    Ok(attempt)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(out, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // four waits between five attempts
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_last_error() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let err = retry_fixed(&policy(5), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(format!("timeout #{attempt}")) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
        match err {
            ScrapeError::RetriesExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 5);
                assert_eq!(last_error, "timeout #5");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_success_makes_one_call() {
        let calls = AtomicU32::new(0);
        let out = retry_fixed(&policy(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>("body") }
        })
        .await
        .unwrap();
        assert_eq!(out, "body");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
