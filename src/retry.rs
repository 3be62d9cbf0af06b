// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Retry engine for outbound API calls.
//!
//! Wraps a single HTTP operation in bounded retries:
//! - Transport failures and retryable 5xx statuses back off and retry
//! - 429 sleeps for the server-provided `Retry-After` (without consuming
//!   exponential backoff)
//! - Other client errors fail immediately
//!
//! Each attempt is classified into an explicit [`Attempt`] outcome and the
//! loop pattern-matches on it, so the classification rules live in one
//! place instead of being scattered over error-handling branches.

use crate::error::AppError;
use std::future::Future;
use std::time::Duration;

/// Status codes retried by default (rate limit + transient server errors).
pub const DEFAULT_RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// Sleep applied to a 429 response that carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Retry behavior for one call site.
///
/// Token refresh and activity fetch carry distinct policies; token
/// failures are rarer and retried less than transient fetch failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of call attempts (including the first). Must be >= 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_backoff: Duration,
    /// Double the delay on every subsequent retry when true.
    pub exponential: bool,
    /// Status codes eligible for retry (only honored for >= 500).
    pub retryable_status: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(1),
            exponential: true,
            retryable_status: DEFAULT_RETRYABLE_STATUS.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Policy with the default exponential backoff and retryable set.
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts,
            base_backoff,
            ..Self::default()
        }
    }

    /// Delay before the retry following the failed attempt `attempt`
    /// (0-based), i.e. `base * 2^attempt` when exponential, else flat.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        if self.exponential {
            self.base_backoff.saturating_mul(2u32.saturating_pow(attempt))
        } else {
            self.base_backoff
        }
    }
}

/// Outcome of one call attempt, as seen by the retry loop.
enum Attempt {
    Success(reqwest::Response),
    /// 429; sleep for `retry_after` and retry without backoff growth.
    RateLimited { retry_after: Duration },
    Retryable(AppError),
    Terminal(AppError),
}

/// Classify a single call result.
///
/// Reads the response body on failure so the resulting error carries it;
/// the last such error is what callers see after exhaustion.
async fn classify(
    result: std::result::Result<reqwest::Response, reqwest::Error>,
    policy: &RetryPolicy,
) -> Attempt {
    let response = match result {
        Ok(response) => response,
        // Transport-level failure (connection refused, timeout): no status
        // to inspect, always worth retrying.
        Err(e) => return Attempt::Retryable(AppError::Http(e)),
    };

    if response.status().is_success() {
        return Attempt::Success(response);
    }

    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Attempt::RateLimited {
            retry_after: Duration::from_secs(retry_after),
        };
    }

    let body = response.text().await.unwrap_or_default();
    let err = AppError::Api { status, body };

    if status >= 500 && policy.retryable_status.contains(&status) {
        Attempt::Retryable(err)
    } else {
        Attempt::Terminal(err)
    }
}

/// Run `op` under the retry rules of `policy` and return the successful
/// response, or the most recent underlying failure once attempts are
/// exhausted.
///
/// `op` must build a fresh request on every invocation. Retries are
/// invisible to the caller except as latency; a rate limit that survives
/// the final attempt surfaces as [`AppError::RateLimitExceeded`] carrying
/// the server's retry-after hint.
pub async fn execute<F, Fut>(op: F, policy: &RetryPolicy) -> Result<reqwest::Response, AppError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<reqwest::Response, reqwest::Error>>,
{
    let mut last_failure: Option<AppError> = None;

    for attempt in 0..policy.max_attempts {
        match classify(op().await, policy).await {
            Attempt::Success(response) => return Ok(response),
            Attempt::Terminal(err) => return Err(err),
            Attempt::RateLimited { retry_after } => {
                if attempt + 1 == policy.max_attempts {
                    return Err(AppError::RateLimitExceeded {
                        retry_after: retry_after.as_secs(),
                    });
                }
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    delay_secs = retry_after.as_secs(),
                    "Rate limited, honoring Retry-After"
                );
                tokio::time::sleep(retry_after).await;
            }
            Attempt::Retryable(err) => {
                if attempt + 1 < policy.max_attempts {
                    let delay = policy.backoff_delay(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    last_failure = Some(err);
                    tokio::time::sleep(delay).await;
                } else {
                    last_failure = Some(err);
                }
            }
        }
    }

    tracing::error!(
        attempts = policy.max_attempts,
        "All retry attempts failed"
    );
    match last_failure {
        Some(err) => Err(err),
        None => Err(AppError::Internal(anyhow::anyhow!(
            "retry policy allowed no attempts"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .expect("valid response"),
        )
    }

    fn rate_limited(retry_after: Option<&str>) -> reqwest::Response {
        let mut builder = axum::http::Response::builder().status(429);
        if let Some(value) = retry_after {
            builder = builder.header("Retry-After", value);
        }
        reqwest::Response::from(builder.body(String::new()).expect("valid response"))
    }

    fn policy(max_attempts: u32, base_ms: u64, exponential: bool) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_backoff: Duration::from_millis(base_ms),
            exponential,
            retryable_status: DEFAULT_RETRYABLE_STATUS.to_vec(),
        }
    }

    #[tokio::test]
    async fn success_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result = execute(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response(200, "ok")) }
            },
            &policy(3, 10, true),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exponential_backoff_doubles_each_retry() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = execute(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response(500, "boom")) }
            },
            &policy(3, 100, true),
        )
        .await;

        // Retry delays: 100ms, then 200ms; none after the final attempt.
        assert_eq!(start.elapsed(), Duration::from_millis(300));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(AppError::Api { status: 500, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn flat_backoff_stays_constant() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let _ = execute(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response(503, "unavailable")) }
            },
            &policy(3, 100, false),
        )
        .await;

        assert_eq!(start.elapsed(), Duration::from_millis(200));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_fail_without_retry() {
        for status in [400, 401, 403, 404] {
            let calls = AtomicU32::new(0);
            let start = Instant::now();

            let result = execute(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(response(status, "client error")) }
                },
                &policy(3, 100, true),
            )
            .await;

            assert_eq!(start.elapsed(), Duration::ZERO, "no sleep for {status}");
            assert_eq!(calls.load(Ordering::SeqCst), 1, "one attempt for {status}");
            match result {
                Err(AppError::Api { status: got, .. }) => assert_eq!(got, status),
                other => panic!("unexpected result for {status}: {other:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unlisted_server_error_is_terminal() {
        let calls = AtomicU32::new(0);

        let result = execute(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response(501, "not implemented")) }
            },
            &policy(3, 100, true),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(AppError::Api { status: 501, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_sleeps_for_retry_after() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = execute(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Ok(rate_limited(Some("7")))
                    } else {
                        Ok(response(200, "ok"))
                    }
                }
            },
            &policy(2, 100, true),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(start.elapsed(), Duration::from_secs(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_without_header_waits_sixty_seconds() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = execute(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Ok(rate_limited(None))
                    } else {
                        Ok(response(200, "ok"))
                    }
                }
            },
            &policy(2, 100, true),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(start.elapsed(), Duration::from_secs(60));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_on_final_attempt_reports_hint() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = execute(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(rate_limited(Some("30"))) }
            },
            &policy(1, 100, true),
        )
        .await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(AppError::RateLimitExceeded { retry_after: 30 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_raises_last_failure() {
        let calls = AtomicU32::new(0);

        let result = execute(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    // Vary the body so the surfaced error is provably the
                    // one from the final attempt.
                    Ok(response(502, &format!("failure {attempt}")))
                }
            },
            &policy(4, 10, true),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(AppError::Api { status: 502, body }) => assert_eq!(body, "failure 3"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_server_errors() {
        let calls = AtomicU32::new(0);

        let result = execute(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Ok(response(500, "boom"))
                    } else {
                        Ok(response(200, "ok"))
                    }
                }
            },
            &policy(3, 10, true),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
