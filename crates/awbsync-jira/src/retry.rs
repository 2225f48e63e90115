//! Fixed-delay retry for Jira requests.

use std::future::Future;
use std::time::Duration;

use crate::error::JiraError;

/// Returns `true` for transient failures: connect/timeout errors, HTTP 429
/// and HTTP 5xx. Everything else (404, other 4xx, bad payloads, the page
/// guard) is returned to the caller on the first occurrence.
pub(crate) fn is_retriable(err: &JiraError) -> bool {
    match err {
        JiraError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        JiraError::RateLimited { .. } => true,
        JiraError::UnexpectedStatus { status, .. } => *status >= 500,
        JiraError::NotFound { .. }
        | JiraError::Deserialize { .. }
        | JiraError::PaginationLimit { .. }
        | JiraError::InvalidBaseUrl { .. } => false,
    }
}

/// Retry predicate for non-idempotent requests (transition, comment).
///
/// Only failures where Jira cannot have applied the request qualify: the
/// connection was never established, or the request was rejected with 429.
/// A timeout or 5xx may arrive after the write went through, so replaying it
/// could post a second comment or re-run a transition.
pub(crate) fn is_retriable_write(err: &JiraError) -> bool {
    match err {
        JiraError::Http(e) => e.is_connect(),
        JiraError::RateLimited { .. } => true,
        _ => false,
    }
}

/// Runs `operation` up to `max_attempts` times with a fixed `delay` between
/// attempts, logging each failure with its attempt number. `should_retry`
/// decides which errors are worth another attempt.
pub(crate) async fn retry_fixed<T, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    op_name: &str,
    should_retry: fn(&JiraError) -> bool,
    mut operation: F,
) -> Result<T, JiraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, JiraError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let retriable = should_retry(&err);
                tracing::warn!(
                    op = op_name,
                    attempt,
                    max_attempts,
                    retriable,
                    error = %err,
                    "Jira request failed"
                );
                if !retriable || attempt >= max_attempts {
                    return Err(err);
                }
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
