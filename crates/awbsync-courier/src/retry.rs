//! Bounded, fixed-delay retry for courier lookups.
//!
//! Attempts run strictly one after another. Every failed attempt is logged
//! with its attempt number; non-retriable errors end the loop immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::CourierError;

/// Returns `true` for errors that are worth another attempt.
///
/// **Retriable:** connect/timeout failures, HTTP 429, HTTP 5xx.
///
/// **Not retriable:** any other status, courier error envelopes, missing
/// shipment data and undecodable bodies. The courier would answer the same
/// way again.
pub(crate) fn is_retriable(err: &CourierError) -> bool {
    match err {
        CourierError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        CourierError::RateLimited { .. } => true,
        CourierError::UnexpectedStatus { status, .. } => *status >= 500,
        CourierError::Api { .. }
        | CourierError::NotFound { .. }
        | CourierError::Deserialize { .. }
        | CourierError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` up to `max_attempts` times, sleeping `delay` between
/// attempts. A `max_attempts` of zero is treated as one.
pub(crate) async fn retry_fixed<T, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    awb: &str,
    mut operation: F,
) -> Result<T, CourierError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CourierError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let retriable = is_retriable(&err);
                tracing::warn!(
                    awb,
                    attempt,
                    max_attempts,
                    retriable,
                    error = %err,
                    "courier lookup attempt failed"
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
