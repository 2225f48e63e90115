//! HTTP client for the courier's package-tracking endpoint.

use std::time::Duration;

use awbsync_core::{AppConfig, ShipmentRecord};
use reqwest::{Client, Url};

use crate::error::CourierError;
use crate::normalize::normalize_shipment;
use crate::retry::retry_fixed;
use crate::types::TrackingResponse;

const TRACKING_PATH: &str = "api/v1/packages/json/";

/// Result of a tracking lookup after retries.
///
/// `Unavailable` is a normal outcome, not an error: callers skip the item
/// for this run and pick it up again on the next one.
#[derive(Debug)]
pub enum TrackingLookup {
    Found(Box<ShipmentRecord>),
    Unavailable { reason: String },
}

/// Client for the courier tracking API.
///
/// Each lookup makes up to `max_attempts` requests, serially, with a fixed
/// `retry_delay` between them.
pub struct CourierClient {
    client: Client,
    token: String,
    endpoint: Url,
    max_attempts: u32,
    retry_delay: Duration,
}

impl CourierClient {
    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Http`] if the `reqwest::Client` cannot be built
    /// or [`CourierError::InvalidBaseUrl`] if the configured base URL does
    /// not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, CourierError> {
        Self::with_base_url(
            &config.courier_base_url,
            &config.courier_token,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_attempts,
            config.retry_delay_ms,
        )
    }

    /// Creates a client against an explicit base URL (wiremock in tests).
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Http`] if the `reqwest::Client` cannot be built
    /// or [`CourierError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        token: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, CourierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|u| u.join(TRACKING_PATH))
            .map_err(|e| CourierError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            token: token.to_owned(),
            endpoint,
            max_attempts,
            retry_delay: Duration::from_millis(retry_delay_ms),
        })
    }

    /// Looks up a tracking number, folding every failure into
    /// [`TrackingLookup::Unavailable`].
    pub async fn lookup(&self, awb: &str) -> TrackingLookup {
        match self.fetch_shipment(awb).await {
            Ok(record) => TrackingLookup::Found(Box::new(record)),
            Err(err) => {
                tracing::warn!(awb, error = %err, "tracking data unavailable");
                TrackingLookup::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Fetches and normalizes the shipment for `awb`, retrying transient
    /// failures.
    ///
    /// # Errors
    ///
    /// - [`CourierError::RateLimited`] / [`CourierError::UnexpectedStatus`] /
    ///   [`CourierError::Http`] after attempts are exhausted.
    /// - [`CourierError::Api`] when the courier returns an error envelope.
    /// - [`CourierError::NotFound`] when the payload holds no shipment.
    /// - [`CourierError::Deserialize`] when the body is not the expected JSON.
    pub async fn fetch_shipment(&self, awb: &str) -> Result<ShipmentRecord, CourierError> {
        let url = self.shipment_url(awb);
        retry_fixed(self.max_attempts, self.retry_delay, awb, || {
            let url = url.clone();
            async move { self.fetch_once(awb, url).await }
        })
        .await
    }

    async fn fetch_once(&self, awb: &str, url: Url) -> Result<ShipmentRecord, CourierError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(CourierError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(CourierError::UnexpectedStatus {
                status: status.as_u16(),
                awb: awb.to_owned(),
            });
        }

        let body = response.text().await?;
        let parsed: TrackingResponse =
            serde_json::from_str(&body).map_err(|e| CourierError::Deserialize {
                context: format!("tracking response for waybill {awb}"),
                source: e,
            })?;

        if let Some(message) = parsed.error.filter(|m| !m.trim().is_empty()) {
            return Err(CourierError::Api {
                awb: awb.to_owned(),
                message,
            });
        }

        let shipment = parsed
            .shipment_data
            .and_then(|data| data.into_iter().next())
            .ok_or_else(|| CourierError::NotFound {
                awb: awb.to_owned(),
            })?;

        Ok(normalize_shipment(awb, shipment.shipment))
    }

    fn shipment_url(&self, awb: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("waybill", awb);
        url
    }
}
