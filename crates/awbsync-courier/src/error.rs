use thiserror::Error;

/// Errors returned by the courier tracking client.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by courier (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} for waybill {awb}")]
    UnexpectedStatus { status: u16, awb: String },

    /// The courier answered with an error envelope, e.g. an unknown waybill.
    #[error("courier API error for waybill {awb}: {message}")]
    Api { awb: String, message: String },

    /// The response parsed but carried no shipment.
    #[error("no shipment data for waybill {awb}")]
    NotFound { awb: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid courier base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
