//! Shared domain types and configuration for the `awbsync` workspace.

mod app_config;
mod config;
mod phase;
mod shipment;
mod ticket;

use thiserror::Error;

pub use app_config::{AppConfig, FieldIds};
pub use config::{load_app_config, load_app_config_from_env};
pub use phase::Phase;
pub use shipment::{ScanEvent, ShipmentRecord};
pub use ticket::{AuxField, FieldKind, FieldValue, Ticket, TransitionCandidate};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required variables are unset or blank. Every missing name
    /// is listed so a single startup attempt reports the whole problem.
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
