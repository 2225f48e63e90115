//! Shipment-to-ticket reconciliation: identifier extraction, phase
//! classification, field and transition reconciliation, and the driver that
//! runs them over a batch of tickets.

pub mod classify;
mod comment;
mod driver;
pub mod extract;
pub mod fields;
pub mod transition;

pub use classify::{classify, classify_explained, Classification};
pub use comment::{already_commented, render_comment};
pub use driver::{Driver, RunSummary, SkipReason, TicketOutcome};
pub use extract::extract_awb;
pub use fields::{reconcile, FieldDelta, WritePolicy};
pub use transition::{resolve, status_matches};
