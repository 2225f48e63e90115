//! Courier tracking client: fetches a shipment snapshot for a tracking
//! number and normalizes it into [`awbsync_core::ShipmentRecord`].

mod client;
mod error;
mod normalize;
mod retry;
pub mod types;

pub use client::{CourierClient, TrackingLookup};
pub use error::CourierError;
pub use normalize::{normalize_shipment, parse_date, parse_timestamp};
