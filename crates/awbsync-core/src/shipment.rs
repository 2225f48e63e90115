use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Courier-provided snapshot for one tracking number at poll time.
///
/// Built fresh on every lookup and never persisted; the tracking number is
/// its only identity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShipmentRecord {
    pub awb: String,
    /// Human-readable current status label, e.g. `"In Transit"`.
    pub status: String,
    /// Courier status classifier code, e.g. `"UD"`, `"DL"`, `"RT"`, `"PU"`.
    pub status_type: String,
    /// Free-text instruction attached to the current status.
    pub instruction: String,
    pub status_at: Option<NaiveDateTime>,
    pub dispatched_at: Option<NaiveDateTime>,
    pub out_for_delivery_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
    pub returned_at: Option<NaiveDateTime>,
    pub rto_started_at: Option<NaiveDateTime>,
    pub reverse_in_transit: bool,
    pub promised_delivery: Option<NaiveDate>,
    pub expected_delivery: Option<NaiveDate>,
    /// Scan history, oldest first.
    pub scans: Vec<ScanEvent>,
}

/// A single carrier scan from the shipment's history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanEvent {
    pub scan_type: String,
    /// Short scan label, e.g. `"Dispatched"`.
    pub scan: String,
    pub instruction: String,
    pub scanned_at: Option<NaiveDateTime>,
    pub location: String,
}

impl ShipmentRecord {
    /// The most recent `n` scans, oldest first.
    #[must_use]
    pub fn recent_scans(&self, n: usize) -> &[ScanEvent] {
        let start = self.scans.len().saturating_sub(n);
        &self.scans[start..]
    }

    /// The most recent non-empty instruction: the current status instruction
    /// when present, otherwise the newest scan that carries one.
    #[must_use]
    pub fn latest_instruction(&self) -> Option<&str> {
        let current = self.instruction.trim();
        if !current.is_empty() {
            return Some(current);
        }
        self.scans
            .iter()
            .rev()
            .map(|s| s.instruction.trim())
            .find(|s| !s.is_empty())
    }
}
