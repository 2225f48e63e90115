//! Normalization of courier wire types into [`ShipmentRecord`].

use awbsync_core::{ScanEvent, ShipmentRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::{WireScan, WireShipment};

/// Parses a courier timestamp.
///
/// Accepts naive ISO-8601 with `T` or space separators and optional
/// fractional seconds, RFC 3339 with an offset (the local wall-clock time is
/// kept), and bare `YYYY-MM-DD` dates (midnight). Blank or unparseable input
/// is `None`.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses the date part of a courier timestamp or date string.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|ts| ts.date())
}

fn ts(raw: Option<&String>) -> Option<NaiveDateTime> {
    raw.and_then(|s| parse_timestamp(s))
}

fn text(raw: Option<String>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Converts a [`WireShipment`] into a [`ShipmentRecord`].
///
/// `awb` is the number that was looked up; it is used when the payload does
/// not echo one back.
#[must_use]
pub fn normalize_shipment(awb: &str, shipment: WireShipment) -> ShipmentRecord {
    let status = shipment.status.unwrap_or_default();

    let scans = shipment
        .scans
        .unwrap_or_default()
        .into_iter()
        .map(|envelope| normalize_scan(envelope.scan_detail))
        .collect();

    ShipmentRecord {
        awb: shipment
            .awb
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| awb.to_string()),
        status: text(status.status),
        status_type: text(status.status_type).to_uppercase(),
        instruction: text(status.instructions),
        status_at: ts(status.status_date_time.as_ref()),
        dispatched_at: ts(shipment.pick_up_date.as_ref()),
        out_for_delivery_at: ts(shipment.out_for_delivery_date.as_ref()),
        delivered_at: ts(shipment.delivery_date.as_ref()),
        returned_at: ts(shipment.returned_date.as_ref()),
        rto_started_at: ts(shipment.rto_started_date.as_ref()),
        reverse_in_transit: shipment.reverse_in_transit.unwrap_or(false),
        promised_delivery: shipment
            .promised_delivery_date
            .as_deref()
            .and_then(parse_date),
        expected_delivery: shipment
            .expected_delivery_date
            .as_deref()
            .and_then(parse_date),
        scans,
    }
}

fn normalize_scan(scan: WireScan) -> ScanEvent {
    ScanEvent {
        scan_type: text(scan.scan_type).to_uppercase(),
        scan: text(scan.scan),
        instruction: text(scan.instructions),
        scanned_at: ts(scan.scan_date_time.as_ref()),
        location: text(scan.scanned_location),
    }
}
