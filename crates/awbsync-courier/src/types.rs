//! Courier tracking API response types.
//!
//! The packages endpoint wraps shipments as
//! `{"ShipmentData": [{"Shipment": {...}}]}` and reports lookup failures as
//! `{"Error": "..."}`. Every field the courier may omit or send as `null` is
//! an `Option`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TrackingResponse {
    #[serde(rename = "ShipmentData", default)]
    pub shipment_data: Option<Vec<ShipmentEnvelope>>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShipmentEnvelope {
    #[serde(rename = "Shipment")]
    pub shipment: WireShipment,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireShipment {
    #[serde(rename = "AWB", default)]
    pub awb: Option<String>,
    #[serde(default)]
    pub status: Option<WireStatus>,
    #[serde(default)]
    pub pick_up_date: Option<String>,
    #[serde(default)]
    pub out_for_delivery_date: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub returned_date: Option<String>,
    #[serde(rename = "RTOStartedDate", default)]
    pub rto_started_date: Option<String>,
    #[serde(default)]
    pub reverse_in_transit: Option<bool>,
    #[serde(default)]
    pub promised_delivery_date: Option<String>,
    #[serde(default)]
    pub expected_delivery_date: Option<String>,
    #[serde(default)]
    pub scans: Option<Vec<ScanEnvelope>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_type: Option<String>,
    #[serde(default)]
    pub status_date_time: Option<String>,
    #[serde(default)]
    pub status_location: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScanEnvelope {
    #[serde(rename = "ScanDetail")]
    pub scan_detail: WireScan,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireScan {
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default)]
    pub scan: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub scan_date_time: Option<String>,
    #[serde(default)]
    pub scanned_location: Option<String>,
}
