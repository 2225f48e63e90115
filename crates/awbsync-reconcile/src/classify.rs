//! Courier-state to [`Phase`] classification.
//!
//! Rules are evaluated in order and the first match wins; the order encodes
//! precedence (a completed return beats delivery evidence, delivery beats
//! an in-progress return, and so on). When no rule fires, the current status
//! label is looked up in a fixed table. Anything still unmatched is
//! [`Phase::Unknown`].

use awbsync_core::{Phase, ShipmentRecord};
use regex::Regex;

/// Number of most-recent scans inspected for return-type scan codes.
const RECENT_SCAN_WINDOW: usize = 8;

const DELIVERED_SCAN_TYPE: &str = "DL";
const RETURN_SCAN_TYPES: [&str; 2] = ["RT", "RTO"];

/// Instruction fragments that mean the shipment is still moving forward,
/// whatever the status label says.
const FORWARD_INSTRUCTIONS: [&str; 8] = [
    "consignee unavailable",
    "consignee not available",
    "arriving today",
    "office closed",
    "office/institute closed",
    "delivery rescheduled",
    "future delivery requested",
    "shipment in transit",
];

const VERIFIED_CANCELLATION: [&str; 3] = [
    "verified cancellation",
    "cancellation verified",
    "cancellation request verified",
];

/// Status label table consulted after every rule has declined.
const STATUS_LABELS: [(&str, Phase); 13] = [
    ("manifested", Phase::PickupScheduled),
    ("ready for pickup", Phase::PickupScheduled),
    ("pickup scheduled", Phase::PickupScheduled),
    ("picked up", Phase::InTransit),
    ("in transit", Phase::InTransit),
    ("pending", Phase::InTransit),
    ("dispatched", Phase::OutForDelivery),
    ("out for delivery", Phase::OutForDelivery),
    ("undelivered", Phase::NonDeliveryReport),
    ("not picked", Phase::PickupException),
    ("pickup exception", Phase::PickupException),
    ("cancelled", Phase::PickupException),
    ("canceled", Phase::PickupException),
];

/// Outcome of classification, with the name of the rule that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub phase: Phase,
    pub rule: &'static str,
}

struct Rule {
    name: &'static str,
    phase: Phase,
    applies: fn(&ShipmentRecord) -> bool,
}

const RULES: [Rule; 7] = [
    Rule {
        name: "return-completed",
        phase: Phase::ReturnDelivered,
        applies: return_completed,
    },
    Rule {
        name: "delivered",
        phase: Phase::Delivered,
        applies: delivered,
    },
    Rule {
        name: "return-in-progress",
        phase: Phase::ReturnInTransit,
        applies: return_in_progress,
    },
    Rule {
        name: "forward-instruction",
        phase: Phase::InTransit,
        applies: forward_instruction,
    },
    Rule {
        name: "return-initiated-instruction",
        phase: Phase::ReturnInTransit,
        applies: return_initiated_instruction,
    },
    Rule {
        name: "return-accepted-instruction",
        phase: Phase::ReturnDelivered,
        applies: return_accepted_instruction,
    },
    Rule {
        name: "not-attempted-instruction",
        phase: Phase::NonDeliveryReport,
        applies: not_attempted_instruction,
    },
];

/// Classify a courier snapshot into a canonical phase.
#[must_use]
pub fn classify(record: &ShipmentRecord) -> Phase {
    classify_explained(record).phase
}

/// Like [`classify`], also naming the rule that produced the phase
/// (`"status-label"` for the table fallback, `"unmapped"` for `Unknown`).
#[must_use]
pub fn classify_explained(record: &ShipmentRecord) -> Classification {
    if let Some(rule) = RULES.iter().find(|rule| (rule.applies)(record)) {
        return Classification {
            phase: rule.phase,
            rule: rule.name,
        };
    }

    match label_phase(&record.status) {
        Some(phase) => Classification {
            phase,
            rule: "status-label",
        },
        None => Classification {
            phase: Phase::Unknown,
            rule: "unmapped",
        },
    }
}

/// `true` when `text` records a verified cancellation by the consignee.
pub(crate) fn is_verified_cancellation(text: &str) -> bool {
    let lower = text.to_lowercase();
    VERIFIED_CANCELLATION.iter().any(|k| lower.contains(k))
}

fn label_phase(status: &str) -> Option<Phase> {
    let label = status
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    STATUS_LABELS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, phase)| *phase)
}

/// Current status label and instruction, lowercased, as one string.
fn status_text(record: &ShipmentRecord) -> String {
    format!("{} {}", record.status, record.instruction).to_lowercase()
}

fn instruction_text(record: &ShipmentRecord) -> String {
    record
        .latest_instruction()
        .unwrap_or_default()
        .to_lowercase()
}

fn mentions_return(text: &str) -> bool {
    Regex::new(r"(?i)\b(?:rto|returns?|returned)\b")
        .expect("valid regex")
        .is_match(text)
}

fn says_delivered(text: &str) -> bool {
    let delivered = Regex::new(r"(?i)\bdelivered\b").expect("valid regex");
    let negated = Regex::new(r"(?i)\bnot\s+(?:yet\s+)?delivered\b").expect("valid regex");
    delivered.is_match(text) && !negated.is_match(text)
}

fn return_completed(record: &ShipmentRecord) -> bool {
    if record.returned_at.is_some() {
        return true;
    }
    if record.status_type == DELIVERED_SCAN_TYPE && mentions_return(&status_text(record)) {
        return true;
    }
    record.scans.last().is_some_and(|scan| {
        scan.scan_type == DELIVERED_SCAN_TYPE
            && mentions_return(&format!("{} {}", scan.scan, scan.instruction))
    })
}

fn delivered(record: &ShipmentRecord) -> bool {
    if record.delivered_at.is_some()
        || record.status_type == DELIVERED_SCAN_TYPE
        || record
            .scans
            .last()
            .is_some_and(|scan| scan.scan_type == DELIVERED_SCAN_TYPE)
    {
        return true;
    }
    let text = status_text(record);
    says_delivered(&text) && !mentions_return(&text)
}

fn return_in_progress(record: &ShipmentRecord) -> bool {
    if RETURN_SCAN_TYPES.contains(&record.status_type.as_str())
        || record.reverse_in_transit
        || record.rto_started_at.is_some()
    {
        return true;
    }
    if record
        .recent_scans(RECENT_SCAN_WINDOW)
        .iter()
        .any(|scan| RETURN_SCAN_TYPES.contains(&scan.scan_type.as_str()))
    {
        return true;
    }
    Regex::new(
        r"(?i)\b(?:rto|return(?:ed)? to (?:origin|shipper|seller)|return in[- ]?transit|reverse pickup)\b",
    )
    .expect("valid regex")
    .is_match(&status_text(record))
}

fn forward_instruction(record: &ShipmentRecord) -> bool {
    let text = instruction_text(record);
    FORWARD_INSTRUCTIONS.iter().any(|k| text.contains(k))
}

fn return_initiated_instruction(record: &ShipmentRecord) -> bool {
    let text = instruction_text(record);
    text.contains("dispatched for rto") || is_verified_cancellation(&text)
}

fn return_accepted_instruction(record: &ShipmentRecord) -> bool {
    instruction_text(record).contains("return accepted")
}

fn not_attempted_instruction(record: &ShipmentRecord) -> bool {
    instruction_text(record).contains("not attempted")
}

#[cfg(test)]
mod tests {
    use awbsync_core::ScanEvent;
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32, hour: u32) -> Option<chrono::NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 3, day).and_then(|d| d.and_hms_opt(hour, 0, 0))
    }

    fn record(status: &str, status_type: &str, instruction: &str) -> ShipmentRecord {
        ShipmentRecord {
            awb: "1234567890".to_string(),
            status: status.to_string(),
            status_type: status_type.to_string(),
            instruction: instruction.to_string(),
            ..ShipmentRecord::default()
        }
    }

    fn scan(scan_type: &str, label: &str, instruction: &str) -> ScanEvent {
        ScanEvent {
            scan_type: scan_type.to_string(),
            scan: label.to_string(),
            instruction: instruction.to_string(),
            ..ScanEvent::default()
        }
    }

    #[test]
    fn returned_date_beats_delivery_date() {
        let mut r = record("Delivered", "DL", "");
        r.delivered_at = at(7, 15);
        r.returned_at = at(9, 11);
        let c = classify_explained(&r);
        assert_eq!(c.phase, Phase::ReturnDelivered);
        assert_eq!(c.rule, "return-completed");
    }

    #[test]
    fn delivery_beats_earlier_return_scan() {
        let mut r = record("Delivered", "DL", "Delivered to consignee");
        r.scans = vec![
            scan("RT", "In Transit", "Return initiated"),
            scan("UD", "Dispatched", "Out for delivery"),
        ];
        r.delivered_at = at(8, 12);
        assert_eq!(classify(&r), Phase::Delivered);
    }

    #[test]
    fn delivered_scan_as_latest_event_is_delivered() {
        let mut r = record("Pending", "UD", "");
        r.scans = vec![
            scan("UD", "Dispatched", "Out for delivery"),
            scan("DL", "Delivered", "Delivered to consignee"),
        ];
        assert_eq!(classify(&r), Phase::Delivered);
    }

    #[test]
    fn delivery_beats_return_flags() {
        let mut r = record("In Transit", "UD", "Shipment in transit");
        r.rto_started_at = at(6, 10);
        r.reverse_in_transit = true;
        r.delivered_at = at(8, 12);
        assert_eq!(classify(&r), Phase::Delivered);
    }

    #[test]
    fn terminal_scan_with_return_marker_is_return_delivered() {
        let r = record("RTO", "DL", "Returned to origin");
        assert_eq!(classify(&r), Phase::ReturnDelivered);

        let mut last_scan = record("Closed", "", "");
        last_scan.scans = vec![scan("DL", "RTO", "Shipment returned")];
        assert_eq!(classify(&last_scan), Phase::ReturnDelivered);
    }

    #[test]
    fn delivered_text_without_code_or_timestamp() {
        let r = record("Delivered", "", "");
        assert_eq!(classify(&r), Phase::Delivered);
    }

    #[test]
    fn negated_delivery_text_is_not_delivered() {
        let r = record("Pending", "UD", "Shipment not delivered");
        assert_ne!(classify(&r), Phase::Delivered);

        let undelivered = record("Undelivered", "UD", "");
        assert_eq!(classify(&undelivered), Phase::NonDeliveryReport);
    }

    #[test]
    fn return_signals_are_return_in_transit() {
        assert_eq!(
            classify(&record("In Transit", "RT", "")),
            Phase::ReturnInTransit
        );

        let mut reverse = record("In Transit", "UD", "");
        reverse.reverse_in_transit = true;
        assert_eq!(classify(&reverse), Phase::ReturnInTransit);

        let mut started = record("In Transit", "UD", "");
        started.rto_started_at = at(6, 10);
        assert_eq!(classify(&started), Phase::ReturnInTransit);

        assert_eq!(
            classify(&record("In Transit", "UD", "RTO - Consignee refused")),
            Phase::ReturnInTransit
        );
    }

    #[test]
    fn recent_return_scan_window_is_bounded() {
        let mut r = record("In Transit", "UD", "");
        r.scans = vec![scan("RT", "In Transit", "")];
        assert_eq!(classify(&r), Phase::ReturnInTransit);

        r.scans
            .extend((0..RECENT_SCAN_WINDOW).map(|_| scan("UD", "In Transit", "")));
        assert_eq!(classify(&r), Phase::InTransit);
    }

    #[test]
    fn forward_instruction_overrides_label() {
        let c = classify_explained(&record("Pending", "UD", "Consignee Unavailable"));
        assert_eq!(c.phase, Phase::InTransit);
        assert_eq!(c.rule, "forward-instruction");
    }

    #[test]
    fn instruction_rules() {
        assert_eq!(
            classify(&record("Pending", "UD", "Verified cancellation by customer")),
            Phase::ReturnInTransit
        );
        assert_eq!(
            classify(&record("Pending", "UD", "Return accepted")),
            Phase::ReturnDelivered
        );
        assert_eq!(
            classify(&record("Pending", "UD", "Not attempted - heavy rain")),
            Phase::NonDeliveryReport
        );
    }

    #[test]
    fn instruction_rules_read_latest_scan_when_status_has_none() {
        let mut r = record("Pending", "UD", "");
        r.scans = vec![scan("UD", "Pending", "Not attempted")];
        assert_eq!(classify(&r), Phase::NonDeliveryReport);
    }

    #[test]
    fn status_label_fallback() {
        let cases = [
            ("Manifested", Phase::PickupScheduled),
            ("Ready  for Pickup", Phase::PickupScheduled),
            ("In Transit", Phase::InTransit),
            ("Pending", Phase::InTransit),
            ("Dispatched", Phase::OutForDelivery),
            ("Not Picked", Phase::PickupException),
            ("Cancelled", Phase::PickupException),
        ];
        for (label, expected) in cases {
            let c = classify_explained(&record(label, "UD", ""));
            assert_eq!(c.phase, expected, "label {label:?}");
            assert_eq!(c.rule, "status-label", "label {label:?}");
        }
    }

    #[test]
    fn unmapped_status_is_unknown() {
        let c = classify_explained(&record("Lost in warehouse", "XX", ""));
        assert_eq!(c.phase, Phase::Unknown);
        assert_eq!(c.rule, "unmapped");
        assert_eq!(classify(&ShipmentRecord::default()), Phase::Unknown);
    }

    #[test]
    fn verified_cancellation_detection() {
        assert!(is_verified_cancellation("Cancellation VERIFIED by CS"));
        assert!(!is_verified_cancellation("Cancellation requested"));
    }
}
