//! Ticket comment posted alongside a phase transition (Jira wiki markup).
//!
//! Every comment ends with a phase marker so a later run can tell whether
//! the comment for the current phase already went out.

use awbsync_core::{Phase, ScanEvent, ShipmentRecord};
use chrono::NaiveDateTime;

/// Scans listed in the comment's history section.
const HISTORY_SCANS: usize = 3;

const MARKER_PREFIX: &str = "{{awbsync phase: ";

fn phase_marker(phase: Phase) -> String {
    format!("{MARKER_PREFIX}{}}}}}", phase.status_name())
}

/// Whether the newest marked comment in `recent` (newest first) was posted
/// for `phase`. Unmarked comments are ignored.
#[must_use]
pub fn already_commented(recent: &[String], phase: Phase) -> bool {
    let marker = phase_marker(phase);
    recent
        .iter()
        .find(|body| body.contains(MARKER_PREFIX))
        .is_some_and(|body| body.contains(&marker))
}

fn headline(phase: Phase, record: &ShipmentRecord) -> String {
    let day = |at: Option<NaiveDateTime>| {
        at.map(|t| format!(" on {}", t.format("%Y-%m-%d")))
            .unwrap_or_default()
    };
    match phase {
        Phase::PickupScheduled => "Pickup scheduled with the courier.".to_string(),
        Phase::InTransit => "Shipment is in transit.".to_string(),
        Phase::OutForDelivery => "Shipment is out for delivery.".to_string(),
        Phase::Delivered => format!("Shipment delivered{}.", day(record.delivered_at)),
        Phase::NonDeliveryReport => "Delivery attempt failed (NDR).".to_string(),
        Phase::ReturnInTransit => "Shipment is returning to origin.".to_string(),
        Phase::ReturnDelivered => {
            format!("Return delivered to origin{}.", day(record.returned_at))
        }
        Phase::PickupException => "Courier reported a pickup exception.".to_string(),
        Phase::Unknown => "Courier status could not be mapped.".to_string(),
    }
}

fn scan_line(scan: &ScanEvent) -> String {
    let when = scan
        .scanned_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!("* {when} {}", scan.scan);
    if !scan.location.is_empty() {
        line.push_str(&format!(" @ {}", scan.location));
    }
    if !scan.instruction.is_empty() {
        line.push_str(&format!(": {}", scan.instruction));
    }
    line
}

/// Render the comment for a ticket that just moved into `phase`.
#[must_use]
pub fn render_comment(phase: Phase, record: &ShipmentRecord) -> String {
    let mut lines = vec![
        format!("h4. {}", headline(phase, record)),
        format!("*AWB:* {}", record.awb),
    ];

    if !record.status.is_empty() {
        let mut status = format!("*Courier status:* {}", record.status);
        if !record.status_type.is_empty() {
            status.push_str(&format!(" ({})", record.status_type));
        }
        lines.push(status);
    }
    if let Some(instruction) = record.latest_instruction() {
        lines.push(format!("*Instruction:* {instruction}"));
    }
    if let Some(expected) = record.expected_delivery.or(record.promised_delivery) {
        if !phase.is_terminal() {
            lines.push(format!(
                "*Expected delivery:* {}",
                expected.format("%Y-%m-%d")
            ));
        }
    }

    let recent = record.recent_scans(HISTORY_SCANS);
    if !recent.is_empty() {
        lines.push(String::new());
        lines.push("*Recent scans:*".to_string());
        lines.extend(recent.iter().rev().map(scan_line));
    }

    lines.push(String::new());
    lines.push(phase_marker(phase));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(d: u32, h: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 3, d).and_then(|x| x.and_hms_opt(h, 30, 0))
    }

    fn record() -> ShipmentRecord {
        ShipmentRecord {
            awb: "1234567890".to_string(),
            status: "Delivered".to_string(),
            status_type: "DL".to_string(),
            instruction: "Delivered to consignee".to_string(),
            delivered_at: at(7, 15),
            expected_delivery: NaiveDate::from_ymd_opt(2024, 3, 8),
            scans: vec![
                ScanEvent {
                    scan_type: "UD".to_string(),
                    scan: "Manifested".to_string(),
                    scanned_at: at(5, 9),
                    ..ScanEvent::default()
                },
                ScanEvent {
                    scan_type: "UD".to_string(),
                    scan: "Dispatched".to_string(),
                    instruction: "Out for delivery".to_string(),
                    location: "Pune Hub".to_string(),
                    scanned_at: at(7, 8),
                },
            ],
            ..ShipmentRecord::default()
        }
    }

    #[test]
    fn delivered_comment_has_date_and_history() {
        let comment = render_comment(Phase::Delivered, &record());
        assert!(comment.starts_with("h4. Shipment delivered on 2024-03-07."));
        assert!(comment.contains("*AWB:* 1234567890"));
        assert!(comment.contains("*Courier status:* Delivered (DL)"));
        assert!(comment.contains("*Instruction:* Delivered to consignee"));
        assert!(!comment.contains("Expected delivery"));
        assert!(comment.contains("* 2024-03-07 08:30 Dispatched @ Pune Hub: Out for delivery"));

        let newest = comment.find("Dispatched").unwrap();
        let oldest = comment.find("Manifested").unwrap();
        assert!(newest < oldest, "scans should be newest first");
    }

    #[test]
    fn non_terminal_comment_shows_expected_delivery() {
        let comment = render_comment(Phase::OutForDelivery, &record());
        assert!(comment.starts_with("h4. Shipment is out for delivery."));
        assert!(comment.contains("*Expected delivery:* 2024-03-08"));
    }

    #[test]
    fn sparse_record_renders_without_sections() {
        let record = ShipmentRecord {
            awb: "42".to_string(),
            ..ShipmentRecord::default()
        };
        let comment = render_comment(Phase::ReturnDelivered, &record);
        assert_eq!(
            comment,
            "h4. Return delivered to origin.\n*AWB:* 42\n\n{{awbsync phase: Return Delivered}}"
        );
    }

    #[test]
    fn marker_of_newest_marked_comment_decides() {
        let delivered = render_comment(Phase::Delivered, &record());
        let in_transit = render_comment(Phase::InTransit, &record());

        let recent = vec!["thanks, noted".to_string(), delivered, in_transit.clone()];
        assert!(already_commented(&recent, Phase::Delivered));
        assert!(!already_commented(&recent, Phase::InTransit));

        // Back in transit after an NDR: the older in-transit comment does not count.
        let ndr = render_comment(Phase::NonDeliveryReport, &record());
        let recent = vec![ndr, in_transit];
        assert!(!already_commented(&recent, Phase::InTransit));

        assert!(!already_commented(&[], Phase::Delivered));
    }
}
