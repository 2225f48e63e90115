//! Tracking-number extraction from the free-form ticket field.

use regex::Regex;

/// Extract a courier tracking number (AWB) from a ticket field value.
///
/// The field may hold a bare number, a `key=value` fragment, or a full
/// tracking URL. Recognised forms, tried in order:
/// - `awb=1234567890`, `waybill: 1234567890`, `tracking_number=...`
/// - `https://courier.example/track/1234567890`
/// - any standalone run of 10 to 14 digits
#[must_use]
pub fn extract_awb(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let patterns = [
        r"(?i)\b(?:awb(?:[_ -]?no)?|waybill|tracking(?:[_ -]?(?:no|number|id))?)\s*[=:]\s*([0-9]+)",
        r"(?i)/(?:track(?:ing)?|package|p|awb)/([0-9]+)",
        r"(?:^|[^0-9])([0-9]{10,14})(?:[^0-9]|$)",
    ];

    for pattern in &patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(text) {
            if let Some(m) = cap.get(1) {
                return Some(m.as_str().to_string());
            }
        }
    }

    None
}
