//! Mapping phases onto whatever the tracker's workflow calls them.
//!
//! Workflow status names drift (`"Return In-Transit"`, `"RTO In Transit"`,
//! `"Out for Delivery"`), so both sides are normalized to lowercase
//! alphanumerics before comparing against a per-phase alias list.

use awbsync_core::{Phase, TransitionCandidate};

const RETURN_MARKERS: [&str; 3] = ["return", "rto", "reverse"];
const MOVEMENT_MARKERS: [&str; 4] = ["transit", "moving", "enroute", "ontheway"];

fn aliases(phase: Phase) -> &'static [&'static str] {
    match phase {
        Phase::PickupScheduled => &["Pickup Scheduled", "Ready for Pickup", "Manifested"],
        Phase::InTransit => &["In Transit", "Shipped"],
        Phase::OutForDelivery => &["Out For Delivery", "OFD"],
        Phase::Delivered => &["Delivered"],
        Phase::NonDeliveryReport => &["NDR", "Non Delivery Report", "Delivery Failed"],
        Phase::ReturnInTransit => &[
            "Return In Transit",
            "RTO In Transit",
            "RTO Initiated",
            "Return Initiated",
        ],
        Phase::ReturnDelivered => &["Return Delivered", "RTO Delivered", "Returned"],
        Phase::PickupException => &["Pickup Exception", "Pickup Failed", "Not Picked"],
        Phase::Unknown => &[],
    }
}

/// Lowercase and keep only ASCII alphanumerics.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn is_alias(name: &str, phase: Phase) -> bool {
    let name = normalize(name);
    !name.is_empty() && aliases(phase).iter().any(|alias| normalize(alias) == name)
}

/// Normalized name carrying both a return marker and a movement marker.
fn is_return_movement(normalized: &str) -> bool {
    RETURN_MARKERS.iter().any(|m| normalized.contains(m))
        && MOVEMENT_MARKERS.iter().any(|m| normalized.contains(m))
}

/// `true` when the ticket's current status already represents `phase`.
///
/// Accepts everything [`resolve`] would have moved the ticket into,
/// including the return-movement fallback for [`Phase::ReturnInTransit`].
#[must_use]
pub fn status_matches(current_status: &str, phase: Phase) -> bool {
    is_alias(current_status, phase)
        || (phase == Phase::ReturnInTransit && is_return_movement(&normalize(current_status)))
}

/// Pick the transition that moves a ticket into `phase`.
///
/// Candidates are matched first on their target status, then on the
/// transition name, in alias order. For [`Phase::ReturnInTransit`] a target
/// carrying both a return marker and a movement marker is accepted as a
/// last resort. `None` means the phase cannot be applied this run.
#[must_use]
pub fn resolve(available: &[TransitionCandidate], phase: Phase) -> Option<&TransitionCandidate> {
    for alias in aliases(phase).iter().map(|a| normalize(a)) {
        if let Some(t) = available.iter().find(|t| normalize(&t.to_status) == alias) {
            return Some(t);
        }
    }
    for alias in aliases(phase).iter().map(|a| normalize(a)) {
        if let Some(t) = available.iter().find(|t| normalize(&t.name) == alias) {
            return Some(t);
        }
    }

    if phase == Phase::ReturnInTransit {
        return available.iter().find(|t| {
            let target = if t.to_status.is_empty() {
                normalize(&t.name)
            } else {
                normalize(&t.to_status)
            };
            is_return_movement(&target)
        });
    }

    None
}
