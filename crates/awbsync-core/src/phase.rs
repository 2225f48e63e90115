use serde::Serialize;

/// Canonical shipment lifecycle phase, independent of both the courier's and
/// the issue tracker's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PickupScheduled,
    InTransit,
    OutForDelivery,
    Delivered,
    NonDeliveryReport,
    ReturnInTransit,
    ReturnDelivered,
    PickupException,
    Unknown,
}

impl Phase {
    /// Every phase that can be applied to a ticket (everything but `Unknown`).
    pub const ACTIONABLE: [Phase; 8] = [
        Phase::PickupScheduled,
        Phase::InTransit,
        Phase::OutForDelivery,
        Phase::Delivered,
        Phase::NonDeliveryReport,
        Phase::ReturnInTransit,
        Phase::ReturnDelivered,
        Phase::PickupException,
    ];

    /// Canonical workflow status name for this phase.
    #[must_use]
    pub fn status_name(self) -> &'static str {
        match self {
            Phase::PickupScheduled => "Pickup Scheduled",
            Phase::InTransit => "In Transit",
            Phase::OutForDelivery => "Out For Delivery",
            Phase::Delivered => "Delivered",
            Phase::NonDeliveryReport => "NDR",
            Phase::ReturnInTransit => "Return In Transit",
            Phase::ReturnDelivered => "Return Delivered",
            Phase::PickupException => "Pickup Exception",
            Phase::Unknown => "Unknown",
        }
    }

    /// `true` for the phases that end a shipment's lifecycle and trigger the
    /// post-completion handoff.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Delivered | Phase::ReturnDelivered)
    }

    /// `true` for both return phases (in progress and completed).
    #[must_use]
    pub fn is_return(self) -> bool {
        matches!(self, Phase::ReturnInTransit | Phase::ReturnDelivered)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_delivered_and_return_delivered_are_terminal() {
        let terminal: Vec<Phase> = Phase::ACTIONABLE
            .into_iter()
            .filter(|p| p.is_terminal())
            .collect();
        assert_eq!(terminal, vec![Phase::Delivered, Phase::ReturnDelivered]);
        assert!(!Phase::Unknown.is_terminal());
    }

    #[test]
    fn return_phases() {
        assert!(Phase::ReturnInTransit.is_return());
        assert!(Phase::ReturnDelivered.is_return());
        assert!(!Phase::Delivered.is_return());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Phase::NonDeliveryReport).unwrap();
        assert_eq!(json, "\"non_delivery_report\"");
    }
}
