//! Field reconciliation: which auxiliary ticket fields a courier snapshot
//! implies, filtered through a per-field write policy.

use std::collections::BTreeMap;

use awbsync_core::{AuxField, FieldValue, Phase, ScanEvent, ShipmentRecord, Ticket};
use chrono::NaiveDateTime;

use crate::classify::is_verified_cancellation;

/// How an auxiliary field may change once populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Set only while the ticket field is empty.
    WriteOnce,
    /// Refreshed whenever the derived value differs.
    Overwrite,
}

/// Field changes to apply to one ticket. Every entry differs from the
/// ticket's current value.
pub type FieldDelta = BTreeMap<AuxField, FieldValue>;

const FIELD_POLICIES: [(AuxField, WritePolicy); 9] = [
    (AuxField::DispatchDate, WritePolicy::Overwrite),
    (AuxField::DeliveryDate, WritePolicy::Overwrite),
    (AuxField::ReturnDeliveredDate, WritePolicy::Overwrite),
    (AuxField::PromisedDeliveryDate, WritePolicy::WriteOnce),
    (AuxField::LatestPromisedDeliveryDate, WritePolicy::Overwrite),
    (AuxField::ReturnReason, WritePolicy::WriteOnce),
    (AuxField::ReturnInitiatedDate, WritePolicy::WriteOnce),
    (AuxField::OutForDeliveryDate, WritePolicy::WriteOnce),
    (AuxField::LatestInstruction, WritePolicy::Overwrite),
];

const OUT_FOR_DELIVERY: &str = "out for delivery";

#[must_use]
pub fn policy_for(field: AuxField) -> WritePolicy {
    FIELD_POLICIES
        .iter()
        .find(|(f, _)| *f == field)
        .map_or(WritePolicy::Overwrite, |(_, policy)| *policy)
}

/// Compute the field changes `record` implies for `ticket` in `phase`.
#[must_use]
pub fn reconcile(ticket: &Ticket, record: &ShipmentRecord, phase: Phase) -> FieldDelta {
    derive_values(record, phase)
        .into_iter()
        .filter(|(field, value)| {
            let current = ticket.field(*field);
            match policy_for(*field) {
                WritePolicy::WriteOnce => current.is_none(),
                WritePolicy::Overwrite => current != Some(value),
            }
        })
        .collect()
}

/// Every value the snapshot supports, before policy filtering.
fn derive_values(record: &ShipmentRecord, phase: Phase) -> Vec<(AuxField, FieldValue)> {
    let mut values = Vec::new();
    let mut date = |field: AuxField, at: Option<NaiveDateTime>| {
        if let Some(at) = at {
            values.push((field, FieldValue::Date(at.date())));
        }
    };

    date(AuxField::DispatchDate, record.dispatched_at);
    if phase == Phase::Delivered {
        date(AuxField::DeliveryDate, record.delivered_at.or(record.status_at));
    }
    if phase == Phase::ReturnDelivered {
        date(
            AuxField::ReturnDeliveredDate,
            record.returned_at.or(record.status_at),
        );
    }
    date(AuxField::OutForDeliveryDate, out_for_delivery_at(record));

    if let Some(promised) = record.promised_delivery.or(record.expected_delivery) {
        values.push((AuxField::PromisedDeliveryDate, FieldValue::Date(promised)));
    }
    if let Some(latest) = record.expected_delivery.or(record.promised_delivery) {
        values.push((AuxField::LatestPromisedDeliveryDate, FieldValue::Date(latest)));
    }

    if phase.is_return() {
        if let Some(scan) = latest_verified_cancellation(record) {
            let reason = if scan.instruction.trim().is_empty() {
                scan.scan.trim()
            } else {
                scan.instruction.trim()
            };
            if !reason.is_empty() {
                values.push((AuxField::ReturnReason, FieldValue::Text(reason.to_string())));
            }
            if let Some(at) = scan.scanned_at {
                values.push((AuxField::ReturnInitiatedDate, FieldValue::Date(at.date())));
            }
        }
    }

    if let Some(instruction) = record.latest_instruction() {
        values.push((
            AuxField::LatestInstruction,
            FieldValue::Text(instruction.to_string()),
        ));
    }

    values
}

fn latest_verified_cancellation(record: &ShipmentRecord) -> Option<&ScanEvent> {
    record
        .scans
        .iter()
        .rev()
        .find(|scan| is_verified_cancellation(&scan.instruction))
}

/// Most recent out-for-delivery evidence: a matching scan, else a matching
/// current status, else the courier's explicit timestamp.
fn out_for_delivery_at(record: &ShipmentRecord) -> Option<NaiveDateTime> {
    let matches = |text: &str| text.to_lowercase().contains(OUT_FOR_DELIVERY);

    let from_scan = record
        .scans
        .iter()
        .rev()
        .filter(|scan| matches(&scan.scan) || matches(&scan.instruction))
        .find_map(|scan| scan.scanned_at);
    if from_scan.is_some() {
        return from_scan;
    }
    if matches(&record.status) || matches(&record.instruction) {
        if let Some(at) = record.status_at {
            return Some(at);
        }
    }
    record.out_for_delivery_at
}
