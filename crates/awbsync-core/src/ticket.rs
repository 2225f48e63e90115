use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Auxiliary ticket fields maintained by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxField {
    DispatchDate,
    DeliveryDate,
    ReturnDeliveredDate,
    PromisedDeliveryDate,
    LatestPromisedDeliveryDate,
    ReturnReason,
    ReturnInitiatedDate,
    OutForDeliveryDate,
    LatestInstruction,
}

/// Storage shape of an auxiliary field on the tracker side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Date,
    Text,
}

impl AuxField {
    pub const ALL: [AuxField; 9] = [
        AuxField::DispatchDate,
        AuxField::DeliveryDate,
        AuxField::ReturnDeliveredDate,
        AuxField::PromisedDeliveryDate,
        AuxField::LatestPromisedDeliveryDate,
        AuxField::ReturnReason,
        AuxField::ReturnInitiatedDate,
        AuxField::OutForDeliveryDate,
        AuxField::LatestInstruction,
    ];

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            AuxField::ReturnReason | AuxField::LatestInstruction => FieldKind::Text,
            _ => FieldKind::Date,
        }
    }
}

/// A concrete auxiliary field value, either a calendar date or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Parses a raw tracker value for a field of the given kind.
    ///
    /// Blank input is `None`. Date fields accept both `YYYY-MM-DD` and
    /// date-time strings (only the date part is kept); a date field holding
    /// something unparseable is kept as text so it still counts as populated.
    #[must_use]
    pub fn parse(kind: FieldKind, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match kind {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Date => {
                let date = raw
                    .get(..10)
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
                Some(date.map_or_else(|| FieldValue::Text(raw.to_string()), FieldValue::Date))
            }
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Text(t) => f.write_str(t),
        }
    }
}

/// Issue-tracker record as read at the start of a reconciliation.
#[derive(Debug, Clone, Default)]
pub struct Ticket {
    pub key: String,
    pub status: String,
    /// Raw content of the tracking-number-bearing field.
    pub awb_source: Option<String>,
    /// Populated auxiliary fields only; an absent key means empty.
    pub fields: BTreeMap<AuxField, FieldValue>,
}

impl Ticket {
    #[must_use]
    pub fn field(&self, field: AuxField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }
}

/// A workflow transition the tracker currently offers for a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCandidate {
    pub id: String,
    pub name: String,
    /// Name of the status the ticket lands in after the transition.
    pub to_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_blank_is_none() {
        assert_eq!(FieldValue::parse(FieldKind::Date, "   "), None);
        assert_eq!(FieldValue::parse(FieldKind::Text, ""), None);
    }

    #[test]
    fn parse_date_and_datetime() {
        let expected = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(
            FieldValue::parse(FieldKind::Date, "2024-03-05"),
            Some(expected.clone())
        );
        assert_eq!(
            FieldValue::parse(FieldKind::Date, "2024-03-05T10:15:00.000+0530"),
            Some(expected)
        );
    }

    #[test]
    fn unparseable_date_is_kept_as_text() {
        assert_eq!(
            FieldValue::parse(FieldKind::Date, "soon"),
            Some(FieldValue::Text("soon".to_string()))
        );
    }

    #[test]
    fn serializes_dates_as_iso_strings() {
        let value = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(serde_json::to_value(&value).unwrap(), "2024-12-01");
        assert_eq!(value.to_string(), "2024-12-01");
    }

    #[test]
    fn text_fields() {
        assert_eq!(AuxField::ReturnReason.kind(), FieldKind::Text);
        assert_eq!(AuxField::LatestInstruction.kind(), FieldKind::Text);
        assert_eq!(AuxField::DispatchDate.kind(), FieldKind::Date);
    }
}
