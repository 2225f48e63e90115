//! Conversion of raw Jira issues into [`Ticket`]s.

use std::collections::BTreeMap;

use awbsync_core::{AuxField, FieldIds, FieldValue, Ticket};
use serde_json::Value;

use crate::types::Issue;

/// Flattens a Jira field value to text.
///
/// Handles plain strings and numbers plus the `{"value": ..}` /
/// `{"name": ..}` objects select-style fields use. Anything else is `None`.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => obj
            .get("value")
            .or_else(|| obj.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Builds a [`Ticket`] from a search hit, reading the tracking field and
/// every auxiliary field through the configured ids.
#[must_use]
pub fn ticket_from_issue(issue: Issue, ids: &FieldIds) -> Ticket {
    let fields = &issue.fields;

    let status = fields
        .get("status")
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let awb_source = fields
        .get(&ids.awb)
        .and_then(field_text)
        .filter(|s| !s.trim().is_empty());

    let aux: BTreeMap<AuxField, FieldValue> = AuxField::ALL
        .into_iter()
        .filter_map(|field| {
            let raw = fields.get(ids.id_for(field)).and_then(field_text)?;
            FieldValue::parse(field.kind(), &raw).map(|v| (field, v))
        })
        .collect();

    Ticket {
        key: issue.key,
        status,
        awb_source,
        fields: aux,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn ids() -> FieldIds {
        FieldIds {
            awb: "customfield_1".to_string(),
            dispatch_date: "customfield_2".to_string(),
            delivery_date: "customfield_3".to_string(),
            return_delivered_date: "customfield_4".to_string(),
            promised_delivery_date: "customfield_5".to_string(),
            latest_promised_delivery_date: "customfield_6".to_string(),
            return_reason: "customfield_7".to_string(),
            return_initiated_date: "customfield_8".to_string(),
            out_for_delivery_date: "customfield_9".to_string(),
            latest_instruction: "customfield_10".to_string(),
        }
    }

    fn issue(fields: Value) -> Issue {
        serde_json::from_value(json!({ "key": "OPS-7", "fields": fields })).unwrap()
    }

    #[test]
    fn reads_status_awb_and_populated_fields() {
        let ticket = ticket_from_issue(
            issue(json!({
                "status": { "name": "In Transit" },
                "customfield_1": "https://track.example.com/track/1234567890",
                "customfield_2": "2024-03-05",
                "customfield_5": "2024-03-09T00:00:00.000+0530",
                "customfield_7": null,
                "customfield_10": "  Arriving today  "
            })),
            &ids(),
        );

        assert_eq!(ticket.key, "OPS-7");
        assert_eq!(ticket.status, "In Transit");
        assert_eq!(
            ticket.awb_source.as_deref(),
            Some("https://track.example.com/track/1234567890")
        );
        assert_eq!(
            ticket.field(AuxField::DispatchDate),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()))
        );
        assert_eq!(
            ticket.field(AuxField::PromisedDeliveryDate),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()))
        );
        assert_eq!(
            ticket.field(AuxField::LatestInstruction),
            Some(&FieldValue::Text("Arriving today".to_string()))
        );
        assert!(ticket.field(AuxField::ReturnReason).is_none());
        assert_eq!(ticket.fields.len(), 3);
    }

    #[test]
    fn numeric_and_select_values_are_flattened() {
        let ticket = ticket_from_issue(
            issue(json!({
                "status": { "name": "Open" },
                "customfield_1": 1234567890123_u64,
                "customfield_7": { "value": "Customer refused" }
            })),
            &ids(),
        );
        assert_eq!(ticket.awb_source.as_deref(), Some("1234567890123"));
        assert_eq!(
            ticket.field(AuxField::ReturnReason),
            Some(&FieldValue::Text("Customer refused".to_string()))
        );
    }

    #[test]
    fn blank_tracking_field_is_none() {
        let ticket = ticket_from_issue(issue(json!({ "customfield_1": "  " })), &ids());
        assert!(ticket.awb_source.is_none());
        assert!(ticket.status.is_empty());
    }
}
