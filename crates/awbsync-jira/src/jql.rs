//! JQL builders for candidate-ticket selection.

/// Quotes a JQL string literal.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// JQL reference for a field id: `customfield_10050` becomes `cf[10050]`;
/// any other id is quoted as a field name.
#[must_use]
pub fn field_ref(field_id: &str) -> String {
    match field_id.strip_prefix("customfield_") {
        Some(num) if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) => {
            format!("cf[{num}]")
        }
        _ => quote(field_id),
    }
}

/// Tickets in `project` that carry a tracking number, were created within
/// the last `lookback_days`, and are not in one of `excluded_statuses`.
#[must_use]
pub fn candidate_tickets(
    project: &str,
    awb_field: &str,
    lookback_days: u32,
    excluded_statuses: &[String],
) -> String {
    let mut clauses = vec![
        format!("project = {}", quote(project)),
        format!("{} is not EMPTY", field_ref(awb_field)),
        format!("created >= -{lookback_days}d"),
    ];
    if !excluded_statuses.is_empty() {
        let list = excluded_statuses
            .iter()
            .map(|s| quote(s))
            .collect::<Vec<_>>()
            .join(", ");
        clauses.push(format!("status not in ({list})"));
    }
    format!("{} ORDER BY created ASC", clauses.join(" AND "))
}

/// Restricts a search to exactly one ticket key.
#[must_use]
pub fn single_ticket(key: &str) -> String {
    format!("key = {}", quote(key))
}
