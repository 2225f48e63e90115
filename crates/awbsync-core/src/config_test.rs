use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid values.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("AWBSYNC_COURIER_TOKEN", "courier-token");
    m.insert("JIRA_BASE_URL", "https://example.atlassian.net");
    m.insert("JIRA_EMAIL", "ops@example.com");
    m.insert("JIRA_API_TOKEN", "jira-token");
    m.insert("JIRA_PROJECT_KEY", "OPS");
    m.insert("AWBSYNC_FIELD_AWB", "customfield_10050");
    m.insert("AWBSYNC_FIELD_DISPATCH_DATE", "customfield_10051");
    m.insert("AWBSYNC_FIELD_DELIVERY_DATE", "customfield_10052");
    m.insert("AWBSYNC_FIELD_RETURN_DELIVERED_DATE", "customfield_10053");
    m.insert("AWBSYNC_FIELD_PROMISED_DELIVERY_DATE", "customfield_10054");
    m.insert(
        "AWBSYNC_FIELD_LATEST_PROMISED_DELIVERY_DATE",
        "customfield_10055",
    );
    m.insert("AWBSYNC_FIELD_RETURN_REASON", "customfield_10056");
    m.insert("AWBSYNC_FIELD_RETURN_INITIATED_DATE", "customfield_10057");
    m.insert("AWBSYNC_FIELD_OUT_FOR_DELIVERY_DATE", "customfield_10058");
    m.insert("AWBSYNC_FIELD_LATEST_INSTRUCTION", "customfield_10059");
    m.insert("AWBSYNC_COMPLETION_ASSIGNEE", "5b10a2844c20165700ede21g");
    m
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.courier_base_url, "https://track.delhivery.com");
    assert_eq!(cfg.jira_project_key, "OPS");
    assert_eq!(cfg.field_ids.awb, "customfield_10050");
    assert_eq!(cfg.field_ids.latest_instruction, "customfield_10059");
    assert_eq!(cfg.lookback_days, 30);
    assert_eq!(
        cfg.excluded_statuses,
        vec!["Delivered", "Return Delivered", "Closed"]
    );
    assert_eq!(cfg.ticket_delay_ms, 1000);
    assert_eq!(cfg.max_attempts, 3);
    assert_eq!(cfg.retry_delay_ms, 2000);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "awbsync/0.1 (shipment-reconciler)");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.schedule, "0 */30 * * * *");
    assert!(cfg.debug_ticket.is_none());
    assert!(cfg.debug_awb.is_none());
}

#[test]
fn build_app_config_lists_every_missing_var() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    let Err(ConfigError::MissingEnvVars(vars)) = &result else {
        panic!("expected MissingEnvVars, got: {result:?}");
    };
    assert_eq!(vars.len(), 16);
    assert_eq!(vars[0], "AWBSYNC_COURIER_TOKEN");
    assert!(vars.contains(&"AWBSYNC_FIELD_RETURN_REASON".to_string()));
    assert!(vars.contains(&"AWBSYNC_COMPLETION_ASSIGNEE".to_string()));
}

#[test]
fn build_app_config_reports_only_the_missing_subset() {
    let mut map = full_env();
    map.remove("JIRA_API_TOKEN");
    map.remove("AWBSYNC_FIELD_DELIVERY_DATE");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::MissingEnvVars(ref v))
                if v == &["JIRA_API_TOKEN", "AWBSYNC_FIELD_DELIVERY_DATE"]
        ),
        "expected two missing vars, got: {result:?}"
    );
}

#[test]
fn blank_required_var_counts_as_missing() {
    let mut map = full_env();
    map.insert("JIRA_PROJECT_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVars(ref v)) if v == &["JIRA_PROJECT_KEY"]),
        "expected MissingEnvVars(JIRA_PROJECT_KEY), got: {result:?}"
    );
}

#[test]
fn missing_vars_error_message_names_all_vars() {
    let err = ConfigError::MissingEnvVars(vec!["A".to_string(), "B".to_string()]);
    assert_eq!(err.to_string(), "missing required environment variables: A, B");
}

#[test]
fn lookback_days_override() {
    let mut map = full_env();
    map.insert("AWBSYNC_LOOKBACK_DAYS", "7");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.lookback_days, 7);
}

#[test]
fn lookback_days_invalid() {
    let mut map = full_env();
    map.insert("AWBSYNC_LOOKBACK_DAYS", "a week");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AWBSYNC_LOOKBACK_DAYS"),
        "expected InvalidEnvVar(AWBSYNC_LOOKBACK_DAYS), got: {result:?}"
    );
}

#[test]
fn ticket_delay_ms_override() {
    let mut map = full_env();
    map.insert("AWBSYNC_TICKET_DELAY_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.ticket_delay_ms, 250);
}

#[test]
fn retry_knobs_override() {
    let mut map = full_env();
    map.insert("AWBSYNC_MAX_ATTEMPTS", "5");
    map.insert("AWBSYNC_RETRY_DELAY_MS", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_attempts, 5);
    assert_eq!(cfg.retry_delay_ms, 10);
}

#[test]
fn zero_max_attempts_is_rejected() {
    let mut map = full_env();
    map.insert("AWBSYNC_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AWBSYNC_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(AWBSYNC_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn retry_delay_ms_invalid() {
    let mut map = full_env();
    map.insert("AWBSYNC_RETRY_DELAY_MS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AWBSYNC_RETRY_DELAY_MS"),
        "expected InvalidEnvVar(AWBSYNC_RETRY_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn excluded_statuses_are_trimmed_and_blank_entries_dropped() {
    let mut map = full_env();
    map.insert("AWBSYNC_EXCLUDED_STATUSES", " Delivered , ,Cancelled,");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.excluded_statuses, vec!["Delivered", "Cancelled"]);
}

#[test]
fn debug_filters_are_read_when_set() {
    let mut map = full_env();
    map.insert("AWBSYNC_DEBUG_TICKET", "OPS-42");
    map.insert("AWBSYNC_DEBUG_AWB", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.debug_ticket.as_deref(), Some("OPS-42"));
    assert!(cfg.debug_awb.is_none(), "blank debug filter is treated as unset");
}

#[test]
fn debug_output_redacts_secrets() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("courier-token"));
    assert!(!rendered.contains("jira-token"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn field_ids_all_ids_starts_with_tracking_field() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let ids = cfg.field_ids.all_ids();
    assert_eq!(ids.len(), 10);
    assert_eq!(ids[0], "customfield_10050");
    assert!(ids.contains(&"customfield_10059"));
}
