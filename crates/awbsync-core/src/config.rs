use crate::app_config::{AppConfig, FieldIds};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Missing required variables are collected rather than returned one at a
/// time, so the resulting [`ConfigError::MissingEnvVars`] names all of them.
/// Blank values count as missing.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let present = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let missing = std::cell::RefCell::new(Vec::<String>::new());
    let require = |var: &str| -> String {
        present(var).unwrap_or_else(|| {
            missing.borrow_mut().push(var.to_string());
            String::new()
        })
    };

    let or_default = |var: &str, default: &str| -> String {
        present(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let courier_token = require("AWBSYNC_COURIER_TOKEN");
    let jira_base_url = require("JIRA_BASE_URL");
    let jira_email = require("JIRA_EMAIL");
    let jira_api_token = require("JIRA_API_TOKEN");
    let jira_project_key = require("JIRA_PROJECT_KEY");
    let field_ids = FieldIds {
        awb: require("AWBSYNC_FIELD_AWB"),
        dispatch_date: require("AWBSYNC_FIELD_DISPATCH_DATE"),
        delivery_date: require("AWBSYNC_FIELD_DELIVERY_DATE"),
        return_delivered_date: require("AWBSYNC_FIELD_RETURN_DELIVERED_DATE"),
        promised_delivery_date: require("AWBSYNC_FIELD_PROMISED_DELIVERY_DATE"),
        latest_promised_delivery_date: require("AWBSYNC_FIELD_LATEST_PROMISED_DELIVERY_DATE"),
        return_reason: require("AWBSYNC_FIELD_RETURN_REASON"),
        return_initiated_date: require("AWBSYNC_FIELD_RETURN_INITIATED_DATE"),
        out_for_delivery_date: require("AWBSYNC_FIELD_OUT_FOR_DELIVERY_DATE"),
        latest_instruction: require("AWBSYNC_FIELD_LATEST_INSTRUCTION"),
    };
    let completion_assignee = require("AWBSYNC_COMPLETION_ASSIGNEE");

    let missing = missing.into_inner();
    if !missing.is_empty() {
        return Err(ConfigError::MissingEnvVars(missing));
    }

    let courier_base_url = or_default("AWBSYNC_COURIER_BASE_URL", "https://track.delhivery.com");
    let lookback_days = parse_u32("AWBSYNC_LOOKBACK_DAYS", "30")?;
    let excluded_statuses = parse_list(&or_default(
        "AWBSYNC_EXCLUDED_STATUSES",
        "Delivered,Return Delivered,Closed",
    ));
    let ticket_delay_ms = parse_u64("AWBSYNC_TICKET_DELAY_MS", "1000")?;
    let max_attempts = parse_u32("AWBSYNC_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AWBSYNC_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let retry_delay_ms = parse_u64("AWBSYNC_RETRY_DELAY_MS", "2000")?;
    let request_timeout_secs = parse_u64("AWBSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("AWBSYNC_USER_AGENT", "awbsync/0.1 (shipment-reconciler)");
    let log_level = or_default("AWBSYNC_LOG_LEVEL", "info");
    let schedule = or_default("AWBSYNC_SCHEDULE", "0 */30 * * * *");
    let debug_ticket = present("AWBSYNC_DEBUG_TICKET");
    let debug_awb = present("AWBSYNC_DEBUG_AWB");

    Ok(AppConfig {
        courier_base_url,
        courier_token,
        jira_base_url,
        jira_email,
        jira_api_token,
        jira_project_key,
        field_ids,
        completion_assignee,
        lookback_days,
        excluded_statuses,
        ticket_delay_ms,
        max_attempts,
        retry_delay_ms,
        request_timeout_secs,
        user_agent,
        log_level,
        schedule,
        debug_ticket,
        debug_awb,
    })
}

/// Splits a comma-separated list, dropping blank entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
