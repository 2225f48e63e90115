use crate::ticket::AuxField;

/// Tracker field identifiers (e.g. `customfield_10050`) for the tracking
/// number field and every auxiliary field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIds {
    pub awb: String,
    pub dispatch_date: String,
    pub delivery_date: String,
    pub return_delivered_date: String,
    pub promised_delivery_date: String,
    pub latest_promised_delivery_date: String,
    pub return_reason: String,
    pub return_initiated_date: String,
    pub out_for_delivery_date: String,
    pub latest_instruction: String,
}

impl FieldIds {
    #[must_use]
    pub fn id_for(&self, field: AuxField) -> &str {
        match field {
            AuxField::DispatchDate => &self.dispatch_date,
            AuxField::DeliveryDate => &self.delivery_date,
            AuxField::ReturnDeliveredDate => &self.return_delivered_date,
            AuxField::PromisedDeliveryDate => &self.promised_delivery_date,
            AuxField::LatestPromisedDeliveryDate => &self.latest_promised_delivery_date,
            AuxField::ReturnReason => &self.return_reason,
            AuxField::ReturnInitiatedDate => &self.return_initiated_date,
            AuxField::OutForDeliveryDate => &self.out_for_delivery_date,
            AuxField::LatestInstruction => &self.latest_instruction,
        }
    }

    /// Every field id a ticket search has to request, tracking field first.
    #[must_use]
    pub fn all_ids(&self) -> Vec<&str> {
        std::iter::once(self.awb.as_str())
            .chain(AuxField::ALL.into_iter().map(|f| self.id_for(f)))
            .collect()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub courier_base_url: String,
    pub courier_token: String,
    pub jira_base_url: String,
    pub jira_email: String,
    pub jira_api_token: String,
    pub jira_project_key: String,
    pub field_ids: FieldIds,
    pub completion_assignee: String,
    pub lookback_days: u32,
    /// Workflow statuses whose tickets are never selected for reconciliation.
    pub excluded_statuses: Vec<String>,
    pub ticket_delay_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
    pub schedule: String,
    pub debug_ticket: Option<String>,
    pub debug_awb: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("courier_base_url", &self.courier_base_url)
            .field("courier_token", &"[redacted]")
            .field("jira_base_url", &self.jira_base_url)
            .field("jira_email", &self.jira_email)
            .field("jira_api_token", &"[redacted]")
            .field("jira_project_key", &self.jira_project_key)
            .field("field_ids", &self.field_ids)
            .field("completion_assignee", &self.completion_assignee)
            .field("lookback_days", &self.lookback_days)
            .field("excluded_statuses", &self.excluded_statuses)
            .field("ticket_delay_ms", &self.ticket_delay_ms)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .field("schedule", &self.schedule)
            .field("debug_ticket", &self.debug_ticket)
            .field("debug_awb", &self.debug_awb)
            .finish()
    }
}
