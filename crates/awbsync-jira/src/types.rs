//! Jira REST v2 response types (only the parts the reconciler reads).

use serde::Deserialize;

/// One page of `GET /rest/api/2/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// An issue with its requested fields left as raw JSON; the field set is
/// configuration-driven (custom field ids), so it is not modeled statically.
#[derive(Debug, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// `GET /rest/api/2/issue/{key}/transitions`.
#[derive(Debug, Deserialize)]
pub struct TransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<WireTransition>,
}

#[derive(Debug, Deserialize)]
pub struct WireTransition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub to: Option<StatusRef>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRef {
    pub name: String,
}

/// `GET /rest/api/2/issue/{key}/comment`.
#[derive(Debug, Deserialize)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<WireComment>,
}

#[derive(Debug, Deserialize)]
pub struct WireComment {
    #[serde(default)]
    pub body: String,
}
