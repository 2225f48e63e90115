//! HTTP client for the Jira REST v2 API.
//!
//! Authenticates with basic auth (account email + API token). Every request
//! goes through [`retry_fixed`], so transient failures are retried a fixed
//! number of times before the error reaches the caller.

use std::time::Duration;

use awbsync_core::{AppConfig, FieldIds, Ticket, TransitionCandidate};
use reqwest::{Client, Method, Url};
use serde_json::{json, Value};

use crate::error::JiraError;
use crate::normalize::ticket_from_issue;
use crate::retry::{is_retriable, is_retriable_write, retry_fixed};
use crate::types::{CommentsResponse, SearchResponse, TransitionsResponse};

/// Page size requested from the search endpoint.
const PAGE_SIZE: u32 = 50;

/// Number of most recent comments read back by [`JiraClient::recent_comments`].
const RECENT_COMMENTS: u32 = 50;

/// Maximum number of search pages fetched before giving up.
pub(crate) const MAX_PAGES: usize = 100;

/// Client for the subset of the Jira REST API the reconciler uses.
pub struct JiraClient {
    client: Client,
    base_url: Url,
    email: String,
    api_token: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl JiraClient {
    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::Http`] if the `reqwest::Client` cannot be built
    /// or [`JiraError::InvalidBaseUrl`] if the base URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, JiraError> {
        Self::with_base_url(
            &config.jira_base_url,
            &config.jira_email,
            &config.jira_api_token,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_attempts,
            config.retry_delay_ms,
        )
    }

    /// Creates a client against an explicit base URL (wiremock in tests).
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::Http`] if the `reqwest::Client` cannot be built
    /// or [`JiraError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        email: &str,
        api_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, JiraError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| JiraError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            email: email.to_owned(),
            api_token: api_token.to_owned(),
            max_attempts,
            retry_delay: Duration::from_millis(retry_delay_ms),
        })
    }

    /// Runs `jql` and returns every matching ticket, following pagination.
    ///
    /// # Errors
    ///
    /// - [`JiraError::PaginationLimit`] if more than [`MAX_PAGES`] pages are needed.
    /// - Any request error from [`JiraClient::search_page`].
    pub async fn search_tickets(
        &self,
        jql: &str,
        field_ids: &FieldIds,
    ) -> Result<Vec<Ticket>, JiraError> {
        let mut fields = vec!["status"];
        fields.extend(field_ids.all_ids());

        let mut tickets = Vec::new();
        let mut start_at = 0u32;
        for _ in 0..MAX_PAGES {
            let page = self.search_page(jql, &fields, start_at).await?;
            let fetched = u32::try_from(page.issues.len()).unwrap_or(u32::MAX);
            tickets.extend(
                page.issues
                    .into_iter()
                    .map(|issue| ticket_from_issue(issue, field_ids)),
            );
            start_at = page.start_at.saturating_add(fetched);
            if fetched == 0 || start_at >= page.total {
                return Ok(tickets);
            }
        }
        Err(JiraError::PaginationLimit {
            max_pages: MAX_PAGES,
        })
    }

    /// Fetches one page of search results.
    ///
    /// # Errors
    ///
    /// Returns the request error after retries, or [`JiraError::Deserialize`]
    /// if the body is not a search response.
    pub async fn search_page(
        &self,
        jql: &str,
        fields: &[&str],
        start_at: u32,
    ) -> Result<SearchResponse, JiraError> {
        let mut url = self.api_url("search");
        url.query_pairs_mut()
            .append_pair("jql", jql)
            .append_pair("startAt", &start_at.to_string())
            .append_pair("maxResults", &PAGE_SIZE.to_string())
            .append_pair("fields", &fields.join(","));

        let body = self.send("search", Method::GET, url, None).await?;
        serde_json::from_str(&body).map_err(|e| JiraError::Deserialize {
            context: format!("search page at {start_at}"),
            source: e,
        })
    }

    /// Lists the transitions currently available for `key`.
    ///
    /// # Errors
    ///
    /// Returns the request error after retries, or [`JiraError::Deserialize`]
    /// if the body is not a transitions response.
    pub async fn transitions(&self, key: &str) -> Result<Vec<TransitionCandidate>, JiraError> {
        let url = self.api_url(&format!("issue/{key}/transitions"));
        let body = self.send("transitions", Method::GET, url, None).await?;
        let parsed: TransitionsResponse =
            serde_json::from_str(&body).map_err(|e| JiraError::Deserialize {
                context: format!("transitions for {key}"),
                source: e,
            })?;

        Ok(parsed
            .transitions
            .into_iter()
            .map(|t| TransitionCandidate {
                to_status: t.to.map(|s| s.name).unwrap_or_default(),
                id: t.id,
                name: t.name,
            })
            .collect())
    }

    /// Executes transition `transition_id` on `key`.
    ///
    /// # Errors
    ///
    /// Returns the request error after retries.
    pub async fn transition(&self, key: &str, transition_id: &str) -> Result<(), JiraError> {
        let url = self.api_url(&format!("issue/{key}/transitions"));
        let body = json!({ "transition": { "id": transition_id } });
        self.send("transition", Method::POST, url, Some(&body))
            .await
            .map(drop)
    }

    /// Sets the given field values on `key` in one request.
    ///
    /// # Errors
    ///
    /// Returns the request error after retries.
    pub async fn update_fields(
        &self,
        key: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<(), JiraError> {
        let url = self.api_url(&format!("issue/{key}"));
        let body = json!({ "fields": fields });
        self.send("update_fields", Method::PUT, url, Some(&body))
            .await
            .map(drop)
    }

    /// Returns the bodies of the most recent comments on `key`, newest first.
    ///
    /// # Errors
    ///
    /// Returns the request error after retries, or [`JiraError::Deserialize`]
    /// if the body is not a comment listing.
    pub async fn recent_comments(&self, key: &str) -> Result<Vec<String>, JiraError> {
        let mut url = self.api_url(&format!("issue/{key}/comment"));
        url.query_pairs_mut()
            .append_pair("orderBy", "-created")
            .append_pair("maxResults", &RECENT_COMMENTS.to_string());

        let body = self.send("recent_comments", Method::GET, url, None).await?;
        let parsed: CommentsResponse =
            serde_json::from_str(&body).map_err(|e| JiraError::Deserialize {
                context: format!("comments for {key}"),
                source: e,
            })?;
        Ok(parsed.comments.into_iter().map(|c| c.body).collect())
    }

    /// Appends a comment to `key`. Not retried once the request may have
    /// reached Jira.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    pub async fn add_comment(&self, key: &str, comment: &str) -> Result<(), JiraError> {
        let url = self.api_url(&format!("issue/{key}/comment"));
        let body = json!({ "body": comment });
        self.send("add_comment", Method::POST, url, Some(&body))
            .await
            .map(drop)
    }

    /// Assigns `key` to the user with `account_id`.
    ///
    /// # Errors
    ///
    /// Returns the request error after retries.
    pub async fn assign(&self, key: &str, account_id: &str) -> Result<(), JiraError> {
        let url = self.api_url(&format!("issue/{key}/assignee"));
        let body = json!({ "accountId": account_id });
        self.send("assign", Method::PUT, url, Some(&body))
            .await
            .map(drop)
    }

    fn api_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().extend(["rest", "api", "2"]);
                segments.extend(path.split('/'));
            })
            .ok();
        url
    }

    /// Sends a request with retries and returns the response body text.
    ///
    /// `POST`s (transition, comment) are not idempotent and are retried only
    /// when Jira cannot have applied them; reads and `PUT`s retry on any
    /// transient failure.
    async fn send(
        &self,
        op_name: &str,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<String, JiraError> {
        let retriable = if method == Method::POST {
            is_retriable_write
        } else {
            is_retriable
        };
        retry_fixed(self.max_attempts, self.retry_delay, op_name, retriable, || {
            let method = method.clone();
            let url = url.clone();
            async move { self.send_once(method, url, body).await }
        })
        .await
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<String, JiraError> {
        let mut request = self
            .client
            .request(method, url.clone())
            .basic_auth(&self.email, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(JiraError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(JiraError::NotFound {
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(JiraError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: text.chars().take(500).collect(),
            });
        }
        Ok(text)
    }
}
