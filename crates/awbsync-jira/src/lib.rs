//! Jira REST client for the operations the reconciler needs: ticket search,
//! workflow transitions, field updates, comments and assignment.

mod client;
mod error;
pub mod jql;
mod normalize;
mod retry;
pub mod types;

pub use client::JiraClient;
pub use error::JiraError;
pub use normalize::ticket_from_issue;
