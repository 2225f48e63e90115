//! Reconciliation driver: selects candidate tickets and takes each one
//! through extract → fetch → classify → field delta → transition.
//!
//! Tickets are processed sequentially with a fixed pause between them.
//! A failure on one ticket is logged and counted; it never aborts the run.
//!
//! For a ticket that changes phase, the repeatable writes (fields, comment,
//! handoff) go first and the transition goes last. A ticket only leaves its
//! old status once everything else has landed, so an interrupted update is
//! picked up again by the next run.

use std::time::Duration;

use anyhow::Context;
use awbsync_core::{AppConfig, FieldIds, Phase, ShipmentRecord, Ticket};
use awbsync_courier::{CourierClient, TrackingLookup};
use awbsync_jira::{jql, JiraClient};
use serde_json::{Map, Value};

use crate::classify::{classify_explained, Classification};
use crate::comment::{already_commented, render_comment};
use crate::extract::extract_awb;
use crate::fields::{reconcile, FieldDelta};
use crate::transition::{resolve, status_matches};

/// Why a ticket was left alone this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoIdentifier,
    TrackingUnavailable,
    UnknownPhase,
    NoMatchingTransition,
}

/// Per-ticket result of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketOutcome {
    /// Transitioned into `phase` after fields, comment and (for terminal
    /// phases) reassignment were applied.
    Updated {
        phase: Phase,
        transition: String,
        fields_written: usize,
    },
    /// Already in `phase`; only the field delta (possibly empty) applied.
    Unchanged { phase: Phase, fields_written: usize },
    Skipped(SkipReason),
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped_no_identifier: usize,
    pub skipped_unavailable: usize,
    pub skipped_unknown_phase: usize,
    pub skipped_no_transition: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &TicketOutcome) {
        self.processed += 1;
        match outcome {
            TicketOutcome::Updated { .. } => self.updated += 1,
            TicketOutcome::Unchanged { .. } => self.unchanged += 1,
            TicketOutcome::Skipped(SkipReason::NoIdentifier) => self.skipped_no_identifier += 1,
            TicketOutcome::Skipped(SkipReason::TrackingUnavailable) => {
                self.skipped_unavailable += 1;
            }
            TicketOutcome::Skipped(SkipReason::UnknownPhase) => self.skipped_unknown_phase += 1,
            TicketOutcome::Skipped(SkipReason::NoMatchingTransition) => {
                self.skipped_no_transition += 1;
            }
        }
    }

    fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }

    /// Total skipped tickets across all reasons.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_no_identifier
            + self.skipped_unavailable
            + self.skipped_unknown_phase
            + self.skipped_no_transition
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed {}: {} updated, {} unchanged, {} skipped \
             (no identifier {}, tracking unavailable {}, unknown phase {}, no transition {}), \
             {} failed",
            self.processed,
            self.updated,
            self.unchanged,
            self.skipped(),
            self.skipped_no_identifier,
            self.skipped_unavailable,
            self.skipped_unknown_phase,
            self.skipped_no_transition,
            self.failed,
        )
    }
}

/// Runs reconciliation passes against one courier and one tracker.
pub struct Driver {
    config: AppConfig,
    courier: CourierClient,
    jira: JiraClient,
    dry_run: bool,
}

impl Driver {
    #[must_use]
    pub fn new(config: AppConfig, courier: CourierClient, jira: JiraClient) -> Self {
        Self {
            config,
            courier,
            jira,
            dry_run: false,
        }
    }

    /// Builds both HTTP clients from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if either client cannot be constructed.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let courier = CourierClient::from_config(&config).context("building courier client")?;
        let jira = JiraClient::from_config(&config).context("building Jira client")?;
        Ok(Self::new(config, courier, jira))
    }

    /// In dry-run mode every read and decision happens, but no tracker
    /// mutation is sent.
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// One full pass over the candidate tickets.
    ///
    /// # Errors
    ///
    /// Only the candidate search can fail the run; per-ticket errors are
    /// counted in the summary.
    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        let query = match self.config.debug_ticket.as_deref() {
            Some(key) => jql::single_ticket(key),
            None => jql::candidate_tickets(
                &self.config.jira_project_key,
                &self.config.field_ids.awb,
                self.config.lookback_days,
                &self.config.excluded_statuses,
            ),
        };
        tracing::debug!(jql = %query, "searching candidate tickets");

        let tickets = self
            .jira
            .search_tickets(&query, &self.config.field_ids)
            .await
            .context("candidate ticket search failed")?;
        tracing::info!(
            count = tickets.len(),
            dry_run = self.dry_run,
            "reconciling tickets"
        );

        let pause = Duration::from_millis(self.config.ticket_delay_ms);
        let mut summary = RunSummary::default();
        let mut first = true;

        for ticket in &tickets {
            if !self.passes_awb_filter(ticket) {
                tracing::debug!(ticket = %ticket.key, "filtered out by tracking-number filter");
                continue;
            }
            if !first && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
            first = false;

            match self.reconcile_ticket(ticket).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    tracing::error!(ticket = %ticket.key, error = %format!("{e:#}"), "ticket reconciliation failed");
                    summary.record_failure();
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            updated = summary.updated,
            unchanged = summary.unchanged,
            skipped = summary.skipped(),
            failed = summary.failed,
            "reconciliation run complete"
        );
        Ok(summary)
    }

    fn passes_awb_filter(&self, ticket: &Ticket) -> bool {
        let Some(wanted) = self.config.debug_awb.as_deref() else {
            return true;
        };
        ticket
            .awb_source
            .as_deref()
            .and_then(extract_awb)
            .is_some_and(|awb| awb == wanted)
    }

    /// Reconcile a single ticket.
    ///
    /// # Errors
    ///
    /// Returns an error when a tracker call fails after retries. Courier
    /// failures are not errors; they yield
    /// [`SkipReason::TrackingUnavailable`].
    pub async fn reconcile_ticket(&self, ticket: &Ticket) -> anyhow::Result<TicketOutcome> {
        let key = ticket.key.as_str();

        let Some(awb) = ticket.awb_source.as_deref().and_then(extract_awb) else {
            tracing::warn!(ticket = %key, "no tracking number found in ticket; skipping");
            return Ok(TicketOutcome::Skipped(SkipReason::NoIdentifier));
        };

        let record = match self.courier.lookup(&awb).await {
            TrackingLookup::Found(record) => record,
            TrackingLookup::Unavailable { reason } => {
                tracing::warn!(ticket = %key, awb = %awb, reason = %reason, "tracking unavailable; skipping");
                return Ok(TicketOutcome::Skipped(SkipReason::TrackingUnavailable));
            }
        };

        let Classification { phase, rule } = classify_explained(&record);
        if phase == Phase::Unknown {
            tracing::warn!(
                ticket = %key,
                awb = %awb,
                status = %record.status,
                status_type = %record.status_type,
                "courier status does not map to a phase; skipping"
            );
            return Ok(TicketOutcome::Skipped(SkipReason::UnknownPhase));
        }
        tracing::debug!(ticket = %key, awb = %awb, phase = %phase, rule, "classified");

        let delta = reconcile(ticket, &record, phase);

        if status_matches(&ticket.status, phase) {
            let fields_written = self.apply_fields(key, &delta).await?;
            tracing::info!(ticket = %key, phase = %phase, fields_written, "already in phase");
            return Ok(TicketOutcome::Unchanged {
                phase,
                fields_written,
            });
        }

        let available = self
            .jira
            .transitions(key)
            .await
            .with_context(|| format!("listing transitions for {key}"))?;
        let Some(transition) = resolve(&available, phase) else {
            let offered: Vec<&str> = available.iter().map(|t| t.to_status.as_str()).collect();
            tracing::warn!(
                ticket = %key,
                phase = %phase,
                offered = ?offered,
                "no workflow transition matches phase; leaving ticket untouched"
            );
            return Ok(TicketOutcome::Skipped(SkipReason::NoMatchingTransition));
        };

        let fields_written = self.apply_fields(key, &delta).await?;
        self.post_comment(key, phase, &record).await?;
        if phase.is_terminal() {
            self.hand_off(key).await?;
        }

        if self.dry_run {
            tracing::info!(ticket = %key, from = %ticket.status, transition = %transition.name, "dry run: would transition");
        } else {
            self.jira
                .transition(key, &transition.id)
                .await
                .with_context(|| format!("applying transition {} to {key}", transition.id))?;
        }

        tracing::info!(
            ticket = %key,
            from = %ticket.status,
            phase = %phase,
            fields_written,
            "ticket updated"
        );
        Ok(TicketOutcome::Updated {
            phase,
            transition: transition.name.clone(),
            fields_written,
        })
    }

    async fn apply_fields(&self, key: &str, delta: &FieldDelta) -> anyhow::Result<usize> {
        if delta.is_empty() {
            return Ok(0);
        }
        let fields = delta_to_fields(delta, &self.config.field_ids)?;
        if self.dry_run {
            let body = Value::Object(fields);
            tracing::info!(ticket = %key, fields = %body, "dry run: would update fields");
        } else {
            self.jira
                .update_fields(key, fields)
                .await
                .with_context(|| format!("updating fields on {key}"))?;
        }
        Ok(delta.len())
    }

    async fn post_comment(
        &self,
        key: &str,
        phase: Phase,
        record: &ShipmentRecord,
    ) -> anyhow::Result<()> {
        let recent = self
            .jira
            .recent_comments(key)
            .await
            .with_context(|| format!("listing comments on {key}"))?;
        if already_commented(&recent, phase) {
            tracing::debug!(ticket = %key, phase = %phase, "phase comment already posted");
            return Ok(());
        }

        let body = render_comment(phase, record);
        if self.dry_run {
            tracing::info!(ticket = %key, "dry run: would comment:\n{body}");
            return Ok(());
        }
        self.jira
            .add_comment(key, &body)
            .await
            .with_context(|| format!("commenting on {key}"))
    }

    async fn hand_off(&self, key: &str) -> anyhow::Result<()> {
        let assignee = &self.config.completion_assignee;
        if self.dry_run {
            tracing::info!(ticket = %key, assignee = %assignee, "dry run: would reassign");
            return Ok(());
        }
        self.jira
            .assign(key, assignee)
            .await
            .with_context(|| format!("reassigning {key}"))
    }
}

/// Convert a field delta into the tracker's `fields` object, keyed by the
/// configured field ids.
fn delta_to_fields(delta: &FieldDelta, ids: &FieldIds) -> anyhow::Result<Map<String, Value>> {
    delta
        .iter()
        .map(|(field, value)| {
            let json = serde_json::to_value(value)
                .with_context(|| format!("serializing {field:?}"))?;
            Ok((ids.id_for(*field).to_string(), json))
        })
        .collect()
}
