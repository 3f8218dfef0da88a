//! Reporters - sinks for structured outcome events.

use tracing::{error, info, warn};

use crate::outcome::{OutcomeStatus, ReconciliationOutcome, ReconciliationReport};

/// Receives events while a run progresses.
pub trait Reporter: Send + Sync {
    fn run_started(&self, connector: &str, catalog_len: usize);

    fn authentication_failed(&self, connector: &str, fatal: bool);

    /// Called once per resource as soon as its main-pass outcome is known,
    /// in catalog order.
    fn outcome(&self, connector: &str, outcome: &ReconciliationOutcome);

    /// A resource reported earlier did not survive the re-check.
    fn verification_failed(
        &self,
        connector: &str,
        previous: OutcomeStatus,
        outcome: &ReconciliationOutcome,
    );

    fn run_finished(&self, report: &ReconciliationReport);
}

/// Reporter that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn run_started(&self, connector: &str, catalog_len: usize) {
        info!(connector = %connector, resources = catalog_len, "Starting reconciliation");
    }

    fn authentication_failed(&self, connector: &str, fatal: bool) {
        if fatal {
            error!(connector = %connector, "Authentication failed, aborting reconciliation");
        } else {
            warn!(connector = %connector, "Authentication failed, continuing without a session");
        }
    }

    fn outcome(&self, connector: &str, outcome: &ReconciliationOutcome) {
        let detail = outcome.detail.as_deref().unwrap_or("");
        match outcome.status {
            OutcomeStatus::AlreadyPresent => info!(
                connector = %connector,
                resource = %outcome.resource_id,
                label = %outcome.label,
                "Resource already present"
            ),
            OutcomeStatus::Created => info!(
                connector = %connector,
                resource = %outcome.resource_id,
                label = %outcome.label,
                "Resource created"
            ),
            OutcomeStatus::CreationFailed => error!(
                connector = %connector,
                resource = %outcome.resource_id,
                label = %outcome.label,
                detail = %detail,
                "Resource creation failed"
            ),
            OutcomeStatus::PresenceUnknown => warn!(
                connector = %connector,
                resource = %outcome.resource_id,
                label = %outcome.label,
                detail = %detail,
                "Could not verify resource"
            ),
        }
    }

    fn verification_failed(
        &self,
        connector: &str,
        previous: OutcomeStatus,
        outcome: &ReconciliationOutcome,
    ) {
        warn!(
            connector = %connector,
            resource = %outcome.resource_id,
            previous = %previous,
            detail = %outcome.detail.as_deref().unwrap_or(""),
            "Verification failed"
        );
    }

    fn run_finished(&self, report: &ReconciliationReport) {
        info!(
            connector = %report.connector,
            state = ?report.state,
            checked = report.outcomes.len(),
            existing = report.counts.already_present,
            created = report.counts.created,
            failed = report.counts.creation_failed,
            unknown = report.counts.presence_unknown,
            duration_ms = report.duration_ms,
            "Reconciliation finished"
        );
    }
}

/// Reporter that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn run_started(&self, _connector: &str, _catalog_len: usize) {}
    fn authentication_failed(&self, _connector: &str, _fatal: bool) {}
    fn outcome(&self, _connector: &str, _outcome: &ReconciliationOutcome) {}
    fn verification_failed(
        &self,
        _connector: &str,
        _previous: OutcomeStatus,
        _outcome: &ReconciliationOutcome,
    ) {
    }
    fn run_finished(&self, _report: &ReconciliationReport) {}
}
