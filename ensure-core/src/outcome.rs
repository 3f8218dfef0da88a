//! Outcome model - per-resource outcomes and the run report.

use serde::Serialize;

/// Final status of one resource in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    AlreadyPresent,
    Created,
    CreationFailed,
    PresenceUnknown,
}

impl OutcomeStatus {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            OutcomeStatus::CreationFailed | OutcomeStatus::PresenceUnknown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::AlreadyPresent => "already_present",
            OutcomeStatus::Created => "created",
            OutcomeStatus::CreationFailed => "creation_failed",
            OutcomeStatus::PresenceUnknown => "presence_unknown",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for a single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationOutcome {
    pub resource_id: String,
    pub label: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Succeeded,
    PartiallyFailed,
    Aborted,
}

/// Number of outcomes per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub already_present: usize,
    pub created: usize,
    pub creation_failed: usize,
    pub presence_unknown: usize,
}

impl OutcomeCounts {
    fn tally(outcomes: &[ReconciliationOutcome]) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::AlreadyPresent => counts.already_present += 1,
                OutcomeStatus::Created => counts.created += 1,
                OutcomeStatus::CreationFailed => counts.creation_failed += 1,
                OutcomeStatus::PresenceUnknown => counts.presence_unknown += 1,
            }
        }
        counts
    }

    pub fn get(&self, status: OutcomeStatus) -> usize {
        match status {
            OutcomeStatus::AlreadyPresent => self.already_present,
            OutcomeStatus::Created => self.created,
            OutcomeStatus::CreationFailed => self.creation_failed,
            OutcomeStatus::PresenceUnknown => self.presence_unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.already_present + self.created + self.creation_failed + self.presence_unknown
    }
}

/// Report produced once at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub connector: String,
    pub state: RunState,
    pub overall_success: bool,
    pub catalog_len: usize,
    pub counts: OutcomeCounts,
    pub outcomes: Vec<ReconciliationOutcome>,
    pub duration_ms: u64,
}

impl ReconciliationReport {
    /// Assemble the report. `aborted` forces [`RunState::Aborted`].
    pub(crate) fn new(
        connector: impl Into<String>,
        catalog_len: usize,
        outcomes: Vec<ReconciliationOutcome>,
        aborted: bool,
        duration_ms: u64,
    ) -> Self {
        let counts = OutcomeCounts::tally(&outcomes);
        let any_failed = outcomes.iter().any(|o| o.status.is_failure());
        let overall_success = !aborted && !any_failed;
        let state = if aborted {
            RunState::Aborted
        } else if overall_success {
            RunState::Succeeded
        } else {
            RunState::PartiallyFailed
        };

        Self {
            connector: connector.into(),
            state,
            overall_success,
            catalog_len,
            counts,
            outcomes,
            duration_ms,
        }
    }

    /// Whether every catalog entry received an outcome.
    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == self.catalog_len
    }

    pub fn outcome(&self, resource_id: &str) -> Option<&ReconciliationOutcome> {
        self.outcomes.iter().find(|o| o.resource_id == resource_id)
    }

    /// Process exit code: 0 on overall success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.overall_success { 0 } else { 1 }
    }
}
