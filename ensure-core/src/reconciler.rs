//! Reconciler - drives check, create and verify over a catalog.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, ResourceDefinition};
use crate::connector::{AuthRequirement, Connector, Presence};
use crate::error::ConnectorError;
use crate::outcome::{OutcomeStatus, ReconciliationOutcome, ReconciliationReport};
use crate::reporter::{Reporter, TracingReporter};

/// Reconciler settings.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Upper bound for every single connector call.
    pub call_timeout: Duration,
    /// Re-check resources reported present or created after the main pass.
    pub verify: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            verify: true,
        }
    }
}

/// Provisional per-resource result; turned into an outcome after verification.
struct Pending<'a, P> {
    def: &'a ResourceDefinition<P>,
    status: OutcomeStatus,
    detail: Option<String>,
}

impl<P> Pending<'_, P> {
    fn to_outcome(&self) -> ReconciliationOutcome {
        ReconciliationOutcome {
            resource_id: self.def.id.clone(),
            label: self.def.label.clone(),
            status: self.status,
            detail: self.detail.clone(),
        }
    }
}

/// Reconciles a catalog against a connector.
pub struct Reconciler {
    config: ReconcilerConfig,
    reporter: Arc<dyn Reporter>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcilerConfig::default())
    }
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self {
            config,
            reporter: Arc::new(TracingReporter),
            cancel: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Stop between resources once the watched value turns `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Run one reconciliation pass.
    pub async fn reconcile<C: Connector>(
        &self,
        catalog: &Catalog<C::Payload>,
        connector: &C,
    ) -> ReconciliationReport {
        let started = Instant::now();
        let name = connector.name().to_string();
        self.reporter.run_started(&name, catalog.len());

        if let Err(e) = catalog.validate() {
            warn!(connector = %name, error = %e, "Catalog violates id uniqueness, processing as given");
        }

        if !self.authenticate(connector).await {
            match connector.auth_requirement() {
                AuthRequirement::Mandatory => {
                    self.reporter.authentication_failed(&name, true);
                    self.close(connector).await;
                    return self.finish(name, catalog.len(), Vec::new(), true, started);
                }
                AuthRequirement::Opportunistic => {
                    self.reporter.authentication_failed(&name, false);
                }
            }
        }

        let mut pending: Vec<Pending<'_, C::Payload>> = Vec::with_capacity(catalog.len());
        let mut aborted = false;

        for def in catalog {
            if self.is_cancelled() {
                info!(
                    connector = %name,
                    remaining = catalog.len() - pending.len(),
                    "Reconciliation cancelled"
                );
                aborted = true;
                break;
            }

            let (status, detail) = match self.check(connector, def).await {
                Presence::Present => (OutcomeStatus::AlreadyPresent, None),
                Presence::Unknown(reason) => (OutcomeStatus::PresenceUnknown, Some(reason)),
                Presence::Absent => {
                    debug!(connector = %name, resource = %def.id, "Resource absent, creating");
                    match self.create(connector, def).await {
                        Ok(()) => (OutcomeStatus::Created, None),
                        Err(e) => {
                            let fatal = e.is_fatal();
                            let failed = Pending {
                                def,
                                status: OutcomeStatus::CreationFailed,
                                detail: Some(e.to_string()),
                            };
                            self.reporter.outcome(&name, &failed.to_outcome());
                            pending.push(failed);
                            if fatal {
                                warn!(connector = %name, error = %e, "Lost backend connection, aborting");
                                aborted = true;
                                break;
                            }
                            continue;
                        }
                    }
                }
            };

            let done = Pending {
                def,
                status,
                detail,
            };
            self.reporter.outcome(&name, &done.to_outcome());
            pending.push(done);
        }

        // Outcomes of an aborted run are kept as computed.
        if self.config.verify && !aborted {
            self.verify(connector, &mut pending).await;
        }

        self.close(connector).await;

        let outcomes = pending.iter().map(Pending::to_outcome).collect();

        self.finish(name, catalog.len(), outcomes, aborted, started)
    }

    async fn authenticate<C: Connector>(&self, connector: &C) -> bool {
        match timeout(self.config.call_timeout, connector.authenticate()).await {
            Ok(ok) => ok,
            Err(_) => {
                warn!(
                    connector = %connector.name(),
                    timeout = ?self.config.call_timeout,
                    "Authentication timed out"
                );
                false
            }
        }
    }

    async fn check<C: Connector>(
        &self,
        connector: &C,
        def: &ResourceDefinition<C::Payload>,
    ) -> Presence {
        match timeout(self.config.call_timeout, connector.exists(def)).await {
            Ok(presence) => presence,
            Err(_) => Presence::Unknown(format!(
                "existence check timed out after {:?}",
                self.config.call_timeout
            )),
        }
    }

    async fn create<C: Connector>(
        &self,
        connector: &C,
        def: &ResourceDefinition<C::Payload>,
    ) -> Result<(), ConnectorError> {
        match timeout(self.config.call_timeout, connector.create(def)).await {
            Ok(result) => result,
            Err(_) => Err(ConnectorError::Timeout(self.config.call_timeout)),
        }
    }

    async fn close<C: Connector>(&self, connector: &C) {
        if timeout(self.config.call_timeout, connector.close()).await.is_err() {
            warn!(connector = %connector.name(), "Closing connector timed out");
        }
    }

    /// Re-check everything that should now exist; downgrade mismatches.
    async fn verify<C: Connector>(&self, connector: &C, pending: &mut [Pending<'_, C::Payload>]) {
        for p in pending.iter_mut().filter(|p| {
            matches!(
                p.status,
                OutcomeStatus::Created | OutcomeStatus::AlreadyPresent
            )
        }) {
            let reason = match self.check(connector, p.def).await {
                Presence::Present => continue,
                Presence::Absent => "resource not found on re-check".to_string(),
                Presence::Unknown(reason) => reason,
            };
            let previous = p.status;
            p.status = OutcomeStatus::PresenceUnknown;
            p.detail = Some(format!("verification failed: {}", reason));
            self.reporter
                .verification_failed(connector.name(), previous, &p.to_outcome());
        }
    }

    fn finish(
        &self,
        connector: String,
        catalog_len: usize,
        outcomes: Vec<ReconciliationOutcome>,
        aborted: bool,
        started: Instant,
    ) -> ReconciliationReport {
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = ReconciliationReport::new(connector, catalog_len, outcomes, aborted, duration_ms);
        self.reporter.run_finished(&report);
        report
    }
}
