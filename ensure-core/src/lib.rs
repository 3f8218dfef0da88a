//! ensure-core: idempotent declarative reconciliation.
//!
//! Given an ordered [`Catalog`] of desired resources and a backend
//! [`Connector`], the [`Reconciler`] checks each resource, creates the ones
//! that are absent, re-verifies the whole set and returns a
//! [`ReconciliationReport`].
//!
//! # Example
//! ```ignore
//! use ensure_core::{Catalog, ResourceDefinition, Reconciler};
//!
//! let catalog = Catalog::new(vec![
//!     ResourceDefinition::new("bpl_id", "Business place id", payload),
//! ]);
//! let report = Reconciler::default().reconcile(&catalog, &connector).await;
//! std::process::exit(report.exit_code());
//! ```

mod catalog;
mod connector;
mod error;
mod outcome;
mod reconciler;
mod reporter;

pub use catalog::{Catalog, ResourceDefinition};
pub use connector::{AuthRequirement, Connector, Presence};
pub use error::{CatalogError, ConnectorError};
pub use outcome::{OutcomeCounts, OutcomeStatus, ReconciliationOutcome, ReconciliationReport, RunState};
pub use reconciler::{Reconciler, ReconcilerConfig};
pub use reporter::{NoopReporter, Reporter, TracingReporter};

/// Reconcile `catalog` against `connector` with the default configuration
/// and a [`TracingReporter`].
pub async fn reconcile<C: Connector>(
    catalog: &Catalog<C::Payload>,
    connector: &C,
) -> ReconciliationReport {
    Reconciler::default().reconcile(catalog, connector).await
}
