//! Startup hook: make sure the stored queries exist without ever failing the
//! host application.

use tracing::{error, info, warn};

use ensure_core::{Reconciler, ReconcilerConfig, ReconciliationReport};

use crate::catalog::required_queries;
use crate::config::SapSettings;
use crate::connector::RemoteQueryConnector;

/// Reconcile [`required_queries`] against the configured server.
///
/// Returns `None` when the run was skipped (incomplete configuration or an
/// unusable server url). All failures are logged, none are returned.
pub async fn initialize_queries(
    settings: SapSettings,
    config: ReconcilerConfig,
) -> Option<ReconciliationReport> {
    let missing = settings.missing();
    if !missing.is_empty() {
        warn!(missing = ?missing, "SAP configuration incomplete, skipping stored query initialization");
        return None;
    }

    let connector = match RemoteQueryConnector::new(settings) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Cannot initialize stored queries. Application will continue");
            return None;
        }
    };

    info!("Initializing SAP stored queries");
    let report = Reconciler::new(config)
        .reconcile(&required_queries(), &connector)
        .await;

    if report.overall_success {
        info!(
            existing = report.counts.already_present,
            created = report.counts.created,
            "SAP stored queries ready"
        );
    } else {
        warn!(
            state = ?report.state,
            failed = report.counts.creation_failed,
            unknown = report.counts.presence_unknown,
            "Some SAP stored queries could not be initialized. Application will continue"
        );
    }
    Some(report)
}
