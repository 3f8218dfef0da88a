//! Connector contract - the backend-specific side of a reconciliation run.

use async_trait::async_trait;

use crate::catalog::ResourceDefinition;
use crate::error::ConnectorError;

/// Result of an existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    /// The check itself could not be completed reliably.
    Unknown(String),
}

impl Presence {
    pub fn is_present(&self) -> bool {
        matches!(self, Presence::Present)
    }
}

/// How the reconciler treats a failed `authenticate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// No point in continuing without a connection; abort the run.
    Mandatory,
    /// Log and continue; every check resolves on its own.
    Opportunistic,
}

/// Trait for backends the reconciler can drive.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Backend-specific creation data carried by each definition.
    type Payload: Send + Sync;

    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    fn auth_requirement(&self) -> AuthRequirement;

    /// Establish the connection or session. Never panics or raises; `false`
    /// means the backend could not be reached or refused the credentials.
    async fn authenticate(&self) -> bool;

    /// Check whether the resource exists. Must not have side effects.
    async fn exists(&self, def: &ResourceDefinition<Self::Payload>) -> Presence;

    /// Create the resource. Only called right after `exists` returned
    /// [`Presence::Absent`].
    async fn create(&self, def: &ResourceDefinition<Self::Payload>) -> Result<(), ConnectorError>;

    /// Release the connection or session at the end of a run.
    async fn close(&self) {}
}
