//! Error types shared by connectors and catalogs.

use std::time::Duration;

use thiserror::Error;

/// Errors a connector can return from `create`.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The backend connection is gone altogether; the run is aborted.
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// A single call could not complete.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A single call exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The target system refused the mutation (duplicate name, constraint, ...).
    #[error("rejected by backend: {0}")]
    Rejected(String),
}

impl ConnectorError {
    /// Whether this error ends the whole run rather than a single resource.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConnectorError::Connectivity(_))
    }
}

/// Catalog validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate resource id: {0}")]
    DuplicateId(String),

    #[error("resource id must not be empty (entry {0})")]
    EmptyId(usize),
}
