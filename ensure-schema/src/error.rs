//! Schema error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unsupported database url scheme: {0}")]
    UnsupportedUrl(String),

    #[error("invalid connection url: {0}")]
    InvalidUrl(String),

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("invalid column definition: {0:?}")]
    InvalidDefinition(String),

    #[error("not connected")]
    NotConnected,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
