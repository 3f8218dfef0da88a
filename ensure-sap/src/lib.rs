//! ensure-sap: stored-query connector for the SAP Business One Service Layer.
//!
//! The [`RemoteQueryConnector`] logs in with a session cookie, checks each
//! query by code and posts the missing ones. [`initialize_queries`] wraps a
//! full run as a startup hook that never fails the host process.

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod connector;
pub mod error;
pub mod flavor;
mod session;

pub use bootstrap::initialize_queries;
pub use catalog::{QueryPayload, required_queries};
pub use config::{SapArgs, SapSettings};
pub use connector::RemoteQueryConnector;
pub use error::ConfigError;
pub use flavor::ApiFlavor;
