//! ensure-schema: relational schema connector for ensure-core.
//!
//! Columns and indexes are declared as [`SchemaObject`] payloads, checked
//! through the database catalog tables and created with DDL inside an
//! explicit transaction. MySQL is the production target; SQLite is
//! supported for local runs.

pub mod catalog;
pub mod config;
pub mod connector;
pub mod dialect;
pub mod error;
pub mod object;
pub mod probe;

pub use config::{ConnectionDescriptor, DatabaseArgs, SchemaSettings};
pub use connector::SchemaConnector;
pub use dialect::Dialect;
pub use error::SchemaError;
pub use object::SchemaObject;
