//! sqlprobe core
//!
//! Shared domain model for the connector: the schema types a catalog read
//! produces, and the connection parameters a session is built from.

pub mod config;
pub mod schema;

pub use config::{ConfigError, ConnectionParameters, ProbeConfig, ReconnectPolicy, DEFAULT_PORT};
pub use schema::{Column, TableName};
