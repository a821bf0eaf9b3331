//! Database access layer.
//!
//! This module owns the single gateway connection and everything that runs
//! on it:
//! - Connection management with lazy reconnect
//! - Query execution and result normalization
//! - Row-to-JSON type mappings
//! - Schema introspection queries

pub mod connection;
pub mod executor;
pub mod introspect;
pub mod types;

pub use connection::{ConnectionHandle, ConnectionManager};
pub use executor::QueryExecutor;
pub use introspect::SchemaIntrospector;

use crate::error::{GatewayError, GatewayResult};

/// Validate a caller-supplied table or column name before it is
/// interpolated into generated SQL. Only bare identifiers (ASCII
/// alphanumeric and underscore) are accepted.
pub fn validate_identifier(name: &str) -> GatewayResult<&str> {
    if !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(name)
    } else {
        Err(GatewayError::invalid_input(format!(
            "invalid identifier: '{name}'"
        )))
    }
}
