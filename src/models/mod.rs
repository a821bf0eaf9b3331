//! Data models for the MySQL gateway.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod outcome;
pub mod schema;

// Re-export commonly used types
pub use connection::ConnectionSettings;
pub use outcome::{FailureOutcome, QueryOutcome, ReadOutcome, WriteOutcome};
pub use schema::{
    ColumnDescriptor, RelationEdge, SchemaModel, SchemaSnapshot, TableDescriptor,
};
