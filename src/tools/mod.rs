//! Gateway tool implementations.
//!
//! Handlers for the five named operations the service exposes:
//! - `execute_query`: run a policy-approved SQL statement
//! - `get_schema`: introspect tables and return the schema snapshot
//! - `get_table_structure`: DESCRIBE one allowed table
//! - `analyze_data`: row count and per-column statistics
//! - `get_table_relations`: enumerate foreign-key edges
//!
//! Handlers validate argument shapes and route to the policy, executor, and
//! schema model - business logic lives in those components, not here.

pub mod analyze;
pub mod query;
pub mod schema;

pub use analyze::{AnalyzeDataInput, AnalyzeToolHandler};
pub use query::{ExecuteQueryInput, QueryToolHandler};
pub use schema::{
    GetSchemaOutput, GetTableStructureInput, GetTableStructureOutput, SchemaToolHandler,
};
