//! Schema introspection.
//!
//! Builds [`TableDescriptor`]s and [`RelationEdge`]s from the database's own
//! metadata: `SHOW TABLES` for the table list, `DESCRIBE` per table, and
//! `INFORMATION_SCHEMA.KEY_COLUMN_USAGE` for foreign-key edges. All queries
//! run through the regular executor, so they share the connection's
//! self-healing acquire path.
//!
//! Introspection is best-effort: a table whose `DESCRIBE` fails is skipped
//! with a warning so one broken view cannot sink the whole refresh.

use crate::db::connection::ConnectionManager;
use crate::db::executor::QueryExecutor;
use crate::db::validate_identifier;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{ColumnDescriptor, QueryOutcome, RelationEdge, TableDescriptor};
use crate::policy::SecurityPolicy;
use serde_json::Value as JsonValue;
use tracing::warn;

/// Foreign-key edges of the current database, in the column naming the
/// relation tools expose.
pub const RELATION_QUERY: &str = "SELECT \
    TABLE_NAME AS table_name, \
    COLUMN_NAME AS column_name, \
    REFERENCED_TABLE_NAME AS referenced_table, \
    REFERENCED_COLUMN_NAME AS referenced_column \
    FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
    WHERE REFERENCED_TABLE_SCHEMA = DATABASE() \
    AND REFERENCED_TABLE_NAME IS NOT NULL";

/// Runs introspection queries and parses their results.
pub struct SchemaIntrospector<'a> {
    connection: &'a ConnectionManager,
    executor: &'a QueryExecutor,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(connection: &'a ConnectionManager, executor: &'a QueryExecutor) -> Self {
        Self {
            connection,
            executor,
        }
    }

    /// List tables (filtered to the policy's allow-list) and describe each.
    pub async fn load_tables(
        &self,
        policy: &SecurityPolicy,
    ) -> GatewayResult<Vec<TableDescriptor>> {
        let outcome = self
            .executor
            .execute(self.connection, "SHOW TABLES")
            .await?;
        let rows = read_rows(outcome, "SHOW TABLES")?;

        let mut tables = Vec::new();
        for row in &rows {
            // SHOW TABLES yields a single column whose name embeds the
            // database name, so take the first value positionally
            let Some(name) = row.values().next().and_then(JsonValue::as_str) else {
                continue;
            };
            if !policy.table_allowed(name) {
                continue;
            }
            match self.describe_table(name).await {
                Ok(table) => tables.push(table),
                Err(e) => {
                    warn!(table = %name, error = %e, "skipping table during introspection");
                }
            }
        }

        Ok(tables)
    }

    /// Run `DESCRIBE` for one table and parse it into a descriptor.
    pub async fn describe_table(&self, name: &str) -> GatewayResult<TableDescriptor> {
        let name = validate_identifier(name)?;
        let sql = format!("DESCRIBE `{name}`");
        let outcome = self.executor.execute(self.connection, &sql).await?;
        let rows = read_rows(outcome, "DESCRIBE")?;
        Ok(parse_describe_rows(name, &rows))
    }

    /// Run the foreign-key query; the caller gets the raw outcome and can
    /// parse edges out of it with [`parse_relation_rows`].
    pub async fn load_relations(&self) -> GatewayResult<QueryOutcome> {
        self.executor.execute(self.connection, RELATION_QUERY).await
    }
}

/// Unwrap a read outcome into its rows, turning any other shape into an
/// introspection error.
fn read_rows(
    outcome: QueryOutcome,
    what: &str,
) -> GatewayResult<Vec<serde_json::Map<String, JsonValue>>> {
    match outcome {
        QueryOutcome::Read(read) => Ok(read.rows),
        QueryOutcome::Failure(f) => Err(GatewayError::introspection(format!(
            "{what} failed: {}",
            f.error
        ))),
        QueryOutcome::Write(_) => Err(GatewayError::introspection(format!(
            "{what} unexpectedly returned a write result"
        ))),
    }
}

/// Parse `DESCRIBE` rows (Field/Type/Null/Key/Default/Extra) into a table
/// descriptor, preserving column order.
pub fn parse_describe_rows(
    table: &str,
    rows: &[serde_json::Map<String, JsonValue>],
) -> TableDescriptor {
    let mut descriptor = TableDescriptor::new(table);
    for row in rows {
        let Some(name) = row.get("Field").and_then(JsonValue::as_str) else {
            continue;
        };
        let data_type = row
            .get("Type")
            .and_then(JsonValue::as_str)
            .unwrap_or_default();
        let nullable = row.get("Null").and_then(JsonValue::as_str) == Some("YES");

        let mut column = ColumnDescriptor::new(name, data_type, nullable);
        if let Some(key) = row.get("Key").and_then(JsonValue::as_str) {
            column = column.with_key(key);
        }
        if let Some(default) = row.get("Default").and_then(JsonValue::as_str) {
            column = column.with_default(default);
        }
        if let Some(extra) = row.get("Extra").and_then(JsonValue::as_str) {
            column = column.with_extra(extra);
        }
        descriptor.columns.push(column);
    }
    descriptor
}

/// Parse foreign-key rows into relation edges. Rows missing a field are
/// skipped; duplicate edges are kept exactly as reported.
pub fn parse_relation_rows(rows: &[serde_json::Map<String, JsonValue>]) -> Vec<RelationEdge> {
    rows.iter()
        .filter_map(|row| {
            let field = |key: &str| row.get(key).and_then(JsonValue::as_str);
            Some(RelationEdge::new(
                field("table_name")?,
                field("column_name")?,
                field("referenced_table")?,
                field("referenced_column")?,
            ))
        })
        .collect()
}
