//! Schema tools.
//!
//! `get_schema` refreshes the shared model from introspection and returns
//! the snapshot; `get_table_structure` runs DESCRIBE for one allowed table;
//! `get_table_relations` enumerates foreign-key edges and keeps the model's
//! relation list current as a side effect.

use crate::context::GatewayContext;
use crate::db::{SchemaIntrospector, validate_identifier};
use crate::error::GatewayResult;
use crate::models::{QueryOutcome, RelationEdge, SchemaSnapshot};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Output for the get_schema tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GetSchemaOutput {
    #[serde(flatten)]
    pub snapshot: SchemaSnapshot,
    /// Rendered overview: table and relation counts
    pub summary: String,
}

/// Input for the get_table_structure tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTableStructureInput {
    /// Table to describe. Must be in the allow-list when one is configured.
    pub table_name: String,
}

/// Output for the get_table_structure tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GetTableStructureOutput {
    /// The DESCRIBE result (or a structured failure)
    pub result: QueryOutcome,
    /// Human-readable rendering from the schema model, when this table has
    /// been introspected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Handler for schema operations.
pub struct SchemaToolHandler {
    context: Arc<GatewayContext>,
}

impl SchemaToolHandler {
    pub fn new(context: Arc<GatewayContext>) -> Self {
        Self { context }
    }

    /// Refresh the schema model from introspection and return the snapshot
    /// filtered to allowed tables.
    ///
    /// A refresh failure serves the last known snapshot instead of erroring
    /// out the whole call.
    pub async fn get_schema(&self) -> GatewayResult<GetSchemaOutput> {
        let introspector =
            SchemaIntrospector::new(&self.context.connection, &self.context.executor);

        match introspector.load_tables(&self.context.policy).await {
            Ok(tables) => {
                info!(tables = tables.len(), "schema refreshed");
                let mut model = self.context.schema.write().await;
                model.refresh_tables(tables);
            }
            Err(e) => {
                warn!(error = %e, "schema refresh failed, serving last known snapshot");
            }
        }

        let model = self.context.schema.read().await;
        Ok(GetSchemaOutput {
            snapshot: model.snapshot(),
            summary: model.summarize(),
        })
    }

    /// DESCRIBE one table, if the policy allows it.
    pub async fn get_table_structure(
        &self,
        input: GetTableStructureInput,
    ) -> GatewayResult<GetTableStructureOutput> {
        let table = input.table_name.trim();
        validate_identifier(table)?;

        if !self.context.policy.table_allowed(table) {
            info!(table = %table, "table structure request rejected");
            return Ok(GetTableStructureOutput {
                result: QueryOutcome::failure(format!("table {table} is not allowed")),
                description: None,
            });
        }

        let sql = format!("DESCRIBE `{table}`");
        let result = self
            .context
            .executor
            .execute(&self.context.connection, &sql)
            .await?;

        let model = self.context.schema.read().await;
        let description = model.table(table).map(|_| model.describe_table(table));

        Ok(GetTableStructureOutput {
            result,
            description,
        })
    }

    /// Enumerate foreign-key edges across the database. The model's
    /// relation list is replaced with whatever the query reports.
    pub async fn get_table_relations(&self) -> GatewayResult<QueryOutcome> {
        let introspector =
            SchemaIntrospector::new(&self.context.connection, &self.context.executor);
        let outcome = introspector.load_relations().await?;

        if let Some(rows) = outcome.rows() {
            let edges: Vec<RelationEdge> = crate::db::introspect::parse_relation_rows(rows);
            info!(edges = edges.len(), "relations refreshed");
            self.context.schema.write().await.refresh_relations(edges);
        }

        Ok(outcome)
    }
}
