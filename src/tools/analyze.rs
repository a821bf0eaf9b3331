//! Data analysis tool.
//!
//! `analyze_data` reports the row count of a table and, when a column is
//! given, its distinct-value count, minimum, maximum, and average.

use crate::context::GatewayContext;
use crate::db::validate_identifier;
use crate::error::GatewayResult;
use crate::models::QueryOutcome;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the analyze_data tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeDataInput {
    /// Table to analyze. Must be in the allow-list when one is configured.
    pub table_name: String,
    /// Column to profile; omit for a row count only.
    #[serde(default)]
    pub column_name: Option<String>,
}

/// Handler for data analysis.
pub struct AnalyzeToolHandler {
    context: Arc<GatewayContext>,
}

impl AnalyzeToolHandler {
    pub fn new(context: Arc<GatewayContext>) -> Self {
        Self { context }
    }

    pub async fn analyze_data(&self, input: AnalyzeDataInput) -> GatewayResult<QueryOutcome> {
        let table = input.table_name.trim();
        validate_identifier(table)?;

        if !self.context.policy.table_allowed(table) {
            info!(table = %table, "analyze request rejected");
            return Ok(QueryOutcome::failure(format!(
                "table {table} is not allowed"
            )));
        }

        let sql = match input.column_name.as_deref().map(str::trim) {
            Some(column) if !column.is_empty() => {
                validate_identifier(column)?;
                format!(
                    "SELECT \
                     COUNT(*) AS total_rows, \
                     COUNT(DISTINCT `{column}`) AS unique_values, \
                     MIN(`{column}`) AS min_value, \
                     MAX(`{column}`) AS max_value, \
                     AVG(`{column}`) AS avg_value \
                     FROM `{table}`"
                )
            }
            _ => format!("SELECT COUNT(*) AS total_rows FROM `{table}`"),
        };

        info!(table = %table, column = ?input.column_name, "analyzing data");
        self.context
            .executor
            .execute(&self.context.connection, &sql)
            .await
    }
}
