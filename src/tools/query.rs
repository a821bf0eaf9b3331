//! Query execution tool.
//!
//! Implements `execute_query`: the full validation pipeline in front of the
//! executor. A query runs only when it passes both the allow-list policy
//! and the dangerous-statement heuristics; rejections come back as
//! structured failures, never as transport errors, so the caller always
//! sees the uniform result shape.

use crate::context::GatewayContext;
use crate::error::GatewayResult;
use crate::models::QueryOutcome;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// SQL statement to run. Must use an allowed operation keyword and
    /// reference only allowed tables.
    pub query: String,
}

/// Handler for query execution.
pub struct QueryToolHandler {
    context: Arc<GatewayContext>,
}

impl QueryToolHandler {
    pub fn new(context: Arc<GatewayContext>) -> Self {
        Self { context }
    }

    /// Validate and execute one query.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> GatewayResult<QueryOutcome> {
        let policy = &self.context.policy;

        if !policy.validate(&input.query) {
            info!(query = %input.query, "query rejected by policy");
            return Ok(QueryOutcome::failure("query not allowed"));
        }

        if policy.is_dangerous(&input.query) {
            info!(query = %input.query, "query rejected as dangerous");
            return Ok(QueryOutcome::failure("dangerous query"));
        }

        let outcome = self
            .context
            .executor
            .execute(&self.context.connection, &input.query)
            .await?;

        info!(success = outcome.is_success(), "query executed");
        Ok(outcome)
    }
}
