//! MCP service implementation using rmcp.
//!
//! This module defines the GatewayService struct with the gateway's five
//! operations exposed via the MCP protocol using the rmcp framework's
//! macros. The service itself only routes: the handlers in `tools/` own the
//! composition of policy, executor, and schema model.

use crate::context::GatewayContext;
use crate::error::GatewayError;
use crate::models::QueryOutcome;
use crate::tools::analyze::{AnalyzeDataInput, AnalyzeToolHandler};
use crate::tools::query::{ExecuteQueryInput, QueryToolHandler};
use crate::tools::schema::{
    GetSchemaOutput, GetTableStructureInput, GetTableStructureOutput, SchemaToolHandler,
};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct GatewayService {
    /// Shared application context for all operations
    context: Arc<GatewayContext>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl GatewayService {
    pub fn new(context: Arc<GatewayContext>) -> Self {
        Self {
            context,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl GatewayService {
    #[tool(
        description = "Execute a SQL query against the configured MySQL database.\nThe query must use an allowed operation keyword (default: SELECT, SHOW, DESCRIBE) and reference only allowed tables.\nStatements matching dangerous patterns (DROP, TRUNCATE, DELETE/UPDATE without WHERE, multi-statement input, ...) are rejected.\nRead queries return rows up to the configured cap with a has_more flag; other statements return the affected row count."
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Result<Json<QueryOutcome>, McpError> {
        let handler = QueryToolHandler::new(self.context.clone());
        handler
            .execute_query(input)
            .await
            .map(Json)
            .map_err(|e: GatewayError| e.into())
    }

    #[tool(
        description = "Introspect the database schema.\nReturns tables (filtered to the allow-list) with their columns, known foreign-key relations, and a rendered summary."
    )]
    async fn get_schema(&self) -> Result<Json<GetSchemaOutput>, McpError> {
        let handler = SchemaToolHandler::new(self.context.clone());
        handler
            .get_schema()
            .await
            .map(Json)
            .map_err(|e: GatewayError| e.into())
    }

    #[tool(
        description = "Get the structure of one table (DESCRIBE).\nRejected with a structured failure when the table is outside the allow-list."
    )]
    async fn get_table_structure(
        &self,
        Parameters(input): Parameters<GetTableStructureInput>,
    ) -> Result<Json<GetTableStructureOutput>, McpError> {
        let handler = SchemaToolHandler::new(self.context.clone());
        handler
            .get_table_structure(input)
            .await
            .map(Json)
            .map_err(|e: GatewayError| e.into())
    }

    #[tool(
        description = "Analyze table data.\nReturns the row count; with column_name also distinct values, min, max, and average of that column."
    )]
    async fn analyze_data(
        &self,
        Parameters(input): Parameters<AnalyzeDataInput>,
    ) -> Result<Json<QueryOutcome>, McpError> {
        let handler = AnalyzeToolHandler::new(self.context.clone());
        handler
            .analyze_data(input)
            .await
            .map(Json)
            .map_err(|e: GatewayError| e.into())
    }

    #[tool(
        description = "Enumerate foreign-key relationships across the whole database.\nReturns one row per edge: table_name, column_name, referenced_table, referenced_column."
    )]
    async fn get_table_relations(&self) -> Result<Json<QueryOutcome>, McpError> {
        let handler = SchemaToolHandler::new(self.context.clone());
        handler
            .get_table_relations()
            .await
            .map(Json)
            .map_err(|e: GatewayError| e.into())
    }
}

#[tool_handler]
impl ServerHandler for GatewayService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mysql-gateway-mcp".to_owned(),
                title: Some("MySQL Gateway MCP".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Guarded SQL gateway for one MySQL database.\n\
                \n\
                ## Workflow\n\
                1. Call `get_schema` to see the tables you may touch\n\
                2. Run `execute_query` with SQL using allowed operations only\n\
                3. Use `get_table_structure` / `analyze_data` / `get_table_relations` for metadata\n\
                \n\
                ## Policy\n\
                - Operations outside the allow-list (default SELECT/SHOW/DESCRIBE) return `{success: false, error: \"query not allowed\"}`\n\
                - Statements matching dangerous patterns return `{success: false, error: \"dangerous query\"}`\n\
                - Table references are checked lexically against the allow-list via FROM/JOIN/UPDATE/INTO clauses\n\
                \n\
                ## Results\n\
                - Read queries: `rows`, `columns`, `row_count`, `has_more` (true when the row cap truncated the result), `execution_time_ms`\n\
                - Write statements: `affected_rows`, `execution_time_ms`\n\
                - Database errors are returned as `{success: false, error: ...}`, not protocol errors"
                    .to_string(),
            ),
        }
    }
}
