//! Error types for the MySQL gateway.
//!
//! This module defines all error types using `thiserror`. Policy and
//! execution failures are normally recovered into a structured
//! `QueryOutcome::Failure` before reaching the RPC boundary; the variants
//! here cover the paths that do propagate (connection establishment,
//! invalid tool arguments, introspection, internal faults).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Query rejected by policy: {reason}")]
    Policy { reason: String },

    #[error("Execution failed: {message}")]
    Execution {
        message: String,
        /// e.g., "42S02" for unknown table
        sql_state: Option<String>,
    },

    #[error("Schema introspection failed: {message}")]
    Introspection { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a policy rejection error.
    pub fn policy(reason: impl Into<String>) -> Self {
        Self::Policy {
            reason: reason.into(),
        }
    }

    /// Create an execution error with an optional SQLSTATE code.
    pub fn execution(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an introspection error.
    pub fn introspection(message: impl Into<String>) -> Self {
        Self::Introspection {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error is retryable on a later call.
    ///
    /// Connection losses self-heal through the ensure-connected path, so a
    /// caller seeing one may simply retry the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Convert sqlx errors to GatewayError.
impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => GatewayError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                GatewayError::execution(db_err.message(), code)
            }
            sqlx::Error::Io(io_err) => GatewayError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => GatewayError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => GatewayError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::RowNotFound => {
                GatewayError::execution("No rows returned", None)
            }
            sqlx::Error::ColumnNotFound(col) => {
                GatewayError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => GatewayError::internal(
                format!("Column index {} out of bounds (len: {})", index, len),
            ),
            sqlx::Error::ColumnDecode { index, source } => {
                GatewayError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => {
                GatewayError::internal(format!("Decode error: {}", source))
            }
            sqlx::Error::WorkerCrashed => GatewayError::internal("Database worker crashed"),
            _ => GatewayError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert GatewayError to MCP ErrorData for semantic error categorization.
impl From<GatewayError> for rmcp::ErrorData {
    fn from(err: GatewayError) -> Self {
        match &err {
            // Caller mistakes -> invalid_params
            GatewayError::InvalidInput { .. } | GatewayError::Policy { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), suggestion_data(err.suggestion()))
            }

            // Execution errors -> invalid_params with SQLSTATE in message
            GatewayError::Execution { message, sql_state } => {
                let msg = match sql_state {
                    Some(code) => format!("{} (SQLSTATE: {})", message, code),
                    None => message.clone(),
                };
                rmcp::ErrorData::invalid_params(msg, None)
            }

            // Connection errors -> internal_error with the suggestion attached
            GatewayError::Connection { suggestion, .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), suggestion_data(Some(suggestion)))
            }

            GatewayError::Introspection { .. } | GatewayError::Internal { .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::connection("Failed to connect", "Check credentials");
        assert!(err.to_string().contains("Connection failed"));
    }

    #[test]
    fn test_error_suggestion() {
        let err = GatewayError::connection("Failed to connect", "Check credentials");
        assert_eq!(err.suggestion(), Some("Check credentials"));
        assert!(GatewayError::policy("not allowed").suggestion().is_none());
    }

    #[test]
    fn test_error_retryable() {
        assert!(GatewayError::connection("err", "sugg").is_retryable());
        assert!(!GatewayError::policy("nope").is_retryable());
        assert!(!GatewayError::execution("syntax error", None).is_retryable());
    }

    #[test]
    fn test_invalid_input_maps_to_invalid_params() {
        let err = GatewayError::invalid_input("bad input");
        let mcp_err: rmcp::ErrorData = err.into();
        // invalid_params uses -32602
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_policy_maps_to_invalid_params() {
        let err = GatewayError::policy("operation not allowed");
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_connection_maps_to_internal_error() {
        let err = GatewayError::connection("failed", "try again");
        let mcp_err: rmcp::ErrorData = err.into();
        // internal_error uses -32603
        assert_eq!(mcp_err.code.0, -32603);
    }

    #[test]
    fn test_execution_error_includes_sql_state() {
        let err = GatewayError::execution("syntax error", Some("42000".to_string()));
        let mcp_err: rmcp::ErrorData = err.into();
        assert!(mcp_err.message.contains("42000"));
    }

    #[test]
    fn test_connection_error_includes_suggestion_in_data() {
        let err = GatewayError::connection("failed", "try reconnecting");
        let mcp_err: rmcp::ErrorData = err.into();
        let data = mcp_err.data.expect("suggestion data");
        assert_eq!(data["suggestion"], "try reconnecting");
    }
}
