//! Query result models.
//!
//! A query produces exactly one of three shapes: rows (read-shaped
//! statements), an affected-row count (write-shaped statements), or a
//! failure message. Modeling this as a tagged union means a consumer cannot
//! accidentally read a field that the active variant does not carry.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Result of executing one query. Serializes untagged, so the `success`
/// flag and variant-specific fields appear at the top level.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum QueryOutcome {
    Read(ReadOutcome),
    Write(WriteOutcome),
    Failure(FailureOutcome),
}

/// Rows returned by a SELECT/SHOW/DESCRIBE statement.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReadOutcome {
    /// Always true
    pub success: bool,
    /// Row maps in projection order
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    pub row_count: usize,
    /// Column names in projection order; empty when the result had no rows
    pub columns: Vec<String>,
    /// True when at least one row existed beyond the configured cap
    pub has_more: bool,
    pub execution_time_ms: u64,
}

/// Affected-row count from a write-shaped statement.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WriteOutcome {
    /// Always true
    pub success: bool,
    pub affected_rows: u64,
    pub execution_time_ms: u64,
}

/// A policy rejection or execution-level error, carried as data.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FailureOutcome {
    /// Always false
    pub success: bool,
    pub error: String,
}

impl QueryOutcome {
    /// Build a read result. `row_count` is derived from the rows.
    pub fn read(
        rows: Vec<serde_json::Map<String, JsonValue>>,
        columns: Vec<String>,
        has_more: bool,
        execution_time_ms: u64,
    ) -> Self {
        let row_count = rows.len();
        Self::Read(ReadOutcome {
            success: true,
            rows,
            row_count,
            columns,
            has_more,
            execution_time_ms,
        })
    }

    /// Build a write result.
    pub fn write(affected_rows: u64, execution_time_ms: u64) -> Self {
        Self::Write(WriteOutcome {
            success: true,
            affected_rows,
            execution_time_ms,
        })
    }

    /// Build a failure result.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(FailureOutcome {
            success: false,
            error: error.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure(_))
    }

    /// The error message, when this outcome is a failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure(f) => Some(&f.error),
            _ => None,
        }
    }

    /// The rows, when this outcome is a read result.
    pub fn rows(&self) -> Option<&[serde_json::Map<String, JsonValue>]> {
        match self {
            Self::Read(r) => Some(&r.rows),
            _ => None,
        }
    }
}
