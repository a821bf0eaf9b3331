//! Query execution engine.
//!
//! The executor runs one policy-approved statement on the gateway
//! connection and normalizes whatever comes back into a [`QueryOutcome`]:
//! read-shaped statements (SELECT/SHOW/DESCRIBE) yield capped rows with a
//! has-more flag, anything else yields the driver-reported affected-row
//! count. Driver errors during execution become `Failure` outcomes - they
//! are data here, not control flow - while connection-acquisition failures
//! propagate as errors, matching the connection manager's contract.
//!
//! The connection runs in autocommit mode, so write statements are
//! committed by the server as they execute.

use crate::db::connection::ConnectionManager;
use crate::db::types::{column_names, row_to_json_map};
use crate::error::GatewayResult;
use crate::models::QueryOutcome;
use crate::policy;
use futures_util::StreamExt;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use std::time::Instant;
use tracing::{debug, warn};

/// Executes statements on the gateway connection.
pub struct QueryExecutor {
    default_row_cap: u32,
}

impl QueryExecutor {
    /// Create an executor whose default row cap is the policy's `max_rows`.
    pub fn new(default_row_cap: u32) -> Self {
        Self {
            default_row_cap: default_row_cap.max(1),
        }
    }

    pub fn default_row_cap(&self) -> u32 {
        self.default_row_cap
    }

    /// Execute with the default row cap.
    pub async fn execute(
        &self,
        manager: &ConnectionManager,
        sql: &str,
    ) -> GatewayResult<QueryOutcome> {
        self.execute_capped(manager, sql, self.default_row_cap).await
    }

    /// Execute with an explicit row cap.
    ///
    /// The wall clock starts after the connection is acquired, so elapsed
    /// time covers dispatch through the final fetch but never connection
    /// establishment.
    pub async fn execute_capped(
        &self,
        manager: &ConnectionManager,
        sql: &str,
        row_cap: u32,
    ) -> GatewayResult<QueryOutcome> {
        let mut handle = manager.acquire().await?;
        let start = Instant::now();

        debug!(sql = %sql, row_cap = row_cap, "executing statement");

        let outcome = if policy::is_read_shaped(sql) {
            run_read(&mut handle, sql, row_cap, start).await
        } else {
            run_write(&mut handle, sql, start).await
        };

        Ok(outcome)
    }
}

async fn run_read(
    conn: &mut MySqlConnection,
    sql: &str,
    row_cap: u32,
    start: Instant,
) -> QueryOutcome {
    use sqlx::Executor as _;

    // Fetch one row past the cap: its presence sets has_more, and it is
    // discarded rather than returned.
    let fetch_limit = row_cap as usize + 1;
    let results: Vec<Result<MySqlRow, sqlx::Error>> =
        conn.fetch(sql).take(fetch_limit).collect().await;

    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(error = %e, "query failed");
                return QueryOutcome::failure(execution_message(e));
            }
        }
    }

    let (rows, has_more) = cap_rows(rows, row_cap as usize);
    let columns = rows.first().map(column_names).unwrap_or_default();
    let json_rows = rows.iter().map(row_to_json_map).collect();
    let elapsed = start.elapsed().as_millis() as u64;

    QueryOutcome::read(json_rows, columns, has_more, elapsed)
}

async fn run_write(conn: &mut MySqlConnection, sql: &str, start: Instant) -> QueryOutcome {
    use sqlx::Executor as _;

    match conn.execute(sql).await {
        Ok(done) => QueryOutcome::write(done.rows_affected(), start.elapsed().as_millis() as u64),
        Err(e) => {
            warn!(error = %e, "write statement failed");
            QueryOutcome::failure(execution_message(e))
        }
    }
}

/// Enforce the row cap: keep at most `cap` rows, reporting whether more
/// existed.
fn cap_rows<T>(mut rows: Vec<T>, cap: usize) -> (Vec<T>, bool) {
    let has_more = rows.len() > cap;
    rows.truncate(cap);
    (rows, has_more)
}

/// The raw database message for execution-level failures; other driver
/// errors render through Display.
fn execution_message(err: sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_default_cap_clamped() {
        assert_eq!(QueryExecutor::new(0).default_row_cap(), 1);
        assert_eq!(QueryExecutor::new(500).default_row_cap(), 500);
    }

    #[test]
    fn test_cap_rows_under_cap() {
        let (rows, has_more) = cap_rows(vec![1, 2], 5);
        assert_eq!(rows, vec![1, 2]);
        assert!(!has_more);
    }

    #[test]
    fn test_cap_rows_exactly_at_cap() {
        let (rows, has_more) = cap_rows(vec![1, 2], 2);
        assert_eq!(rows, vec![1, 2]);
        assert!(!has_more);
    }

    #[test]
    fn test_cap_rows_probe_row_consumed() {
        // three rows fetched with cap 2: two returned, has_more set
        let (rows, has_more) = cap_rows(vec![1, 2, 3], 2);
        assert_eq!(rows, vec![1, 2]);
        assert!(has_more);
    }
}
