//! Query classification and safety policy.
//!
//! This module decides whether a query may run at all. Classification is
//! purely lexical: the leading keyword names the operation, and table
//! references are extracted by scanning for `FROM`/`JOIN`/`UPDATE`/`INTO`
//! clauses. This is a best-effort scan, not a parser - tables referenced
//! through subqueries, CTEs, or vendor syntax are not seen, which is the
//! documented contract of the allow-list.
//!
//! The dangerous-pattern heuristics are advisory. They stop accidental or
//! naively harmful statements from an LLM-driven caller; they are not a
//! security boundary against a principal with raw database access.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::warn;

/// Operations permitted when no allow-list is configured.
pub const DEFAULT_ALLOWED_OPERATIONS: &[&str] = &["SELECT", "SHOW", "DESCRIBE"];

/// Default cap on rows returned by a read-shaped query.
pub const DEFAULT_MAX_ROWS: u32 = 1000;

/// Default query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Table references introduced by FROM/JOIN/UPDATE/INTO, optionally backtick-quoted.
static TABLE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:FROM|JOIN|UPDATE|INTO)\s+`?([A-Za-z_][A-Za-z0-9_]*)`?")
        .expect("table reference pattern")
});

static WHERE_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bWHERE\b").expect("where pattern"));

static DELETE_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDELETE\b").expect("delete pattern"));

static UPDATE_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bUPDATE\b").expect("update pattern"));

/// Patterns that flag a query as dangerous regardless of the allow-list.
static DANGEROUS_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\bDROP\b", "DROP statement"),
        (r"(?i)\bTRUNCATE\b", "TRUNCATE statement"),
        (r"--", "inline comment"),
        (r";\s*\S", "multiple statements"),
        (r"(?i)\bEXEC\b", "EXEC statement"),
        (r"(?i)\bXP_\w", "extended stored procedure"),
        (r"(?i)\bSYSTEM\b", "SYSTEM keyword"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).expect("dangerous pattern"), label))
    .collect()
});

/// Extract the leading operation keyword of a query, upper-cased.
///
/// Returns `None` when the query is empty or does not start with an
/// alphabetic token - callers treat that as a rejection, never a panic.
pub fn classify_operation(query: &str) -> Option<String> {
    let token: String = query
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if token.is_empty() {
        None
    } else {
        Some(token.to_ascii_uppercase())
    }
}

/// Check whether a query returns rows (SELECT/SHOW/DESCRIBE) rather than an
/// affected-row count.
pub fn is_read_shaped(query: &str) -> bool {
    matches!(
        classify_operation(query).as_deref(),
        Some("SELECT" | "SHOW" | "DESCRIBE")
    )
}

/// Tables referenced via FROM/JOIN/UPDATE/INTO clauses, lower-cased.
pub fn referenced_tables(query: &str) -> Vec<String> {
    TABLE_REF
        .captures_iter(query)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

/// Allow-list policy for query execution.
///
/// Immutable after construction; built from configuration at startup and
/// shared by reference for the lifetime of the service.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    /// Lower-cased allowed table names. Empty = unrestricted.
    allowed_tables: Vec<String>,
    /// Upper-cased allowed operation keywords.
    allowed_operations: HashSet<String>,
    max_rows: u32,
    query_timeout: Duration,
}

impl SecurityPolicy {
    /// Create a policy. An empty operation list falls back to the default
    /// read-only set; `max_rows` is clamped to at least 1.
    pub fn new(
        allowed_tables: Vec<String>,
        allowed_operations: Vec<String>,
        max_rows: u32,
        query_timeout: Duration,
    ) -> Self {
        let allowed_tables: Vec<String> = allowed_tables
            .into_iter()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let allowed_operations: HashSet<String> = if allowed_operations.is_empty() {
            DEFAULT_ALLOWED_OPERATIONS
                .iter()
                .map(|op| op.to_string())
                .collect()
        } else {
            allowed_operations
                .into_iter()
                .map(|op| op.trim().to_ascii_uppercase())
                .filter(|op| !op.is_empty())
                .collect()
        };

        Self {
            allowed_tables,
            allowed_operations,
            max_rows: max_rows.max(1),
            query_timeout,
        }
    }

    /// Unrestricted read-only policy with default limits.
    pub fn default_policy() -> Self {
        Self::new(
            Vec::new(),
            Vec::new(),
            DEFAULT_MAX_ROWS,
            Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        )
    }

    pub fn max_rows(&self) -> u32 {
        self.max_rows
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Lower-cased allowed table names; empty when unrestricted.
    pub fn allowed_tables(&self) -> &[String] {
        &self.allowed_tables
    }

    pub fn has_table_restrictions(&self) -> bool {
        !self.allowed_tables.is_empty()
    }

    /// Case-insensitive table allow-list check. Always true when the list
    /// is empty.
    pub fn table_allowed(&self, table: &str) -> bool {
        if self.allowed_tables.is_empty() {
            return true;
        }
        let lower = table.to_ascii_lowercase();
        self.allowed_tables.contains(&lower)
    }

    /// Validate a query against the operation and table allow-lists.
    pub fn validate(&self, query: &str) -> bool {
        if query.trim().is_empty() {
            warn!("rejected empty query");
            return false;
        }

        let Some(operation) = classify_operation(query) else {
            warn!(query = %query, "rejected query with no leading keyword");
            return false;
        };

        if !self.allowed_operations.contains(&operation) {
            warn!(operation = %operation, "operation not allowed");
            return false;
        }

        if self.has_table_restrictions() {
            for table in referenced_tables(query) {
                if !self.table_allowed(&table) {
                    warn!(table = %table, "table not allowed");
                    return false;
                }
            }
        }

        true
    }

    /// Heuristic check for statements likely to cause data loss or abuse.
    ///
    /// Independent of [`validate`](Self::validate); both must pass before
    /// execution. Flags DROP, TRUNCATE, DELETE/UPDATE with no WHERE clause,
    /// inline comments, multi-statement input, EXEC, `xp_` procedures, and
    /// the SYSTEM keyword.
    pub fn is_dangerous(&self, query: &str) -> bool {
        for (pattern, label) in DANGEROUS_PATTERNS.iter() {
            if pattern.is_match(query) {
                warn!(pattern = label, "dangerous query pattern detected");
                return true;
            }
        }

        let has_where = WHERE_CLAUSE.is_match(query);
        if DELETE_STMT.is_match(query) && !has_where {
            warn!("DELETE without WHERE clause");
            return true;
        }
        if UPDATE_STMT.is_match(query) && !has_where {
            warn!("UPDATE without WHERE clause");
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_only_policy(tables: &[&str]) -> SecurityPolicy {
        SecurityPolicy::new(
            tables.iter().map(|t| t.to_string()).collect(),
            Vec::new(),
            100,
            Duration::from_secs(30),
        )
    }

    #[test]
    fn test_classify_operation_basic() {
        assert_eq!(
            classify_operation("SELECT * FROM users").as_deref(),
            Some("SELECT")
        );
        assert_eq!(
            classify_operation("  select 1").as_deref(),
            Some("SELECT")
        );
        assert_eq!(classify_operation("show tables").as_deref(), Some("SHOW"));
    }

    #[test]
    fn test_classify_operation_rejects_empty() {
        assert_eq!(classify_operation(""), None);
        assert_eq!(classify_operation("   "), None);
        assert_eq!(classify_operation("123"), None);
        assert_eq!(classify_operation("*"), None);
    }

    #[test]
    fn test_is_read_shaped() {
        assert!(is_read_shaped("SELECT 1"));
        assert!(is_read_shaped("show databases"));
        assert!(is_read_shaped("DESCRIBE users"));
        assert!(!is_read_shaped("INSERT INTO t VALUES (1)"));
        assert!(!is_read_shaped(""));
    }

    #[test]
    fn test_referenced_tables_clauses() {
        let tables = referenced_tables(
            "SELECT * FROM users JOIN orders ON users.id = orders.user_id",
        );
        assert_eq!(tables, vec!["users", "orders"]);

        assert_eq!(referenced_tables("UPDATE `products` SET x = 1"), vec!["products"]);
        assert_eq!(
            referenced_tables("INSERT INTO logs (msg) VALUES ('hi')"),
            vec!["logs"]
        );
    }

    #[test]
    fn test_referenced_tables_backticks_and_case() {
        assert_eq!(referenced_tables("select * from `Users`"), vec!["users"]);
    }

    #[test]
    fn test_validate_allows_select_on_allowed_table() {
        let policy = read_only_policy(&["users"]);
        assert!(policy.validate("SELECT * FROM users"));
    }

    #[test]
    fn test_validate_rejects_table_outside_allow_list() {
        let policy = read_only_policy(&["users"]);
        assert!(!policy.validate("SELECT * FROM orders"));
        assert!(!policy.validate("SELECT * FROM users JOIN orders ON 1=1"));
    }

    #[test]
    fn test_validate_table_check_case_insensitive() {
        let policy = read_only_policy(&["Users"]);
        assert!(policy.validate("SELECT * FROM USERS"));
        assert!(policy.validate("SELECT * FROM `users`"));
    }

    #[test]
    fn test_validate_rejects_disallowed_operation() {
        let policy = read_only_policy(&[]);
        assert!(!policy.validate("INSERT INTO users VALUES (1)"));
        assert!(!policy.validate("DELETE FROM users WHERE id = 1"));
    }

    #[test]
    fn test_validate_rejects_empty_query() {
        let policy = read_only_policy(&[]);
        assert!(!policy.validate(""));
        assert!(!policy.validate("   \n\t"));
    }

    #[test]
    fn test_validate_unrestricted_tables() {
        let policy = read_only_policy(&[]);
        assert!(policy.validate("SELECT * FROM anything"));
    }

    #[test]
    fn test_custom_operations() {
        let policy = SecurityPolicy::new(
            Vec::new(),
            vec!["SELECT".into(), "insert".into()],
            100,
            Duration::from_secs(30),
        );
        assert!(policy.validate("INSERT INTO t VALUES (1)"));
        assert!(!policy.validate("SHOW TABLES"));
    }

    #[test]
    fn test_dangerous_drop_and_truncate() {
        let policy = read_only_policy(&[]);
        assert!(policy.is_dangerous("DROP TABLE users"));
        assert!(policy.is_dangerous("drop database test"));
        assert!(policy.is_dangerous("TRUNCATE TABLE users"));
    }

    #[test]
    fn test_dangerous_delete_update_without_where() {
        let policy = read_only_policy(&[]);
        assert!(policy.is_dangerous("DELETE FROM users"));
        assert!(policy.is_dangerous("UPDATE users SET active = 0"));
        assert!(!policy.is_dangerous("DELETE FROM users WHERE id = 1"));
        assert!(!policy.is_dangerous("UPDATE users SET active = 0 WHERE id = 1"));
    }

    #[test]
    fn test_dangerous_is_independent_of_allow_list() {
        // DELETE on an allowed table is still flagged
        let policy = read_only_policy(&["users"]);
        assert!(policy.is_dangerous("DELETE FROM users"));
    }

    #[test]
    fn test_dangerous_injection_markers() {
        let policy = read_only_policy(&[]);
        assert!(policy.is_dangerous("SELECT 1 -- comment"));
        assert!(policy.is_dangerous("SELECT 1; DROP TABLE users"));
        assert!(policy.is_dangerous("SELECT 1; SELECT 2"));
        assert!(policy.is_dangerous("EXEC something"));
        assert!(policy.is_dangerous("SELECT xp_cmdshell"));
        assert!(policy.is_dangerous("SELECT SYSTEM stuff"));
    }

    #[test]
    fn test_safe_select_not_dangerous() {
        let policy = read_only_policy(&[]);
        assert!(!policy.is_dangerous("SELECT * FROM users WHERE id = 1"));
        assert!(!policy.is_dangerous("SELECT * FROM users;"));
        assert!(!policy.is_dangerous("SHOW TABLES"));
    }

    #[test]
    fn test_max_rows_clamped() {
        let policy = SecurityPolicy::new(Vec::new(), Vec::new(), 0, Duration::from_secs(1));
        assert_eq!(policy.max_rows(), 1);
    }

    #[test]
    fn test_default_policy() {
        let policy = SecurityPolicy::default_policy();
        assert_eq!(policy.max_rows(), DEFAULT_MAX_ROWS);
        assert!(!policy.has_table_restrictions());
        assert!(policy.validate("SELECT 1"));
        assert!(!policy.validate("INSERT INTO t VALUES (1)"));
    }
}
