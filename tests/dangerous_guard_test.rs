//! Integration tests for the dangerous-statement heuristics.
//!
//! The heuristics are independent of the allow-list: a query must pass both
//! checks before execution.

use mysql_gateway_mcp::policy::SecurityPolicy;

fn policy() -> SecurityPolicy {
    SecurityPolicy::default_policy()
}

#[test]
fn test_drop_detected() {
    assert!(policy().is_dangerous("DROP TABLE users"));
    assert!(policy().is_dangerous("drop database production"));
    assert!(policy().is_dangerous("SELECT 1; DROP TABLE users"));
}

#[test]
fn test_truncate_detected() {
    assert!(policy().is_dangerous("TRUNCATE TABLE users"));
    assert!(policy().is_dangerous("truncate users"));
}

#[test]
fn test_delete_without_where_detected() {
    assert!(policy().is_dangerous("DELETE FROM users"));
    assert!(policy().is_dangerous("delete from users"));
}

#[test]
fn test_delete_with_where_not_flagged() {
    assert!(!policy().is_dangerous("DELETE FROM users WHERE id = 1"));
}

#[test]
fn test_update_without_where_detected() {
    assert!(policy().is_dangerous("UPDATE users SET active = 0"));
}

#[test]
fn test_update_with_where_not_flagged() {
    assert!(!policy().is_dangerous("UPDATE users SET active = 0 WHERE id = 1"));
}

#[test]
fn test_inline_comment_detected() {
    assert!(policy().is_dangerous("SELECT * FROM users -- hidden"));
    assert!(policy().is_dangerous("SELECT 1 --"));
}

#[test]
fn test_multi_statement_detected() {
    assert!(policy().is_dangerous("SELECT 1; SELECT 2"));
    assert!(policy().is_dangerous("SELECT 1;DELETE FROM t WHERE 1=1"));
}

#[test]
fn test_trailing_semicolon_alone_not_flagged() {
    assert!(!policy().is_dangerous("SELECT * FROM users;"));
    assert!(!policy().is_dangerous("SELECT * FROM users;   "));
}

#[test]
fn test_exec_and_extended_procedures_detected() {
    assert!(policy().is_dangerous("EXEC sp_help"));
    assert!(policy().is_dangerous("SELECT xp_cmdshell('dir')"));
}

#[test]
fn test_system_keyword_detected() {
    assert!(policy().is_dangerous("SYSTEM ls"));
    assert!(policy().is_dangerous("SELECT SYSTEM FROM t"));
}

#[test]
fn test_plain_reads_are_safe() {
    assert!(!policy().is_dangerous("SELECT * FROM users WHERE id = 1"));
    assert!(!policy().is_dangerous("SHOW TABLES"));
    assert!(!policy().is_dangerous("DESCRIBE users"));
    assert!(!policy().is_dangerous(
        "SELECT u.name, COUNT(o.id) FROM users u JOIN orders o ON o.user_id = u.id \
         WHERE o.created_at > '2024-01-01' GROUP BY u.name"
    ));
}

/// Dangerous check runs even for queries the allow-list would admit.
#[test]
fn test_guard_is_independent_of_validation() {
    let policy = SecurityPolicy::new(
        vec!["users".to_string()],
        vec!["DELETE".to_string()],
        100,
        std::time::Duration::from_secs(30),
    );
    // validate passes (operation and table both allowed)...
    assert!(policy.validate("DELETE FROM users"));
    // ...but the guard still flags the missing WHERE
    assert!(policy.is_dangerous("DELETE FROM users"));
}
