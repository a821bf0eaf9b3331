//! Application context.
//!
//! One [`GatewayContext`] is constructed at startup and passed by `Arc`
//! into every request-scoped handler. It replaces module-level singletons:
//! the connection, the policy, the executor, and the shared schema model
//! all live here and nowhere else.

use crate::db::{ConnectionManager, QueryExecutor};
use crate::models::{ConnectionSettings, SchemaModel};
use crate::policy::SecurityPolicy;
use tokio::sync::RwLock;

pub struct GatewayContext {
    pub connection: ConnectionManager,
    pub policy: SecurityPolicy,
    pub executor: QueryExecutor,
    /// Shared schema model, refreshed by the schema tools.
    pub schema: RwLock<SchemaModel>,
}

impl GatewayContext {
    pub fn new(settings: ConnectionSettings, policy: SecurityPolicy) -> Self {
        let schema = RwLock::new(SchemaModel::new(settings.database.clone()));
        let executor = QueryExecutor::new(policy.max_rows());
        let connection = ConnectionManager::new(settings, policy.query_timeout());
        Self {
            connection,
            policy,
            executor,
            schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wires_policy_into_executor() {
        let settings =
            ConnectionSettings::from_url("mysql://root@localhost/test").expect("test URL");
        let policy = SecurityPolicy::new(
            Vec::new(),
            Vec::new(),
            42,
            std::time::Duration::from_secs(5),
        );
        let context = GatewayContext::new(settings, policy);
        assert_eq!(context.executor.default_row_cap(), 42);
        assert_eq!(context.connection.database(), "test");
    }
}
