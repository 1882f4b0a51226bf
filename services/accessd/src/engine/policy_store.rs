//! Policy store surface used by the synchronizer and the ACL manager.
//!
//! # Purpose
//! Combines rule storage with evaluation behind one trait so callers never
//! touch casbin or the storage backend directly.
//!
//! # Key invariants
//! - Every method is a read-through; nothing is cached between calls.
//! - Store errors are returned unchanged; absence of a rule is `Ok(false)`.
use super::evaluator::Evaluator;
use super::EngineResult;
use crate::store::RuleStore;
use async_trait::async_trait;
use lin_authz::{AuthzError, PolicyType, RoleGraph};
use std::sync::Arc;

#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn has_grouping(&self, child: &str, parent: &str) -> EngineResult<bool>;
    /// Returns `false` when the edge already existed.
    async fn add_grouping(&self, child: &str, parent: &str) -> EngineResult<bool>;
    async fn has_policy(&self, ptype: PolicyType, rule: &[String]) -> EngineResult<bool>;
    /// Returns `false` when the rule already existed.
    async fn add_policy(&self, ptype: PolicyType, rule: Vec<String>) -> EngineResult<bool>;
    async fn remove_policy(&self, ptype: PolicyType, rule: &[String]) -> EngineResult<bool>;
    async fn get_filtered_policy(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> EngineResult<Vec<Vec<String>>>;
    async fn enforce(&self, ptype: PolicyType, request: &[String]) -> EngineResult<bool>;
    /// One decision per request, in request order.
    async fn batch_enforce(
        &self,
        ptype: PolicyType,
        requests: &[Vec<String>],
    ) -> EngineResult<Vec<bool>>;
    /// Returns how many rules were removed.
    async fn remove_filtered_policy(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> EngineResult<u64>;
}

/// [`PolicyStore`] over a [`RuleStore`], evaluating with casbin.
#[derive(Clone)]
pub struct CasbinPolicyStore {
    rules: Arc<dyn RuleStore>,
    api: Evaluator,
    resource: Evaluator,
}

impl CasbinPolicyStore {
    pub fn new(rules: Arc<dyn RuleStore>, graph: Arc<RoleGraph>) -> Self {
        Self {
            api: Evaluator::api(rules.clone(), graph.clone()),
            resource: Evaluator::resource(rules.clone(), graph),
            rules,
        }
    }

    fn evaluator(&self, ptype: PolicyType) -> EngineResult<&Evaluator> {
        match ptype {
            PolicyType::Api => Ok(&self.api),
            PolicyType::Resource => Ok(&self.resource),
            PolicyType::Grouping => {
                Err(AuthzError::InvalidRule("grouping rules are not enforceable".to_string()).into())
            }
        }
    }
}

fn grouping(child: &str, parent: &str) -> Vec<String> {
    vec![child.to_string(), parent.to_string()]
}

#[async_trait]
impl PolicyStore for CasbinPolicyStore {
    async fn has_grouping(&self, child: &str, parent: &str) -> EngineResult<bool> {
        Ok(self
            .rules
            .contains_rule(PolicyType::Grouping, &grouping(child, parent))
            .await?)
    }

    async fn add_grouping(&self, child: &str, parent: &str) -> EngineResult<bool> {
        Ok(self
            .rules
            .insert_rule(PolicyType::Grouping, grouping(child, parent))
            .await?)
    }

    async fn has_policy(&self, ptype: PolicyType, rule: &[String]) -> EngineResult<bool> {
        Ok(self.rules.contains_rule(ptype, rule).await?)
    }

    async fn add_policy(&self, ptype: PolicyType, rule: Vec<String>) -> EngineResult<bool> {
        Ok(self.rules.insert_rule(ptype, rule).await?)
    }

    async fn remove_policy(&self, ptype: PolicyType, rule: &[String]) -> EngineResult<bool> {
        Ok(self.rules.remove_rule(ptype, rule).await?)
    }

    async fn get_filtered_policy(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> EngineResult<Vec<Vec<String>>> {
        Ok(self.rules.list_rules(ptype, field_index, values).await?)
    }

    async fn enforce(&self, ptype: PolicyType, request: &[String]) -> EngineResult<bool> {
        self.evaluator(ptype)?.enforce(request).await
    }

    async fn batch_enforce(
        &self,
        ptype: PolicyType,
        requests: &[Vec<String>],
    ) -> EngineResult<Vec<bool>> {
        self.evaluator(ptype)?.batch_enforce(requests).await
    }

    async fn remove_filtered_policy(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> EngineResult<u64> {
        Ok(self
            .rules
            .remove_filtered_rules(ptype, field_index, values)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::engine::test_support::{FlakyStore, rule};
    use crate::store::memory::InMemoryStore;

    fn policy_store() -> CasbinPolicyStore {
        CasbinPolicyStore::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(RoleGraph::reference()),
        )
    }

    #[tokio::test]
    async fn grouping_add_is_idempotent() {
        let store = policy_store();
        assert!(!store.has_grouping("lin", "admin").await.expect("has"));
        assert!(store.add_grouping("lin", "admin").await.expect("add"));
        assert!(!store.add_grouping("lin", "admin").await.expect("add again"));
        assert!(store.has_grouping("lin", "admin").await.expect("has"));
    }

    #[tokio::test]
    async fn enforce_reads_through_writes() {
        let store = policy_store();
        let request = rule(&["viewer", "OrgResource", "read"]);
        assert!(!store.enforce(PolicyType::Api, &request).await.expect("before"));
        store
            .add_policy(PolicyType::Api, request.clone())
            .await
            .expect("add");
        assert!(store.enforce(PolicyType::Api, &request).await.expect("after"));
        assert!(store.remove_policy(PolicyType::Api, &request).await.expect("remove"));
        assert!(!store.enforce(PolicyType::Api, &request).await.expect("removed"));
    }

    #[tokio::test]
    async fn filtered_policy_and_bulk_remove() {
        let store = policy_store();
        for row in [
            ["admin", "7", "Component", "nav-1", "write"],
            ["admin", "7", "Component", "nav-2", "write"],
            ["admin", "7", "Dashboard", "dash-1", "write"],
        ] {
            store
                .add_policy(PolicyType::Resource, rule(&row))
                .await
                .expect("add");
        }
        let scope = rule(&["7", "Component"]);
        assert_eq!(
            store
                .get_filtered_policy(PolicyType::Resource, 1, &scope)
                .await
                .expect("filtered")
                .len(),
            2
        );
        assert_eq!(
            store
                .remove_filtered_policy(PolicyType::Resource, 1, &scope)
                .await
                .expect("remove"),
            2
        );
        assert_eq!(
            store
                .get_filtered_policy(PolicyType::Resource, 0, &[])
                .await
                .expect("all")
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn grouping_is_not_enforceable() {
        let store = policy_store();
        let err = store
            .enforce(PolicyType::Grouping, &rule(&["lin", "admin"]))
            .await
            .expect_err("grouping");
        assert!(matches!(err, EngineError::Authz(AuthzError::InvalidRule(_))));
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let store = CasbinPolicyStore::new(
            Arc::new(FlakyStore::failing_reads()),
            Arc::new(RoleGraph::reference()),
        );
        assert!(matches!(
            store.has_grouping("lin", "admin").await,
            Err(EngineError::Store(_))
        ));
        assert!(matches!(
            store
                .enforce(PolicyType::Api, &rule(&["lin", "OrgResource", "write"]))
                .await,
            Err(EngineError::Store(_))
        ));
    }
}
