//! Access-control engine.
//!
//! # Purpose
//! Decides whether a role may act on a resource class (coarse API checks) or
//! on one resource instance inside a tenant (fine ACL checks), and maintains
//! the rules behind those decisions.
//!
//! # How it fits
//! Resource-owning services call [`AccessControl`]; it delegates to the
//! [`AclManager`] and the [`Synchronizer`], which go through a
//! [`PolicyStore`] to the configured [`RuleStore`].
//!
//! # Key invariants
//! - Every check reads the store; there is no decision cache.
//! - `try_*` methods return errors; the boolean forms log and deny.
//!
//! # Examples
//! ```rust
//! use accessd::engine::AccessControl;
//! use accessd::store::memory::InMemoryStore;
//! use lin_authz::{Action, ResourceClass, Role};
//! use std::sync::Arc;
//!
//! # async fn demo() -> accessd::engine::EngineResult<()> {
//! let access = AccessControl::with_defaults(Arc::new(InMemoryStore::new()));
//! access.initialize().await?;
//! assert!(access.can_access(&Role::lin(), ResourceClass::AdminAccess, Action::Write).await);
//! # Ok(())
//! # }
//! ```
use crate::store::{RuleStore, StoreError};
use lin_authz::{
    Action, AuthzError, Policy, PolicyType, ResourceAclParam, ResourceCategory, ResourceClass,
    Role, RoleGraph, default_policies,
};
use std::sync::Arc;
use thiserror::Error;

pub mod acl;
pub mod enforcer;
pub mod evaluator;
pub mod policy_store;
pub mod sync;
#[cfg(test)]
pub(crate) mod test_support;

pub use acl::AclManager;
pub use evaluator::Evaluator;
pub use policy_store::{CasbinPolicyStore, PolicyStore};
pub use sync::{SyncReport, Synchronizer};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Authz(#[from] AuthzError),
    #[error("casbin: {0}")]
    Casbin(#[from] casbin::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

pub struct AccessControl {
    graph: Arc<RoleGraph>,
    store: Arc<dyn PolicyStore>,
    sync: Synchronizer,
    acl: AclManager,
}

impl AccessControl {
    pub fn new(rules: Arc<dyn RuleStore>, graph: RoleGraph, policies: Vec<Policy>) -> Self {
        let graph = Arc::new(graph);
        let store: Arc<dyn PolicyStore> = Arc::new(CasbinPolicyStore::new(rules, graph.clone()));
        Self {
            sync: Synchronizer::new(store.clone(), graph.clone(), policies),
            acl: AclManager::new(store.clone()),
            graph,
            store,
        }
    }

    /// Engine over the reference role chain and the built-in policy table.
    pub fn with_defaults(rules: Arc<dyn RuleStore>) -> Self {
        Self::new(rules, RoleGraph::reference(), default_policies())
    }

    pub fn role_graph(&self) -> &RoleGraph {
        &self.graph
    }

    pub fn policy_store(&self) -> &Arc<dyn PolicyStore> {
        &self.store
    }

    pub fn acl(&self) -> &AclManager {
        &self.acl
    }

    pub async fn initialize(&self) -> EngineResult<SyncReport> {
        self.sync.initialize().await
    }

    /// Coarse check. Unknown classes deny; unknown roles are an error.
    pub async fn try_can_access(
        &self,
        role: &Role,
        class: impl AsRef<str>,
        action: Action,
    ) -> EngineResult<bool> {
        let request = vec![
            role.to_string(),
            class.as_ref().to_string(),
            action.as_str().to_string(),
        ];
        self.store.enforce(PolicyType::Api, &request).await
    }

    pub async fn can_access(&self, role: &Role, class: impl AsRef<str>, action: Action) -> bool {
        let class = class.as_ref();
        match self.try_can_access(role, class, action).await {
            Ok(allowed) => allowed,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    role = %role,
                    class,
                    action = %action,
                    "api access check failed; denying"
                );
                false
            }
        }
    }

    /// Coarse grants stored for `class`, as written; inherited grants are not
    /// expanded.
    ///
    /// # Errors
    /// - Store failures, or [`AuthzError`] if a stored row no longer decodes.
    pub async fn list_policies(&self, class: ResourceClass) -> EngineResult<Vec<Policy>> {
        let rows = self
            .store
            .get_filtered_policy(PolicyType::Api, 1, &[class.as_str().to_string()])
            .await?;
        rows.iter()
            .map(|row| Policy::from_rule(row).map_err(Into::into))
            .collect()
    }

    pub async fn check_resource_acl(&self, param: &ResourceAclParam) -> bool {
        self.acl.check_resource_acl(param).await
    }

    pub async fn check_resources_acl(&self, params: &[ResourceAclParam]) -> EngineResult<Vec<bool>> {
        self.acl.check_resources_acl(params).await
    }

    pub async fn add_resource_policy(&self, param: &ResourceAclParam) -> EngineResult<()> {
        self.acl.add_resource_policy(param).await
    }

    pub async fn remove_resource_policies_by_category(
        &self,
        org_id: i64,
        category: ResourceCategory,
    ) -> EngineResult<u64> {
        self.acl
            .remove_resource_policies_by_category(org_id, category)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::FlakyStore;
    use crate::store::memory::InMemoryStore;
    use lin_authz::RoleDefinition;

    async fn engine() -> AccessControl {
        let access = AccessControl::with_defaults(Arc::new(InMemoryStore::new()));
        access.initialize().await.expect("initialize");
        access
    }

    #[tokio::test]
    async fn admin_access_tier() {
        let access = engine().await;
        let class = ResourceClass::AdminAccess;
        assert!(access.can_access(&Role::lin(), class, Action::Write).await);
        assert!(access.can_access(&Role::admin(), class, Action::Write).await);
        assert!(!access.can_access(&Role::editor(), class, Action::Write).await);
        assert!(!access.can_access(&Role::viewer(), class, Action::Read).await);
        assert!(!access.can_access(&Role::anonymous(), class, Action::Read).await);
    }

    #[tokio::test]
    async fn grants_flow_up_the_chain() {
        let access = engine().await;
        for role in [Role::lin(), Role::admin(), Role::editor(), Role::viewer()] {
            assert!(
                access
                    .can_access(&role, ResourceClass::Dashboards, Action::Read)
                    .await,
                "{role} should read dashboards"
            );
        }
        assert!(
            access
                .can_access(&Role::editor(), ResourceClass::Charts, Action::Write)
                .await
        );
        assert!(
            !access
                .can_access(&Role::viewer(), ResourceClass::Charts, Action::Write)
                .await
        );
        assert!(
            access
                .can_access(&Role::lin(), ResourceClass::Organizations, Action::Write)
                .await
        );
        assert!(
            !access
                .can_access(&Role::admin(), ResourceClass::Organizations, Action::Write)
                .await
        );
    }

    #[tokio::test]
    async fn unknown_inputs() {
        let access = engine().await;
        assert!(!access.can_access(&Role::lin(), "NoSuchResource", Action::Read).await);
        assert!(
            !access
                .can_access(&Role::new("ghost"), ResourceClass::Teams, Action::Read)
                .await
        );
        assert!(matches!(
            access
                .try_can_access(&Role::new("ghost"), ResourceClass::Teams, Action::Read)
                .await,
            Err(EngineError::Authz(AuthzError::UnknownRole(_)))
        ));
    }

    #[tokio::test]
    async fn list_policies_decodes_stored_grants() {
        let access = engine().await;
        let mut policies = access
            .list_policies(ResourceClass::AdminAccess)
            .await
            .expect("list");
        policies.sort_by_key(|policy| policy.action.as_str());
        assert_eq!(
            policies,
            vec![
                Policy::new(Role::admin(), ResourceClass::AdminAccess, Action::Read),
                Policy::new(Role::admin(), ResourceClass::AdminAccess, Action::Write),
            ]
        );
    }

    #[tokio::test]
    async fn list_policies_rejects_rows_that_do_not_decode() {
        let rules = Arc::new(InMemoryStore::new());
        rules
            .insert_rule(
                PolicyType::Api,
                vec!["admin".to_string(), "TeamResource".to_string(), "own".to_string()],
            )
            .await
            .expect("raw row");
        let access = AccessControl::with_defaults(rules);
        assert!(matches!(
            access.list_policies(ResourceClass::Teams).await,
            Err(EngineError::Authz(AuthzError::InvalidAction(_)))
        ));
    }

    #[tokio::test]
    async fn long_role_chains_keep_inheriting() {
        let names: Vec<String> = (0..14).map(|idx| format!("r{idx}")).collect();
        let graph = RoleGraph::new(names.iter().enumerate().map(|(idx, name)| {
            let parent = names.get(idx + 1).map(|parent| Role::new(parent.as_str()));
            RoleDefinition::new(Role::new(name.as_str()), parent)
        }))
        .expect("chain");
        let policies = vec![Policy::new(Role::new("r13"), ResourceClass::Teams, Action::Read)];
        let access = AccessControl::new(Arc::new(InMemoryStore::new()), graph, policies);
        let report = access.initialize().await.expect("initialize");
        assert_eq!(report.groupings_added, 13);
        for name in &names {
            assert!(
                access
                    .try_can_access(&Role::new(name.as_str()), ResourceClass::Teams, Action::Read)
                    .await
                    .expect("check"),
                "{name} should inherit the grant"
            );
        }
    }

    #[tokio::test]
    async fn stray_grouping_rows_grant_nothing() {
        let rules = Arc::new(InMemoryStore::new());
        let access = AccessControl::with_defaults(rules.clone());
        access.initialize().await.expect("initialize");
        rules
            .insert_rule(
                PolicyType::Grouping,
                vec!["viewer".to_string(), "admin".to_string()],
            )
            .await
            .expect("stray grouping");
        assert!(
            !access
                .can_access(&Role::viewer(), ResourceClass::AdminAccess, Action::Write)
                .await
        );
        assert!(
            access
                .can_access(&Role::admin(), ResourceClass::AdminAccess, Action::Write)
                .await
        );
    }

    #[tokio::test]
    async fn unseeded_store_denies() {
        let access = AccessControl::with_defaults(Arc::new(InMemoryStore::new()));
        assert!(
            !access
                .can_access(&Role::lin(), ResourceClass::AdminAccess, Action::Write)
                .await
        );
    }

    #[tokio::test]
    async fn store_errors_surface_from_try_form() {
        let access = AccessControl::with_defaults(Arc::new(FlakyStore::failing_reads()));
        assert!(access.initialize().await.is_err());
        assert!(
            !access
                .can_access(&Role::lin(), ResourceClass::AdminAccess, Action::Write)
                .await
        );
        assert!(matches!(
            access
                .try_can_access(&Role::lin(), ResourceClass::AdminAccess, Action::Write)
                .await,
            Err(EngineError::Store(_))
        ));
    }

    #[tokio::test]
    async fn custom_graph_and_policies() {
        let graph = RoleGraph::new([
            RoleDefinition::new(Role::new("owner"), Some(Role::new("member"))),
            RoleDefinition::new(Role::new("member"), None),
        ])
        .expect("graph");
        let policies = vec![Policy::new(
            Role::new("member"),
            ResourceClass::Teams,
            Action::Read,
        )];
        let access = AccessControl::new(Arc::new(InMemoryStore::new()), graph, policies);
        let report = access.initialize().await.expect("initialize");
        assert_eq!(report.groupings_added, 1);
        assert_eq!(report.policies_added, 1);
        assert!(
            access
                .can_access(&Role::new("owner"), ResourceClass::Teams, Action::Read)
                .await
        );
        assert!(
            !access
                .can_access(&Role::lin(), ResourceClass::Teams, Action::Read)
                .await
        );
    }
}
