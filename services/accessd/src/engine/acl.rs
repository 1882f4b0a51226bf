//! Fine-grained resource ACL management.
//!
//! # Purpose
//! Checks and maintains per-tenant `(role, org, category, resource, action)`
//! rows. This is the only writer of `p2` rules.
//!
//! # Key invariants
//! - A batch check returns `result[i]` for `params[i]`, or fails as a whole.
//! - Bulk removal touches exactly one `(org, category)` scope.
//! - Re-provisioning is remove-then-add without a transaction. A failure in
//!   between leaves fewer grants, never more.
use super::EngineResult;
use super::policy_store::PolicyStore;
use lin_authz::{AuthzError, PolicyType, ResourceAclParam, ResourceCategory};
use std::sync::Arc;

#[derive(Clone)]
pub struct AclManager {
    store: Arc<dyn PolicyStore>,
}

impl AclManager {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }

    /// Check one param, surfacing store and role errors.
    pub async fn try_check_resource_acl(&self, param: &ResourceAclParam) -> EngineResult<bool> {
        self.store
            .enforce(PolicyType::Resource, &param.to_rule())
            .await
    }

    /// Check one param; any error is logged and treated as a deny.
    pub async fn check_resource_acl(&self, param: &ResourceAclParam) -> bool {
        match self.try_check_resource_acl(param).await {
            Ok(allowed) => allowed,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    role = %param.role,
                    org_id = param.org_id,
                    category = %param.category,
                    resource_id = %param.resource_id,
                    "resource acl check failed; denying"
                );
                false
            }
        }
    }

    pub async fn check_resources_acl(&self, params: &[ResourceAclParam]) -> EngineResult<Vec<bool>> {
        let requests: Vec<Vec<String>> = params.iter().map(ResourceAclParam::to_rule).collect();
        self.store
            .batch_enforce(PolicyType::Resource, &requests)
            .await
    }

    /// Grant `param`. Adding an existing row succeeds without writing.
    pub async fn add_resource_policy(&self, param: &ResourceAclParam) -> EngineResult<()> {
        let rule = param.to_rule();
        if self.store.has_policy(PolicyType::Resource, &rule).await? {
            return Ok(());
        }
        if self.store.add_policy(PolicyType::Resource, rule).await? {
            tracing::debug!(
                role = %param.role,
                org_id = param.org_id,
                category = %param.category,
                resource_id = %param.resource_id,
                "resource acl added"
            );
        }
        Ok(())
    }

    /// Revoke a single row. Returns `false` when it did not exist.
    pub async fn remove_resource_policy(&self, param: &ResourceAclParam) -> EngineResult<bool> {
        self.store
            .remove_policy(PolicyType::Resource, &param.to_rule())
            .await
    }

    /// Delete every row of one tenant and category.
    pub async fn remove_resource_policies_by_category(
        &self,
        org_id: i64,
        category: ResourceCategory,
    ) -> EngineResult<u64> {
        let removed = self
            .store
            .remove_filtered_policy(
                PolicyType::Resource,
                1,
                &ResourceAclParam::scope_filter(org_id, category),
            )
            .await?;
        tracing::info!(org_id, category = %category, removed, "resource acls cleared");
        Ok(removed)
    }

    pub async fn list_resource_policies(
        &self,
        org_id: i64,
        category: ResourceCategory,
    ) -> EngineResult<Vec<ResourceAclParam>> {
        let rows = self
            .store
            .get_filtered_policy(
                PolicyType::Resource,
                1,
                &ResourceAclParam::scope_filter(org_id, category),
            )
            .await?;
        rows.iter()
            .map(|row| ResourceAclParam::from_rule(row).map_err(Into::into))
            .collect()
    }

    /// Replace the rows of one tenant and category with `params`.
    ///
    /// # Errors
    /// - [`AuthzError::ScopeMismatch`] if any param lies outside the scope;
    ///   nothing is deleted in that case.
    /// - Store failures. If one happens after the delete, the scope is left
    ///   with a subset of `params`; re-running the call converges.
    pub async fn replace_resource_policies(
        &self,
        org_id: i64,
        category: ResourceCategory,
        params: &[ResourceAclParam],
    ) -> EngineResult<()> {
        if let Some(stray) = params.iter().find(|param| !param.in_scope(org_id, category)) {
            return Err(AuthzError::ScopeMismatch {
                org_id,
                category: category.to_string(),
                actual: format!("{}/{}", stray.org_id, stray.category),
            }
            .into());
        }

        self.remove_resource_policies_by_category(org_id, category)
            .await?;
        for param in params {
            self.add_resource_policy(param).await?;
        }
        Ok(())
    }
}
