//! Casbin enforcer builder for the two evaluation layers.
//!
//! # Purpose and responsibility
//! Constructs a short-lived in-memory Casbin enforcer from rules read out of
//! the store, for one check or one batch.
//!
//! # Key invariants and assumptions
//! - API enforcers use the 3-column model, resource enforcers the 5-column
//!   model; both resolve subjects through `g`.
//! - Stored `p2` rows are loaded into the resource model's `p` section.
//!
//! # Security considerations
//! - Rows are trusted: permission rows were validated on write by the rule
//!   store and `groupings` come from the role graph, not the store.
use casbin::{CoreApi, DefaultModel, Enforcer, MemoryAdapter, MgmtApi, Result};

/// Build an in-memory Casbin enforcer over `model`.
///
/// # Errors
/// - Casbin errors for invalid rules or role-link construction failures.
///
/// # Example
/// ```rust
/// use accessd::engine::enforcer::build_enforcer;
///
/// # async fn build() -> casbin::Result<()> {
/// let policies = vec![vec!["admin".to_string(), "OrgResource".to_string(), "write".to_string()]];
/// let groupings = vec![vec!["lin".to_string(), "admin".to_string()]];
/// let model = lin_authz::api_model().await?;
/// let _ = build_enforcer(model, policies, groupings).await?;
/// # Ok(())
/// # }
/// ```
pub async fn build_enforcer(
    model: DefaultModel,
    policies: Vec<Vec<String>>,
    groupings: Vec<Vec<String>>,
) -> Result<Enforcer> {
    let mut enforcer = Enforcer::new(model, MemoryAdapter::default()).await?;

    // Empty batches are skipped.
    if !policies.is_empty() {
        enforcer.add_policies(policies).await?;
    }
    if !groupings.is_empty() {
        enforcer.add_grouping_policies(groupings).await?;
    }

    enforcer.build_role_links()?;
    Ok(enforcer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lin_authz::{api_model, resource_model};

    fn rule(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn api_enforcer_follows_groupings() {
        let enforcer = build_enforcer(
            api_model().await.expect("model"),
            vec![rule(&["admin", "AdminAccessResource", "write"])],
            vec![rule(&["lin", "admin"])],
        )
        .await
        .expect("enforcer");
        assert!(
            enforcer
                .enforce(("lin", "AdminAccessResource", "write"))
                .expect("enforce")
        );
        assert!(
            !enforcer
                .enforce(("editor", "AdminAccessResource", "write"))
                .expect("enforce")
        );
    }

    #[tokio::test]
    async fn resource_enforcer_matches_scope_exactly() {
        let enforcer = build_enforcer(
            resource_model().await.expect("model"),
            vec![rule(&["editor", "7", "Component", "nav-1", "read"])],
            vec![rule(&["admin", "editor"])],
        )
        .await
        .expect("enforcer");
        assert!(
            enforcer
                .enforce(("admin", "7", "Component", "nav-1", "read"))
                .expect("enforce")
        );
        assert!(
            !enforcer
                .enforce(("admin", "8", "Component", "nav-1", "read"))
                .expect("enforce")
        );
        assert!(
            !enforcer
                .enforce(("admin", "7", "Dashboard", "nav-1", "read"))
                .expect("enforce")
        );
    }

    #[tokio::test]
    async fn empty_enforcer_denies() {
        let enforcer = build_enforcer(api_model().await.expect("model"), Vec::new(), Vec::new())
            .await
            .expect("enforcer");
        assert!(
            !enforcer
                .enforce(("lin", "OrgResource", "write"))
                .expect("enforce")
        );
    }
}
