//! Startup seeding of the role graph and the baseline policy table.
//!
//! Seeding is check-then-insert per row. Several processes may seed the same
//! store at once; the store's uniqueness guarantee turns the losing insert
//! into a no-op, so every process reports success.
use super::EngineResult;
use super::policy_store::PolicyStore;
use lin_authz::{Policy, PolicyType, RoleGraph};
use std::sync::Arc;

/// Rows written by one [`Synchronizer::initialize`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub groupings_added: usize,
    pub policies_added: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.groupings_added == 0 && self.policies_added == 0
    }
}

pub struct Synchronizer {
    store: Arc<dyn PolicyStore>,
    graph: Arc<RoleGraph>,
    policies: Vec<Policy>,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn PolicyStore>, graph: Arc<RoleGraph>, policies: Vec<Policy>) -> Self {
        Self {
            store,
            graph,
            policies,
        }
    }

    /// Seed every missing grouping edge, then every missing policy.
    ///
    /// # Errors
    /// The first store failure aborts the run. Rows written before it stay;
    /// the next run fills in the rest.
    pub async fn initialize(&self) -> EngineResult<SyncReport> {
        let mut report = SyncReport::default();

        for (child, parent) in self.graph.edges() {
            if self.store.has_grouping(child.as_str(), parent.as_str()).await? {
                continue;
            }
            if self.store.add_grouping(child.as_str(), parent.as_str()).await? {
                report.groupings_added += 1;
            }
        }

        for policy in &self.policies {
            let rule = policy.to_rule();
            if self.store.has_policy(PolicyType::Api, &rule).await? {
                continue;
            }
            if self.store.add_policy(PolicyType::Api, rule).await? {
                report.policies_added += 1;
            }
        }

        tracing::info!(
            groupings_added = report.groupings_added,
            policies_added = report.policies_added,
            "access control seeded"
        );
        Ok(report)
    }
}
