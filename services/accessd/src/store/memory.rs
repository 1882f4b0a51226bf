//! In-memory implementation of the rule store.
//!
//! # Purpose
//! Implements [`RuleStore`] with one ordered set per table guarded by
//! `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - single-process deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all rules are lost on restart; run the synchronizer on
//!   every start.
//! - **Single-process consistency**: a write is visible to every later read.
//!   Multiple processes each hold independent state.
//!
//! # Performance characteristics
//! - Exact lookups are `O(log n)`; filtered reads and deletes scan the table.
use super::{RuleStore, StoreResult, validate_delete_filter};
use async_trait::async_trait;
use lin_authz::{PolicyType, filter_matches};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

type RuleSet = Arc<RwLock<BTreeSet<Vec<String>>>>;

/// In-memory rule store.
///
/// Sets give the same uniqueness guarantee the Postgres backend gets from its
/// `UNIQUE` constraint, and a deterministic listing order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    /// `g` rows: `(child, parent)`.
    groupings: RuleSet,
    /// `p` rows: `(role, class, action)`.
    api_rules: RuleSet,
    /// `p2` rows: `(role, org, category, resource, action)`.
    resource_rules: RuleSet,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, ptype: PolicyType) -> &RuleSet {
        match ptype {
            PolicyType::Grouping => &self.groupings,
            PolicyType::Api => &self.api_rules,
            PolicyType::Resource => &self.resource_rules,
        }
    }
}

fn record_size(ptype: PolicyType, len: usize) {
    metrics::gauge!("lin_access_rules_total", "ptype" => ptype.ptype()).set(len as f64);
}

#[async_trait]
impl RuleStore for InMemoryStore {
    async fn contains_rule(&self, ptype: PolicyType, rule: &[String]) -> StoreResult<bool> {
        ptype.validate_rule(rule)?;
        Ok(self.table(ptype).read().await.contains(rule))
    }

    async fn insert_rule(&self, ptype: PolicyType, rule: Vec<String>) -> StoreResult<bool> {
        ptype.validate_rule(&rule)?;
        let mut rules = self.table(ptype).write().await;
        let inserted = rules.insert(rule);
        if inserted {
            metrics::counter!("lin_access_rule_writes_total", "ptype" => ptype.ptype(), "op" => "insert")
                .increment(1);
            record_size(ptype, rules.len());
        }
        Ok(inserted)
    }

    async fn remove_rule(&self, ptype: PolicyType, rule: &[String]) -> StoreResult<bool> {
        ptype.validate_rule(rule)?;
        let mut rules = self.table(ptype).write().await;
        let removed = rules.remove(rule);
        if removed {
            metrics::counter!("lin_access_rule_writes_total", "ptype" => ptype.ptype(), "op" => "delete")
                .increment(1);
            record_size(ptype, rules.len());
        }
        Ok(removed)
    }

    async fn list_rules(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> StoreResult<Vec<Vec<String>>> {
        ptype.validate_filter(field_index, values)?;
        Ok(self
            .table(ptype)
            .read()
            .await
            .iter()
            .filter(|rule| filter_matches(rule.as_slice(), field_index, values))
            .cloned()
            .collect())
    }

    async fn remove_filtered_rules(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> StoreResult<u64> {
        validate_delete_filter(ptype, field_index, values)?;
        let mut rules = self.table(ptype).write().await;
        let before = rules.len();
        rules.retain(|rule| !filter_matches(rule.as_slice(), field_index, values));
        let removed = (before - rules.len()) as u64;
        if removed > 0 {
            metrics::counter!("lin_access_rule_writes_total", "ptype" => ptype.ptype(), "op" => "delete")
                .increment(removed);
            record_size(ptype, rules.len());
        }
        Ok(removed)
    }

    async fn rule_count(&self, ptype: PolicyType) -> StoreResult<u64> {
        Ok(self.table(ptype).read().await.len() as u64)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
