use crate::store::memory::InMemoryStore;
use crate::store::{RuleStore, StoreError, StoreResult};
use async_trait::async_trait;
use lin_authz::PolicyType;

pub(crate) fn rule(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn offline() -> StoreError {
    StoreError::Unexpected(anyhow::anyhow!("store offline"))
}

/// In-memory store that can be told to fail reads or inserts.
#[derive(Clone, Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: InMemoryStore,
    fail_reads: bool,
    fail_inserts: bool,
}

impl FlakyStore {
    pub(crate) fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_inserts(inner: InMemoryStore) -> Self {
        Self {
            inner,
            fail_inserts: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl RuleStore for FlakyStore {
    async fn contains_rule(&self, ptype: PolicyType, rule: &[String]) -> StoreResult<bool> {
        if self.fail_reads {
            return Err(offline());
        }
        self.inner.contains_rule(ptype, rule).await
    }

    async fn insert_rule(&self, ptype: PolicyType, rule: Vec<String>) -> StoreResult<bool> {
        if self.fail_inserts {
            return Err(offline());
        }
        self.inner.insert_rule(ptype, rule).await
    }

    async fn remove_rule(&self, ptype: PolicyType, rule: &[String]) -> StoreResult<bool> {
        self.inner.remove_rule(ptype, rule).await
    }

    async fn list_rules(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> StoreResult<Vec<Vec<String>>> {
        if self.fail_reads {
            return Err(offline());
        }
        self.inner.list_rules(ptype, field_index, values).await
    }

    async fn remove_filtered_rules(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> StoreResult<u64> {
        self.inner
            .remove_filtered_rules(ptype, field_index, values)
            .await
    }

    async fn rule_count(&self, ptype: PolicyType) -> StoreResult<u64> {
        self.inner.rule_count(ptype).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        if self.fail_reads {
            return Err(offline());
        }
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}
