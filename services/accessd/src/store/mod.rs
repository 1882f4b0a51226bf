//! Durable storage for access-control rules.
//!
//! # Purpose
//! Defines the [`RuleStore`] trait the engine reads and writes through, and the
//! error type shared by its backends.
//!
//! # Backends
//! - [`memory::InMemoryStore`] for tests and single-process deployments.
//! - [`postgres::PostgresStore`] for shared, durable storage.
//!
//! # Key invariants
//! - At most one row exists per `(ptype, rule)`; inserting a duplicate returns
//!   `Ok(false)` rather than an error.
//! - Filters follow casbin semantics: empty values match any column value.
use async_trait::async_trait;
use lin_authz::{AuthzError, PolicyType};
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<AuthzError> for StoreError {
    fn from(err: AuthzError) -> Self {
        StoreError::InvalidRule(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn contains_rule(&self, ptype: PolicyType, rule: &[String]) -> StoreResult<bool>;
    /// Returns `false` when the row already existed.
    async fn insert_rule(&self, ptype: PolicyType, rule: Vec<String>) -> StoreResult<bool>;
    /// Returns `false` when no such row existed.
    async fn remove_rule(&self, ptype: PolicyType, rule: &[String]) -> StoreResult<bool>;
    async fn list_rules(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> StoreResult<Vec<Vec<String>>>;
    /// Deletes every row matching the filter and returns how many were removed.
    /// A filter that constrains no column is rejected.
    async fn remove_filtered_rules(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> StoreResult<u64>;
    async fn rule_count(&self, ptype: PolicyType) -> StoreResult<u64>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

pub(crate) fn validate_delete_filter(
    ptype: PolicyType,
    field_index: usize,
    values: &[String],
) -> StoreResult<()> {
    ptype.validate_filter(field_index, values)?;
    if !lin_authz::filter_is_constrained(values) {
        return Err(StoreError::InvalidRule(format!(
            "refusing unfiltered delete on {ptype}"
        )));
    }
    Ok(())
}
