//! Postgres-backed implementation of the rule store.
//!
//! # What this module is
//! Implements [`RuleStore`] on a single `access_rules` table shared by every
//! process that embeds the engine. Grouping, API and resource rules live side
//! by side, distinguished by their casbin section name (`ptype`).
//!
//! # Key invariants
//! - `UNIQUE (ptype, v0..v4)` is the only deduplication mechanism; concurrent
//!   seeders race freely and `ON CONFLICT DO NOTHING` absorbs duplicates.
//! - Rules shorter than five columns are padded with `''`; reads trim back to
//!   the table's arity.
//!
//! # Security notes
//! - Database URLs may contain credentials; never log them.
//! - Filtered queries build their `WHERE` clause from [`RULE_COLUMNS`], a fixed
//!   allowlist. Values are always bound, never formatted into SQL.
//!
//! # Operational notes
//! - Migrations run at connect time so callers can assume the schema exists.
//! - Pool size and acquire timeout are explicit; a store that hangs on a dead
//!   database is worse than one that fails fast.
use super::{RuleStore, StoreResult, validate_delete_filter};
use crate::config::PostgresConfig;
use async_trait::async_trait;
use lin_authz::PolicyType;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use std::time::Duration;

/// Column names in positional order. Only these may appear in dynamic SQL.
const RULE_COLUMNS: [&str; 5] = ["v0", "v1", "v2", "v3", "v4"];

/// Durable rule store backed by Postgres.
///
/// # Example
/// ```rust,no_run
/// use accessd::config::PostgresConfig;
/// use accessd::store::postgres::PostgresStore;
///
/// async fn open(pg: PostgresConfig) {
///     let _ = PostgresStore::connect(&pg).await;
/// }
/// ```
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(Debug, Clone, FromRow)]
struct DbRule {
    v0: String,
    v1: String,
    v2: String,
    v3: String,
    v4: String,
}

impl DbRule {
    fn into_rule(self, ptype: PolicyType) -> Vec<String> {
        let mut rule = vec![self.v0, self.v1, self.v2, self.v3, self.v4];
        rule.truncate(ptype.arity());
        rule
    }
}

impl PostgresStore {
    /// Connect, apply migrations, and return a ready store.
    ///
    /// # Errors
    /// - Connection, pool, or migration failures. Startup should abort on any
    ///   of them rather than run against a partial schema.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let connect = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options);
        let pool = tokio::time::timeout(Duration::from_millis(pg.connect_timeout_ms), connect)
            .await
            .map_err(|_| sqlx::Error::PoolTimedOut)??;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    #[cfg(feature = "pg-tests")]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn padded(rule: &[String]) -> [&str; 5] {
    let mut columns = [""; 5];
    for (slot, value) in columns.iter_mut().zip(rule) {
        *slot = value.as_str();
    }
    columns
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, field_index: usize, values: &[String]) {
    for (offset, value) in values.iter().enumerate() {
        // Empty filter values are wildcards and add no predicate.
        if value.is_empty() {
            continue;
        }
        query
            .push(" AND ")
            .push(RULE_COLUMNS[field_index + offset])
            .push(" = ")
            .push_bind(value.clone());
    }
}

fn record_write(ptype: PolicyType, op: &'static str, count: u64) {
    if count > 0 {
        metrics::counter!("lin_access_rule_writes_total", "ptype" => ptype.ptype(), "op" => op)
            .increment(count);
    }
}

#[async_trait]
impl RuleStore for PostgresStore {
    async fn contains_rule(&self, ptype: PolicyType, rule: &[String]) -> StoreResult<bool> {
        ptype.validate_rule(rule)?;
        let [v0, v1, v2, v3, v4] = padded(rule);
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM access_rules \
             WHERE ptype = $1 AND v0 = $2 AND v1 = $3 AND v2 = $4 AND v3 = $5 AND v4 = $6)",
        )
        .bind(ptype.ptype())
        .bind(v0)
        .bind(v1)
        .bind(v2)
        .bind(v3)
        .bind(v4)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_rule(&self, ptype: PolicyType, rule: Vec<String>) -> StoreResult<bool> {
        ptype.validate_rule(&rule)?;
        let [v0, v1, v2, v3, v4] = padded(&rule);
        let result = sqlx::query(
            "INSERT INTO access_rules (ptype, v0, v1, v2, v3, v4) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT DO NOTHING",
        )
        .bind(ptype.ptype())
        .bind(v0)
        .bind(v1)
        .bind(v2)
        .bind(v3)
        .bind(v4)
        .execute(&self.pool)
        .await?;
        record_write(ptype, "insert", result.rows_affected());
        Ok(result.rows_affected() == 1)
    }

    async fn remove_rule(&self, ptype: PolicyType, rule: &[String]) -> StoreResult<bool> {
        ptype.validate_rule(rule)?;
        let [v0, v1, v2, v3, v4] = padded(rule);
        let result = sqlx::query(
            "DELETE FROM access_rules \
             WHERE ptype = $1 AND v0 = $2 AND v1 = $3 AND v2 = $4 AND v3 = $5 AND v4 = $6",
        )
        .bind(ptype.ptype())
        .bind(v0)
        .bind(v1)
        .bind(v2)
        .bind(v3)
        .bind(v4)
        .execute(&self.pool)
        .await?;
        record_write(ptype, "delete", result.rows_affected());
        Ok(result.rows_affected() > 0)
    }

    async fn list_rules(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> StoreResult<Vec<Vec<String>>> {
        ptype.validate_filter(field_index, values)?;
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT v0, v1, v2, v3, v4 FROM access_rules WHERE ptype = ",
        );
        query.push_bind(ptype.ptype());
        push_filter(&mut query, field_index, values);
        query.push(" ORDER BY id");
        let rows: Vec<DbRule> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|row| row.into_rule(ptype)).collect())
    }

    async fn remove_filtered_rules(
        &self,
        ptype: PolicyType,
        field_index: usize,
        values: &[String],
    ) -> StoreResult<u64> {
        validate_delete_filter(ptype, field_index, values)?;
        let mut query = QueryBuilder::<Postgres>::new("DELETE FROM access_rules WHERE ptype = ");
        query.push_bind(ptype.ptype());
        push_filter(&mut query, field_index, values);
        let result = query.build().execute(&self.pool).await?;
        record_write(ptype, "delete", result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn rule_count(&self, ptype: PolicyType) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM access_rules WHERE ptype = $1")
            .bind(ptype.ptype())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
