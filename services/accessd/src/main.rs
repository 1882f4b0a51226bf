//! Access-control seeding entry point.
//!
//! # Purpose
//! Loads configuration, connects the configured rule store, and seeds the role
//! graph and baseline policies. Exits non-zero if the store is unreachable,
//! not durable, or seeding fails. Seeding the in-memory backend from a
//! one-shot process would write rules that vanish on exit.
//!
//! # Notes
//! The `build_store` helper keeps wiring testable and minimizes main setup logic.
use accessd::config::{self, AccessConfig};
use accessd::engine::{AccessControl, SyncReport};
use accessd::observability;
use accessd::store::RuleStore;
use accessd::store::memory::InMemoryStore;
use accessd::store::postgres::PostgresStore;
use anyhow::Context;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_observability("lin-accessd");
    let config = AccessConfig::from_env_or_yaml().context("load access config")?;
    let report = run(config).await?;
    tracing::info!(
        groupings_added = report.groupings_added,
        policies_added = report.policies_added,
        "access control ready"
    );
    Ok(())
}

async fn run(config: AccessConfig) -> anyhow::Result<SyncReport> {
    let store = build_store(&config).await?;
    ensure_durable(store.as_ref())?;
    store
        .health_check()
        .await
        .with_context(|| format!("{} store health check", store.backend_name()))?;
    tracing::info!(backend = store.backend_name(), "rule store connected");
    let access = AccessControl::with_defaults(store);
    access.initialize().await.context("seed access control")
}

fn ensure_durable(store: &dyn RuleStore) -> anyhow::Result<()> {
    if !store.is_durable() {
        anyhow::bail!(
            "{} store is not durable; set LIN_ACCESS_STORAGE=postgres to seed a shared store",
            store.backend_name()
        );
    }
    Ok(())
}

async fn build_store(config: &AccessConfig) -> anyhow::Result<Arc<dyn RuleStore>> {
    let store: Arc<dyn RuleStore> = match config.storage {
        config::StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        config::StorageBackend::Postgres => {
            let pg = config
                .postgres
                .as_ref()
                .context("postgres configuration missing")?;
            Arc::new(PostgresStore::connect(pg).await?)
        }
    };
    Ok(store)
}
