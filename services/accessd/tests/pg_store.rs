//! Postgres rule store and engine against a real database.
//!
//! Run with `cargo test -p accessd --features pg-tests`, with
//! `LIN_ACCESS_TEST_DATABASE_URL` (or `DATABASE_URL`) pointing at a scratch
//! database. Tests are skipped when neither is set and truncate
//! `access_rules` before each run.
#![cfg(feature = "pg-tests")]

use accessd::config::PostgresConfig;
use accessd::engine::AccessControl;
use accessd::store::RuleStore;
use accessd::store::postgres::PostgresStore;
use lin_authz::{
    Action, PolicyType, ResourceAclParam, ResourceCategory, ResourceClass, Role, default_policies,
};
use serial_test::serial;
use std::sync::Arc;

fn database_url() -> Option<String> {
    std::env::var("LIN_ACCESS_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

async fn fresh_store() -> Option<PostgresStore> {
    let Some(url) = database_url() else {
        eprintln!("skipping postgres test: no database url");
        return None;
    };
    let store = PostgresStore::connect(&PostgresConfig {
        url,
        max_connections: 2,
        connect_timeout_ms: 10_000,
        acquire_timeout_ms: 10_000,
    })
    .await
    .expect("connect");
    sqlx::query("TRUNCATE access_rules")
        .execute(store.pool())
        .await
        .expect("truncate");
    Some(store)
}

fn rule(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[tokio::test]
#[serial]
async fn postgres_rule_roundtrip() {
    let Some(store) = fresh_store().await else {
        return;
    };
    store.health_check().await.expect("health");
    assert!(store.is_durable());

    let grouping = rule(&["lin", "admin"]);
    assert!(store
        .insert_rule(PolicyType::Grouping, grouping.clone())
        .await
        .expect("insert"));
    assert!(!store
        .insert_rule(PolicyType::Grouping, grouping.clone())
        .await
        .expect("duplicate"));
    assert!(store
        .contains_rule(PolicyType::Grouping, &grouping)
        .await
        .expect("contains"));
    // Same values in another table are a different row.
    assert!(!store
        .contains_rule(PolicyType::Api, &rule(&["lin", "admin", "read"]))
        .await
        .expect("contains"));

    let listed = store
        .list_rules(PolicyType::Grouping, 0, &[])
        .await
        .expect("list");
    assert_eq!(listed, vec![grouping.clone()]);
    assert!(store
        .remove_rule(PolicyType::Grouping, &grouping)
        .await
        .expect("remove"));
    assert_eq!(store.rule_count(PolicyType::Grouping).await.expect("count"), 0);
}

#[tokio::test]
#[serial]
async fn postgres_filtered_delete_is_scoped() {
    let Some(store) = fresh_store().await else {
        return;
    };
    for row in [
        ["admin", "7", "Component", "nav-1", "write"],
        ["viewer", "7", "Component", "nav-2", "read"],
        ["admin", "7", "Dashboard", "nav-1", "write"],
        ["admin", "8", "Component", "nav-1", "write"],
    ] {
        store
            .insert_rule(PolicyType::Resource, rule(&row))
            .await
            .expect("insert");
    }

    let scope = rule(&["7", "Component"]);
    assert_eq!(
        store
            .list_rules(PolicyType::Resource, 1, &scope)
            .await
            .expect("list")
            .len(),
        2
    );
    assert_eq!(
        store
            .remove_filtered_rules(PolicyType::Resource, 1, &scope)
            .await
            .expect("delete"),
        2
    );
    assert_eq!(store.rule_count(PolicyType::Resource).await.expect("count"), 2);
    assert!(store
        .remove_filtered_rules(PolicyType::Resource, 1, &rule(&["", ""]))
        .await
        .is_err());
}

#[tokio::test]
#[serial]
async fn postgres_engine_end_to_end() {
    let Some(store) = fresh_store().await else {
        return;
    };
    let access = AccessControl::with_defaults(Arc::new(store));
    let first = access.initialize().await.expect("initialize");
    assert_eq!(first.policies_added, default_policies().len());
    assert!(access.initialize().await.expect("again").is_noop());

    assert!(
        access
            .can_access(&Role::lin(), ResourceClass::AdminAccess, Action::Write)
            .await
    );
    assert!(
        !access
            .can_access(&Role::editor(), ResourceClass::AdminAccess, Action::Write)
            .await
    );

    let granted =
        ResourceAclParam::new(Role::admin(), 7, ResourceCategory::Component, "nav-1", Action::Write);
    access.add_resource_policy(&granted).await.expect("add");
    let other_org =
        ResourceAclParam::new(Role::admin(), 8, ResourceCategory::Component, "nav-1", Action::Write);
    let decisions = access
        .check_resources_acl(&[other_org, granted.clone()])
        .await
        .expect("batch");
    assert_eq!(decisions, vec![false, true]);
}
