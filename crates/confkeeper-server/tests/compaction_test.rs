//! Compaction integration tests
//!
//! A full `compact` pass touches every key in the database, so the global
//! pass is only exercised on a private SQLite database; against a shared
//! `TEST_DATABASE_URL` the same checks run per key through `compact_key`.

mod common;

use confkeeper_config::ConfigUpdate;
use confkeeper_config::service::compaction::{compact, compact_key};
use confkeeper_config::service::config;
use confkeeper_config::ListFilter;
use confkeeper_persistence::{ConfigKey, ConfigRecord};
use sea_orm::DatabaseConnection;
use tokio::task::JoinSet;

use common::{DEFAULT_GROUP, TEST_AUTHOR, TestDatabase, unique_name, whitelist};

async fn publish(db: &DatabaseConnection, key: &ConfigKey, versions: usize) -> ConfigRecord {
    let wl = whitelist();
    let mut latest = config::create(db, &wl, key, "v1", "text", TEST_AUTHOR)
        .await
        .unwrap();
    for n in 2..=versions {
        latest = config::append(db, &wl, key, ConfigUpdate::content(format!("v{}", n)), TEST_AUTHOR)
            .await
            .unwrap();
    }
    latest
}

async fn compact_all(test_db: &TestDatabase, keys: &[&ConfigKey]) -> u64 {
    if test_db.is_sqlite() {
        compact(test_db.conn()).await.unwrap().records_removed
    } else {
        let mut removed = 0;
        for key in keys {
            removed += compact_key(test_db.conn(), key).await.unwrap();
        }
        removed
    }
}

#[tokio::test]
async fn test_compaction_keeps_latest_and_floor() {
    let test_db = TestDatabase::new().await;
    let db = test_db.conn();
    let tenant = unique_name("t");
    let single = ConfigKey::new("single.txt", DEFAULT_GROUP, &tenant);
    let many = ConfigKey::new("many.txt", DEFAULT_GROUP, &tenant);

    let single_latest = publish(db, &single, 1).await;
    let many_latest = publish(db, &many, 4).await;

    let removed = compact_all(&test_db, &[&single, &many]).await;
    assert_eq!(removed, 3);

    // version-1 keys are untouched
    let versions = config::get_versions(db, &single).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].id, single_latest.id);

    // the latest record survives unchanged
    let versions = config::get_versions(db, &many).await.unwrap();
    assert_eq!(versions.len(), 1);
    let latest = config::get_latest(db, &many).await.unwrap();
    assert_eq!(latest.id, many_latest.id);
    assert_eq!(latest.version, 4);
    assert_eq!(latest.content, "v4");

    // a second pass has nothing left to do
    assert_eq!(compact_all(&test_db, &[&single, &many]).await, 0);

    // versioning continues after the surviving record
    let next = config::append(db, &whitelist(), &many, ConfigUpdate::content("v5"), TEST_AUTHOR)
        .await
        .unwrap();
    assert_eq!(next.version, 5);
}

#[tokio::test]
async fn test_compaction_report_counts_keys() {
    let test_db = TestDatabase::new().await;
    if !test_db.is_sqlite() {
        return;
    }
    let db = test_db.conn();
    let tenant = unique_name("t");

    publish(db, &ConfigKey::new("a", DEFAULT_GROUP, &tenant), 3).await;
    publish(db, &ConfigKey::new("b", DEFAULT_GROUP, &tenant), 2).await;
    publish(db, &ConfigKey::new("c", DEFAULT_GROUP, &tenant), 1).await;

    let report = compact(db).await.unwrap();
    assert_eq!(report.keys_compacted, 2);
    assert_eq!(report.records_removed, 3);
}

#[tokio::test]
async fn test_list_order_survives_compaction() {
    let test_db = TestDatabase::new().await;
    let db = test_db.conn();
    let tenant = unique_name("t");
    let first = ConfigKey::new("first", DEFAULT_GROUP, &tenant);
    let second = ConfigKey::new("second", DEFAULT_GROUP, &tenant);
    let third = ConfigKey::new("third", DEFAULT_GROUP, &tenant);

    publish(db, &first, 1).await;
    publish(db, &second, 1).await;
    publish(db, &third, 1).await;
    // the first key gets newer versions than everything else
    let wl = whitelist();
    for n in 2..=3 {
        config::append(db, &wl, &first, ConfigUpdate::content(format!("v{}", n)), TEST_AUTHOR)
            .await
            .unwrap();
    }

    let before: Vec<String> = config::list_keys(db, &tenant, &ListFilter::default(), 1, 10)
        .await
        .unwrap()
        .page_items
        .into_iter()
        .map(|r| r.data_id)
        .collect();
    assert_eq!(before, ["first", "second", "third"]);

    compact_all(&test_db, &[&first, &second, &third]).await;

    let page = config::list_keys(db, &tenant, &ListFilter::default(), 1, 10)
        .await
        .unwrap();
    assert_eq!(page.total_count, 3);
    let after: Vec<String> = page.page_items.iter().map(|r| r.data_id.clone()).collect();
    // the earliest survivor of "first" is now its latest record
    assert_eq!(after, ["second", "third", "first"]);
    assert_eq!(page.page_items[2].version, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_compaction_with_concurrent_appends() {
    const APPENDS: i32 = 8;

    let test_db = TestDatabase::concurrent().await;
    assert!(test_db.max_connections() > 1);
    let key = ConfigKey::new("busy", DEFAULT_GROUP, unique_name("t"));
    publish(test_db.conn(), &key, 3).await;

    let mut tasks = JoinSet::new();
    for i in 0..APPENDS {
        let db = test_db.conn().clone();
        let key = key.clone();
        tasks.spawn(async move {
            config::append(&db, &whitelist(), &key, ConfigUpdate::content(format!("w{}", i)), "worker")
                .await
                .map(|_| ())
        });
    }
    let compactor = {
        let db = test_db.conn().clone();
        let key = key.clone();
        tokio::spawn(async move {
            for _ in 0..3 {
                compact_key(&db, &key).await.unwrap();
            }
        })
    };
    compactor.await.unwrap();
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    // every append got a distinct version and the latest is never lost
    let latest = config::get_latest(test_db.conn(), &key).await.unwrap();
    assert_eq!(latest.version, 3 + APPENDS);

    compact_key(test_db.conn(), &key).await.unwrap();
    let versions = config::get_versions(test_db.conn(), &key).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].version, 3 + APPENDS);
}
