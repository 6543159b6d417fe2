//! ABOUTME: Integration tests for the MySQL gateway against a live server
//! ABOUTME: Ignored by default; point MYSQL_* at a scratch database and run with --ignored

use pm_config::Config;
use pm_db::{Db, RecordStore};

async fn connect_test_db() -> Db {
    let config = Config::load().expect("Config should load");
    let db = Db::connect(&config.database)
        .await
        .expect("MySQL should be reachable for integration tests");
    db.health_check().await.expect("Health check should pass");
    db
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn schema_then_truncate_leaves_empty_table() {
    let db = connect_test_db().await;

    db.ensure_schema().await.expect("Schema should be created");
    db.insert_row(41).await.expect("Insert should succeed");
    db.clear_table().await.expect("Truncate should succeed");

    assert_eq!(db.count_rows().await.unwrap(), 0);

    let id = db.insert_row(0).await.expect("Insert should succeed");
    assert_eq!(id, 1, "Truncate must reset the identifier sequence");
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn ensure_schema_is_idempotent() {
    let db = connect_test_db().await;

    db.ensure_schema().await.expect("First create should succeed");
    db.ensure_schema().await.expect("Second create should be a no-op");
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn inserted_row_keeps_value_and_timestamps() {
    let db = connect_test_db().await;
    db.ensure_schema().await.unwrap();
    db.clear_table().await.unwrap();

    let first = db.insert_row(7).await.unwrap();
    let second = db.insert_row(8).await.unwrap();
    assert_eq!(second, first + 1);

    let record = db
        .find_record(second)
        .await
        .unwrap()
        .expect("Inserted row should exist");

    assert_eq!(record.number, Some(8));
    assert!(record.created_at.is_some());
    assert!(record.updated_at.is_some());
    assert!(record.deleted_at.is_none());
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn active_connections_counts_our_pool() {
    let db = connect_test_db().await;

    let active = db
        .read_active_connections()
        .await
        .expect("Status query should succeed");

    assert!(active >= 1, "At least this pool's connection is open");
}
