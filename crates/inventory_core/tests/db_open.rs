use futures::StreamExt;
use inventory_core::db::schema::user_version;
use inventory_core::{
    DatabaseConfig, DbError, InventoryDatabase, Item, MismatchPolicy, SCHEMA_VERSION,
};
use rusqlite::Connection;
use std::path::Path;

async fn stored_items(db: &std::sync::Arc<InventoryDatabase>) -> Vec<Item> {
    db.item_dao()
        .get_all_items()
        .next()
        .await
        .expect("live query should emit")
        .unwrap()
}

fn stored_version(path: &Path) -> u32 {
    let conn = Connection::open(path).unwrap();
    user_version(&conn).unwrap()
}

#[tokio::test]
async fn reopening_same_version_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("item_database");

    let db = InventoryDatabase::open(DatabaseConfig::file(&path, SCHEMA_VERSION)).unwrap();
    db.item_dao()
        .insert(&Item::with_id(1, "Apples", 10.0, 20))
        .await
        .unwrap();
    db.close().unwrap();

    let reopened = InventoryDatabase::open(DatabaseConfig::file(&path, SCHEMA_VERSION)).unwrap();
    assert_eq!(
        stored_items(&reopened).await,
        vec![Item::with_id(1, "Apples", 10.0, 20)]
    );
    reopened.close().unwrap();
    assert_eq!(stored_version(&path), SCHEMA_VERSION);
}

#[tokio::test]
async fn version_mismatch_resets_store_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("item_database");

    let db = InventoryDatabase::open(DatabaseConfig::file(&path, 1)).unwrap();
    db.item_dao()
        .insert(&Item::new("Apples", 10.0, 20))
        .await
        .unwrap();
    db.close().unwrap();

    let upgraded = InventoryDatabase::open(DatabaseConfig::file(&path, 2)).unwrap();
    assert!(stored_items(&upgraded).await.is_empty());

    let id = upgraded
        .item_dao()
        .insert(&Item::new("Bananas", 15.0, 97))
        .await
        .unwrap();
    assert_eq!(id, Some(1));
    upgraded.close().unwrap();
    assert_eq!(stored_version(&path), 2);
}

#[tokio::test]
async fn version_mismatch_with_reject_policy_preserves_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("item_database");

    let db = InventoryDatabase::open(DatabaseConfig::file(&path, 1)).unwrap();
    db.item_dao()
        .insert(&Item::with_id(1, "Apples", 10.0, 20))
        .await
        .unwrap();
    db.close().unwrap();

    let strict = DatabaseConfig::file(&path, 2).with_mismatch_policy(MismatchPolicy::Reject);
    match InventoryDatabase::open(strict) {
        Err(DbError::UnsupportedSchemaVersion {
            db_version,
            expected,
        }) => {
            assert_eq!(db_version, 1);
            assert_eq!(expected, 2);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected schema version rejection"),
    }

    let original = InventoryDatabase::open(DatabaseConfig::file(&path, 1)).unwrap();
    assert_eq!(
        stored_items(&original).await,
        vec![Item::with_id(1, "Apples", 10.0, 20)]
    );
}

#[test]
fn open_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("item_database");

    let db = InventoryDatabase::open(DatabaseConfig::file(&path, SCHEMA_VERSION)).unwrap();
    assert!(path.exists());
    db.close().unwrap();
}

#[test]
fn unusable_location_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let result = InventoryDatabase::open(DatabaseConfig::file(
        blocker.join("item_database"),
        SCHEMA_VERSION,
    ));
    assert!(matches!(result, Err(DbError::Io(_))));
}

#[test]
fn fresh_store_has_items_table_at_configured_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("item_database");

    let db = InventoryDatabase::open(DatabaseConfig::file(&path, 5)).unwrap();
    db.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    assert_eq!(user_version(&conn).unwrap(), 5);
    let columns: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info('items') ORDER BY cid;")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(columns, ["id", "name", "price", "quantity"]);
}
