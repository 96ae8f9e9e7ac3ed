use inventory_core::{DatabaseConfig, DbError, InventoryDatabase, Item, SCHEMA_VERSION};

// Own test binary: closing the shared handle is irreversible for the process.
#[tokio::test]
async fn closed_shared_handle_is_never_handed_out_again() {
    let config = DatabaseConfig::in_memory(SCHEMA_VERSION);
    let db = InventoryDatabase::get_instance(&config).unwrap();
    let dao = db.item_dao();

    db.close().unwrap();

    assert!(matches!(
        InventoryDatabase::get_instance(&config),
        Err(DbError::Closed)
    ));
    assert!(dao
        .insert(&Item::new("Apples", 10.0, 20))
        .await
        .unwrap_err()
        .is_closed());
    assert!(matches!(db.close(), Err(DbError::Closed)));
}
