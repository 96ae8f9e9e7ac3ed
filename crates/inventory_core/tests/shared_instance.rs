use inventory_core::{DatabaseConfig, DbError, InventoryDatabase, MismatchPolicy, SCHEMA_VERSION};
use std::sync::{Arc, Barrier};
use std::thread;

// Single test: the shared handle is process-wide state.
#[test]
fn racing_first_access_observes_one_handle() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig::file(dir.path().join("item_database"), SCHEMA_VERSION);
    let barrier = Arc::new(Barrier::new(8));

    let racers: Vec<_> = (0..8)
        .map(|_| {
            let config = config.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                InventoryDatabase::get_instance(&config).unwrap()
            })
        })
        .collect();
    let handles: Vec<Arc<InventoryDatabase>> = racers
        .into_iter()
        .map(|racer| racer.join().unwrap())
        .collect();

    assert!(handles
        .windows(2)
        .all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));

    let again = InventoryDatabase::get_instance(&config).unwrap();
    assert!(Arc::ptr_eq(&again, &handles[0]));

    let other_version = DatabaseConfig::file(dir.path().join("item_database"), SCHEMA_VERSION + 1);
    assert!(matches!(
        InventoryDatabase::get_instance(&other_version),
        Err(DbError::AlreadyInitialized { .. })
    ));

    let strict = config.clone().with_mismatch_policy(MismatchPolicy::Reject);
    assert!(matches!(
        InventoryDatabase::get_instance(&strict),
        Err(DbError::AlreadyInitialized { .. })
    ));

    let elsewhere = DatabaseConfig::in_memory(SCHEMA_VERSION);
    assert!(matches!(
        InventoryDatabase::get_instance(&elsewhere),
        Err(DbError::AlreadyInitialized { .. })
    ));
}
