//! Reactive persistence layer for a small inventory of items.
//!
//! Consumers depend on `ItemsRepository`; everything below it (SQLite,
//! change notification, schema policy) stays behind that boundary.

pub mod dao;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use dao::item_dao::ItemDao;
pub use db::{
    DatabaseConfig, DbError, DbResult, InventoryDatabase, MismatchPolicy, StorageLocation,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{Item, ItemId, NEW_ITEM_ID};
pub use repo::items_repo::{ItemsRepository, OfflineItemsRepository};
pub use repo::{RepoError, RepoResult};

/// Current schema version of the `items` layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
