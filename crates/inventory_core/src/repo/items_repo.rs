//! Items repository contract and local-storage implementation.
//!
//! # Responsibility
//! - Decouple consumers from the storage technology behind items.
//! - Widen single-item absence into an explicit `None`.
//!
//! # Invariants
//! - `get_item_stream` never ends because a row is missing; it yields
//!   `None` and keeps waiting for a matching row.
//! - Writes resolve only after the change committed and observers were
//!   notified.

use crate::dao::item_dao::ItemDao;
use crate::model::item::{Item, ItemId};
use crate::repo::RepoResult;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Repository that provides insert, update, delete and observation of items.
#[async_trait]
pub trait ItemsRepository: Send + Sync {
    /// Live, name-ordered list of all items.
    fn get_all_items_stream(&self) -> BoxStream<'static, RepoResult<Vec<Item>>>;

    /// Live view of the item with `id`; `None` while no such row exists.
    fn get_item_stream(&self, id: ItemId) -> BoxStream<'static, RepoResult<Option<Item>>>;

    async fn insert_item(&self, item: &Item) -> RepoResult<()>;

    async fn delete_item(&self, item: &Item) -> RepoResult<()>;

    async fn update_item(&self, item: &Item) -> RepoResult<()>;
}

/// Repository backed by the local SQLite store.
#[derive(Clone)]
pub struct OfflineItemsRepository {
    dao: ItemDao,
}

impl OfflineItemsRepository {
    pub fn new(dao: ItemDao) -> Self {
        Self { dao }
    }
}

#[async_trait]
impl ItemsRepository for OfflineItemsRepository {
    fn get_all_items_stream(&self) -> BoxStream<'static, RepoResult<Vec<Item>>> {
        self.dao.get_all_items()
    }

    fn get_item_stream(&self, id: ItemId) -> BoxStream<'static, RepoResult<Option<Item>>> {
        self.dao.observe_item(id)
    }

    async fn insert_item(&self, item: &Item) -> RepoResult<()> {
        self.dao.insert(item).await.map(|_| ())
    }

    async fn delete_item(&self, item: &Item) -> RepoResult<()> {
        self.dao.delete(item).await
    }

    async fn update_item(&self, item: &Item) -> RepoResult<()> {
        self.dao.update(item).await
    }
}
