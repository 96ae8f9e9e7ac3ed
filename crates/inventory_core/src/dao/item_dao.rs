//! Item data access object.
//!
//! # Responsibility
//! - Provide live queries and point writes over the `items` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `get_all_items` always emits rows ordered by `name` ascending.
//! - Inserts with an existing primary key are ignored, never overwrite.
//! - Updates and deletes of missing rows are silent no-ops.
//! - A live sequence ends right after it yields an error.

use crate::db::{InventoryDatabase, Table};
use crate::model::item::{Item, ItemId};
use crate::repo::{RepoError, RepoResult};
use futures::stream::{BoxStream, StreamExt};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;

const ITEM_SELECT_SQL: &str = "SELECT id, name, price, quantity FROM items";

/// Data access object for `Item` rows.
#[derive(Clone)]
pub struct ItemDao {
    db: Arc<InventoryDatabase>,
}

impl ItemDao {
    pub fn new(db: Arc<InventoryDatabase>) -> Self {
        Self { db }
    }

    /// Live sequence of every item, ordered by name.
    ///
    /// Emits the current list on first poll, then a fresh list after each
    /// committed change to `items`. Never completes on its own.
    pub fn get_all_items(&self) -> BoxStream<'static, RepoResult<Vec<Item>>> {
        self.observe(Table::Items, query_all_items)
    }

    /// Live sequence of the row with `id`.
    ///
    /// Stays silent while no row matches; emits again only when the row's
    /// content changes.
    pub fn get_item(&self, id: ItemId) -> BoxStream<'static, RepoResult<Item>> {
        self.observe_item(id)
            .filter_map(|next| async move { next.transpose() })
            .boxed()
    }

    /// Like `get_item`, but yields `None` while no row matches.
    pub fn observe_item(&self, id: ItemId) -> BoxStream<'static, RepoResult<Option<Item>>> {
        distinct_until_changed(self.observe(Table::Items, move |conn| query_item(conn, id)))
    }

    /// Inserts `item`, letting SQLite assign the id when it is unsaved.
    ///
    /// Returns the id of the new row, or `None` when SQLite ignored the row:
    /// a row with the same id already exists, or a column constraint failed
    /// (a NaN `price` binds as NULL and trips `NOT NULL`).
    pub async fn insert(&self, item: &Item) -> RepoResult<Option<ItemId>> {
        let item = item.clone();
        let (inserted, _) = self
            .db
            .write(Table::Items, move |conn| -> RepoResult<(Option<ItemId>, usize)> {
                let explicit_id = (!item.is_unsaved()).then_some(item.id);
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO items (id, name, price, quantity)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![explicit_id, item.name.as_str(), item.price, item.quantity],
                )?;
                Ok(((changed > 0).then(|| conn.last_insert_rowid()), changed))
            })
            .await
            .inspect_err(|err| log_write_error("item_insert", err))?;

        match inserted {
            Some(id) => debug!("event=item_insert module=dao status=ok id={id}"),
            None => debug!(
                "event=item_insert module=dao status=ignored reason=conflict_or_constraint"
            ),
        }
        Ok(inserted)
    }

    /// Replaces name, price and quantity of the row whose id matches.
    pub async fn update(&self, item: &Item) -> RepoResult<()> {
        let item = item.clone();
        let id = item.id;
        let ((), changed) = self
            .db
            .write(Table::Items, move |conn| -> RepoResult<((), usize)> {
                let changed = conn.execute(
                    "UPDATE items SET name = ?1, price = ?2, quantity = ?3 WHERE id = ?4;",
                    params![item.name.as_str(), item.price, item.quantity, item.id],
                )?;
                Ok(((), changed))
            })
            .await
            .inspect_err(|err| log_write_error("item_update", err))?;

        log_write("item_update", id, changed);
        Ok(())
    }

    /// Removes the row whose id matches.
    pub async fn delete(&self, item: &Item) -> RepoResult<()> {
        let id = item.id;
        let ((), changed) = self
            .db
            .write(Table::Items, move |conn| -> RepoResult<((), usize)> {
                let changed = conn.execute("DELETE FROM items WHERE id = ?1;", [id])?;
                Ok(((), changed))
            })
            .await
            .inspect_err(|err| log_write_error("item_delete", err))?;

        log_write("item_delete", id, changed);
        Ok(())
    }

    fn observe<T, F>(&self, table: Table, query: F) -> BoxStream<'static, RepoResult<T>>
    where
        T: Send + 'static,
        F: Fn(&Connection) -> RepoResult<T> + Clone + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let mut changes = db.tracker().subscribe(table);

        Box::pin(async_stream::stream! {
            loop {
                // Mark before reading so a commit racing the query wakes us again.
                changes.borrow_and_update();
                match db.with_connection(query.clone()).await {
                    Ok(value) => yield Ok(value),
                    Err(err) => {
                        warn!(
                            "event=live_query module=dao status=error table={} error={}",
                            table.name(),
                            err
                        );
                        yield Err(err);
                        break;
                    }
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

fn distinct_until_changed<T>(
    mut inner: BoxStream<'static, RepoResult<T>>,
) -> BoxStream<'static, RepoResult<T>>
where
    T: PartialEq + Clone + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut last: Option<T> = None;
        while let Some(next) = inner.next().await {
            match next {
                Ok(value) => {
                    if last.as_ref() == Some(&value) {
                        continue;
                    }
                    last = Some(value.clone());
                    yield Ok(value);
                }
                Err(err) => {
                    yield Err(err);
                    break;
                }
            }
        }
    })
}

fn query_all_items(conn: &Connection) -> RepoResult<Vec<Item>> {
    let mut stmt = conn.prepare_cached(&format!("{ITEM_SELECT_SQL} ORDER BY name ASC;"))?;
    let items = stmt
        .query_map([], parse_item_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

fn query_item(conn: &Connection, id: ItemId) -> RepoResult<Option<Item>> {
    let mut stmt = conn.prepare_cached(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
    Ok(stmt.query_row([id], parse_item_row).optional()?)
}

fn parse_item_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get("id")?,
        name: row.get("name")?,
        price: row.get("price")?,
        quantity: row.get("quantity")?,
    })
}

fn log_write(event: &str, id: ItemId, changed: usize) {
    if changed == 0 {
        debug!("event={event} module=dao status=noop id={id} reason=missing_row");
    } else {
        debug!("event={event} module=dao status=ok id={id}");
    }
}

fn log_write_error(event: &str, err: &RepoError) {
    warn!("event={event} module=dao status=error error={err}");
}
