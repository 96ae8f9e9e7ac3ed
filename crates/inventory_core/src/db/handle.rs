//! Storage engine handle.
//!
//! # Responsibility
//! - Own the single SQLite connection for one store.
//! - Run blocking SQLite work off the async executor.
//! - Offer an explicit handle (`open`) and a process-wide lazy one
//!   (`get_instance`).
//!
//! # Invariants
//! - `get_instance` constructs at most one handle per process.
//! - After `close`, every operation fails with `DbError::Closed`.

use super::config::DatabaseConfig;
use super::invalidation::{InvalidationTracker, Table};
use super::open::open_connection;
use super::{DbError, DbResult};
use crate::dao::item_dao::ItemDao;
use log::{info, warn};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static INSTANCE: OnceCell<Arc<InventoryDatabase>> = OnceCell::new();

/// Handle to an opened inventory store.
pub struct InventoryDatabase {
    config: DatabaseConfig,
    conn: Arc<Mutex<Option<Connection>>>,
    tracker: Arc<InvalidationTracker>,
}

impl InventoryDatabase {
    /// Opens a new handle for `config`.
    ///
    /// Prefer constructing one handle at startup and passing it down; use
    /// `get_instance` only where a shared lazy handle is required.
    ///
    /// # Errors
    /// - `DbError::Io`/`DbError::Sqlite` when the store cannot be opened.
    /// - `DbError::UnsupportedSchemaVersion` under `MismatchPolicy::Reject`.
    pub fn open(config: DatabaseConfig) -> DbResult<Arc<Self>> {
        let conn = open_connection(&config)?;
        Ok(Arc::new(Self {
            config,
            conn: Arc::new(Mutex::new(Some(conn))),
            tracker: Arc::new(InvalidationTracker::new()),
        }))
    }

    /// Returns the process-wide handle, opening it on first call.
    ///
    /// Concurrent first callers race on an init-once guard: exactly one of
    /// them opens the store and all of them receive that same handle. A
    /// failed open leaves the slot empty so a later call may retry.
    ///
    /// # Errors
    /// - Any `open` error from the constructing call.
    /// - `DbError::AlreadyInitialized` when the live handle was built from a
    ///   different config (location, version or mismatch policy).
    /// - `DbError::Closed` once the shared handle has been closed; it is
    ///   never reopened.
    pub fn get_instance(config: &DatabaseConfig) -> DbResult<Arc<Self>> {
        let db = match INSTANCE.get() {
            Some(db) => db,
            None => INSTANCE.get_or_try_init(|| Self::open(config.clone()))?,
        };

        if db.config != *config {
            warn!(
                "event=db_instance module=db status=rejected active_mode={} requested_mode={}",
                db.config.location.mode(),
                config.location.mode()
            );
            return Err(DbError::AlreadyInitialized {
                active: Box::new(db.config.clone()),
                requested: Box::new(config.clone()),
            });
        }

        if db.is_closed() {
            warn!("event=db_instance module=db status=error error_code=closed");
            return Err(DbError::Closed);
        }

        Ok(Arc::clone(db))
    }

    /// Returns the data access object bound to this handle.
    pub fn item_dao(self: &Arc<Self>) -> ItemDao {
        ItemDao::new(Arc::clone(self))
    }

    pub(crate) fn tracker(&self) -> &InvalidationTracker {
        &self.tracker
    }

    pub fn is_closed(&self) -> bool {
        self.lock_connection().is_none()
    }

    /// Releases the connection.
    ///
    /// Live queries on this handle wake up, report `DbError::Closed` and end.
    ///
    /// # Errors
    /// - `DbError::Closed` when the handle was already closed.
    /// - `DbError::Sqlite` when SQLite fails to finalize the connection.
    pub fn close(&self) -> DbResult<()> {
        let conn = self.lock_connection().take();
        let Some(conn) = conn else {
            warn!("event=db_close module=db status=error error_code=already_closed");
            return Err(DbError::Closed);
        };

        let result = conn.close().map_err(|(_, err)| DbError::Sqlite(err));
        self.tracker.invalidate_all();
        match &result {
            Ok(()) => info!(
                "event=db_close module=db status=ok mode={}",
                self.config.location.mode()
            ),
            Err(err) => warn!(
                "event=db_close module=db status=error mode={} error={}",
                self.config.location.mode(),
                err
            ),
        }
        result
    }

    /// Runs `work` against the connection on the blocking thread pool.
    ///
    /// Calls are serialized by the connection mutex; each one completes
    /// before the returned future resolves.
    pub(crate) async fn with_connection<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || run_locked(&conn, work))
            .await
            .map_err(|err| E::from(DbError::Task(err.to_string())))?
    }

    /// Runs a mutation of `table` on the blocking thread pool.
    ///
    /// `work` returns its value together with the number of changed rows.
    /// Observers of `table` are notified from the blocking task itself as
    /// soon as a change committed, so the notification still happens when
    /// the caller drops the returned future mid-flight.
    pub(crate) async fn write<T, E, F>(&self, table: Table, work: F) -> Result<(T, usize), E>
    where
        F: FnOnce(&Connection) -> Result<(T, usize), E> + Send + 'static,
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let tracker = Arc::clone(&self.tracker);
        tokio::task::spawn_blocking(move || {
            let outcome = run_locked(&conn, work)?;
            if outcome.1 > 0 {
                tracker.invalidate(table);
            }
            Ok(outcome)
        })
        .await
        .map_err(|err| E::from(DbError::Task(err.to_string())))?
    }

    fn lock_connection(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn run_locked<T, E, F>(conn: &Mutex<Option<Connection>>, work: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<DbError>,
{
    let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
    match guard.as_ref() {
        Some(conn) => work(conn),
        None => Err(E::from(DbError::Closed)),
    }
}
