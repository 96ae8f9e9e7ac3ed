//! SQLite storage engine handle and schema bootstrap.
//!
//! # Responsibility
//! - Open and configure the SQLite connection backing the inventory.
//! - Enforce the schema version policy before any data access.
//! - Publish table-change notifications for live queries.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A closed handle never silently accepts work; it fails with `Closed`.
//! - Change notifications are published only after the write committed.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod config;
mod handle;
mod invalidation;
mod open;
pub mod schema;

pub use config::{DatabaseConfig, MismatchPolicy, StorageLocation};
pub use handle::InventoryDatabase;
pub(crate) use invalidation::Table;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        expected: u32,
    },
    AlreadyInitialized {
        active: Box<DatabaseConfig>,
        requested: Box<DatabaseConfig>,
    },
    Closed,
    Task(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "storage location is not usable: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                expected,
            } => write!(
                f,
                "database schema version {db_version} does not match expected {expected}"
            ),
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "database already initialized at {active}; refusing to switch to {requested}"
            ),
            Self::Closed => write!(f, "database handle is closed"),
            Self::Task(message) => write!(f, "storage task failed: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::AlreadyInitialized { .. }
            | Self::Closed
            | Self::Task(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
