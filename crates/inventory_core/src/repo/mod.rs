//! Repository layer: storage-agnostic item access for consumers.
//!
//! # Responsibility
//! - Define the only interface presentation code may depend on.
//! - Provide the local-storage implementation delegating to `ItemDao`.
//!
//! # Invariants
//! - Repository methods keep the emission and ordering semantics of the
//!   underlying live queries.
//! - Errors are surfaced unchanged; nothing here retries.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod items_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by item data access and repository operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
}

impl RepoError {
    /// Returns whether the failure came from using a closed handle.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Db(DbError::Closed))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
