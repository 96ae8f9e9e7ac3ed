//! Storage handle configuration.

use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Where the backing SQLite data lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    /// Database file; its parent directory is created on open.
    File(PathBuf),
    /// Private in-memory database, discarded on close.
    InMemory,
}

impl Display for StorageLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "`{}`", path.display()),
            Self::InMemory => write!(f, "`:memory:`"),
        }
    }
}

impl StorageLocation {
    pub(crate) fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::InMemory => "memory",
        }
    }
}

/// What to do when the stored schema version differs from the expected one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Drop every stored table and recreate the schema. All rows are lost.
    #[default]
    DestructiveReset,
    /// Refuse to open and return `DbError::UnsupportedSchemaVersion`.
    Reject,
}

/// Configuration consumed by `InventoryDatabase::open`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub location: StorageLocation,
    /// Expected schema version, compared against `PRAGMA user_version`.
    pub version: u32,
    #[serde(default)]
    pub on_mismatch: MismatchPolicy,
}

impl Display for DatabaseConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let policy = match self.on_mismatch {
            MismatchPolicy::DestructiveReset => "destructive_reset",
            MismatchPolicy::Reject => "reject",
        };
        write!(
            f,
            "{} (version {}, on_mismatch {policy})",
            self.location, self.version
        )
    }
}

impl DatabaseConfig {
    pub fn file(path: impl Into<PathBuf>, version: u32) -> Self {
        Self {
            location: StorageLocation::File(path.into()),
            version,
            on_mismatch: MismatchPolicy::default(),
        }
    }

    pub fn in_memory(version: u32) -> Self {
        Self {
            location: StorageLocation::InMemory,
            version,
            on_mismatch: MismatchPolicy::default(),
        }
    }

    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.on_mismatch = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{DatabaseConfig, MismatchPolicy, StorageLocation};
    use std::path::PathBuf;

    #[test]
    fn constructors_default_to_destructive_reset() {
        let config = DatabaseConfig::file("/tmp/items.db", 3);
        assert_eq!(
            config.location,
            StorageLocation::File(PathBuf::from("/tmp/items.db"))
        );
        assert_eq!(config.version, 3);
        assert_eq!(config.on_mismatch, MismatchPolicy::DestructiveReset);

        let strict = DatabaseConfig::in_memory(1).with_mismatch_policy(MismatchPolicy::Reject);
        assert_eq!(strict.on_mismatch, MismatchPolicy::Reject);
    }

    #[test]
    fn config_deserializes_with_default_policy() {
        let config: DatabaseConfig = serde_json::from_str(
            r#"{ "location": { "file": "/var/lib/inventory/item_database" }, "version": 1 }"#,
        )
        .expect("config json should parse");
        assert_eq!(config.version, 1);
        assert_eq!(config.on_mismatch, MismatchPolicy::DestructiveReset);

        let memory: DatabaseConfig = serde_json::from_str(
            r#"{ "location": "in_memory", "version": 2, "on_mismatch": "reject" }"#,
        )
        .expect("config json should parse");
        assert_eq!(memory.location, StorageLocation::InMemory);
        assert_eq!(memory.on_mismatch, MismatchPolicy::Reject);
    }
}
