//! Schema creation and version-mismatch handling.
//!
//! # Responsibility
//! - Create the `items` table on a fresh store.
//! - Detect a stored version that differs from the expected one and apply
//!   the configured `MismatchPolicy`.
//!
//! # Invariants
//! - There is no migration path: a mismatch is either reset or rejected.
//! - Schema changes run inside one transaction together with the
//!   `PRAGMA user_version` stamp.

use crate::db::config::MismatchPolicy;
use crate::db::{DbError, DbResult};
use rusqlite::{Connection, Transaction};

/// Table holding one row per item.
pub const ITEMS_TABLE: &str = "items";

const ITEMS_SCHEMA_SQL: &str = include_str!("0001_items.sql");

/// What `apply_schema` had to do to reach the expected version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// Stored schema already matched.
    Current,
    /// Store was empty and the schema was created.
    Created,
    /// Stored version `from` mismatched; all tables were dropped and recreated.
    Reset { from: u32 },
}

impl SchemaOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Created => "created",
            Self::Reset { .. } => "reset",
        }
    }
}

/// Brings the connection's schema to `expected` according to `policy`.
pub fn apply_schema(
    conn: &mut Connection,
    expected: u32,
    policy: MismatchPolicy,
) -> DbResult<SchemaOutcome> {
    let stored = user_version(conn)?;
    let has_items = table_exists(conn, ITEMS_TABLE)?;

    if stored == expected {
        if has_items {
            return Ok(SchemaOutcome::Current);
        }
        create_schema(conn.transaction()?, expected)?;
        return Ok(SchemaOutcome::Created);
    }

    if stored == 0 && !has_items {
        create_schema(conn.transaction()?, expected)?;
        return Ok(SchemaOutcome::Created);
    }

    match policy {
        MismatchPolicy::Reject => Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            expected,
        }),
        MismatchPolicy::DestructiveReset => {
            let tx = conn.transaction()?;
            drop_user_objects(&tx)?;
            create_schema(tx, expected)?;
            Ok(SchemaOutcome::Reset { from: stored })
        }
    }
}

/// Reads the stored schema version.
pub fn user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn create_schema(tx: Transaction<'_>, version: u32) -> DbResult<()> {
    tx.execute_batch(ITEMS_SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {version};"))?;
    tx.commit()?;
    Ok(())
}

fn drop_user_objects(tx: &Transaction<'_>) -> DbResult<()> {
    let objects = {
        let mut stmt = tx.prepare(
            "SELECT type, name
             FROM sqlite_master
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%';",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    for (kind, name) in objects {
        let keyword = if kind == "view" { "VIEW" } else { "TABLE" };
        let quoted = name.replace('"', "\"\"");
        tx.execute_batch(&format!("DROP {keyword} IF EXISTS \"{quoted}\";"))?;
    }

    // Reset AUTOINCREMENT counters along with the rows.
    if table_exists(tx, "sqlite_sequence")? {
        tx.execute_batch("DELETE FROM sqlite_sequence;")?;
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
