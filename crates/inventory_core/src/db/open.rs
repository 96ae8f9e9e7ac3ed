//! Connection bootstrap for the inventory store.
//!
//! # Responsibility
//! - Open the file or in-memory SQLite connection named by the config.
//! - Configure connection pragmas.
//! - Apply the schema version policy before returning the connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections carry the configured schema version.

use super::config::{DatabaseConfig, StorageLocation};
use super::schema::{apply_schema, SchemaOutcome};
use super::DbResult;
use log::{error, info, warn};
use rusqlite::Connection;
use std::time::{Duration, Instant};

/// Opens the configured store and brings its schema to `config.version`.
///
/// # Side effects
/// - Creates the parent directory of a file location.
/// - May wipe all stored rows under `MismatchPolicy::DestructiveReset`.
/// - Emits `db_open` logging events with duration and status.
pub(crate) fn open_connection(config: &DatabaseConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = config.location.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect(&config.location) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    match bootstrap_connection(&mut conn, config) {
        Ok(outcome) => {
            if let SchemaOutcome::Reset { from } = outcome {
                warn!(
                    "event=schema_reset module=db status=ok mode={mode} from_version={from} to_version={}",
                    config.version
                );
            }
            info!(
                "event=db_open module=db status=ok mode={mode} schema={} duration_ms={}",
                outcome.as_str(),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn connect(location: &StorageLocation) -> DbResult<Connection> {
    match location {
        StorageLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Connection::open(path)?)
        }
        StorageLocation::InMemory => Ok(Connection::open_in_memory()?),
    }
}

fn bootstrap_connection(conn: &mut Connection, config: &DatabaseConfig) -> DbResult<SchemaOutcome> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_schema(conn, config.version, config.on_mismatch)
}
