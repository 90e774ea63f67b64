use log::{debug, warn};
use rusqlite::Connection;

use super::StoreError;

/// Journal mode reported by SQLite after initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    /// Write-ahead logging is active.
    Wal,
    /// SQLite kept another mode, for example `memory` for in-memory stores.
    Unchanged,
}

pub(super) fn enable_wal(connection: &Connection) -> JournalMode {
    let reported =
        connection.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        });
    match reported {
        Ok(mode) if mode.eq_ignore_ascii_case("wal") => {
            debug!("Write-ahead logging enabled");
            JournalMode::Wal
        }
        Ok(mode) => {
            warn!("SQLite kept journal mode '{mode}'; continuing without write-ahead logging");
            JournalMode::Unchanged
        }
        Err(err) => {
            warn!("Failed to enable write-ahead logging: {err}");
            JournalMode::Unchanged
        }
    }
}

pub(super) fn create_schema(connection: &Connection) -> Result<(), StoreError> {
    run_schema_step(
        connection,
        "create features table",
        "CREATE TABLE IF NOT EXISTS features (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            type TEXT,
            height REAL,
            levels INTEGER,
            address TEXT,
            latitude REAL,
            longitude REAL
        )",
    )?;
    run_schema_step(
        connection,
        "create coordinate index",
        "CREATE INDEX IF NOT EXISTS idx_features_lat_lon ON features(latitude, longitude)",
    )?;
    run_schema_step(
        connection,
        "create category index",
        "CREATE INDEX IF NOT EXISTS idx_features_type ON features(type)",
    )
}

fn run_schema_step(
    connection: &Connection,
    step: &'static str,
    sql: &str,
) -> Result<(), StoreError> {
    connection
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| StoreError::Schema { step, source })
}
