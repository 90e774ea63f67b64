use log::{info, warn};
use rusqlite::Connection;

/// Outcome of post-run store maintenance.
///
/// Maintenance never fails the run; each step records whether it succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsolidationReport {
    /// Whether the write-ahead log checkpoint completed without reporting a
    /// busy database.
    pub checkpointed: bool,
    /// Whether `VACUUM` completed.
    pub vacuumed: bool,
}

/// Checkpoint and truncate the write-ahead log, then rebuild the file.
///
/// Failures are logged at `warn` and leave committed rows untouched.
pub fn consolidate(connection: &Connection) -> ConsolidationReport {
    info!("Consolidating database");
    let checkpointed = match connection.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |row| {
        row.get::<_, i64>(0)
    }) {
        Ok(0) => true,
        Ok(_) => {
            warn!("Write-ahead log checkpoint could not complete because the store is busy");
            false
        }
        Err(err) => {
            warn!("Failed to checkpoint write-ahead log: {err}");
            false
        }
    };
    let vacuumed = match connection.execute_batch("VACUUM") {
        Ok(()) => true,
        Err(err) => {
            warn!("Failed to vacuum store: {err}");
            false
        }
    };
    ConsolidationReport {
        checkpointed,
        vacuumed,
    }
}
