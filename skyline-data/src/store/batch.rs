//! Batched transaction management for feature inserts.
//!
//! Rows are written inside an explicit transaction that is committed and
//! reopened every `batch_size` submissions. Individual insert and
//! commit failures are counted and logged; only failing to open the very
//! first transaction is fatal.

use std::num::NonZeroUsize;

use log::{debug, warn};
use rusqlite::{Connection, params};
use skyline_core::{CategoryCounts, FeatureRow, FeatureSink};

use super::StoreError;

const INSERT_FEATURE: &str = "INSERT INTO features \
    (name, type, height, levels, address, latitude, longitude) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

/// Outcome counters for one [`BatchWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    /// Rows submitted, per category.
    pub attempted: CategoryCounts,
    /// Rows known to be durably committed, per category.
    pub committed: CategoryCounts,
    /// Rows whose insert statement failed.
    pub failed_rows: u64,
    /// Inserted rows discarded because their batch failed to commit.
    pub rolled_back_rows: u64,
    /// Transactions committed successfully.
    pub batches_committed: u64,
    /// Transactions whose commit failed.
    pub failed_commits: u64,
}

/// Scoped writer that persists [`FeatureRow`]s in fixed-size transactions.
///
/// Any open batch is committed when the writer is finished or dropped, so an
/// early return never strands inserted rows in an open transaction.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use skyline_core::FeatureSink;
/// use skyline_data::store::{DEFAULT_BATCH_SIZE, open_store};
///
/// # fn main() -> Result<(), skyline_data::store::StoreError> {
/// let store = open_store(Utf8Path::new("skyline.db"))?;
/// let mut writer = store.batch_writer(DEFAULT_BATCH_SIZE)?;
/// // writer.submit(row) for every extracted feature...
/// let stats = writer.finish();
/// println!("{} rows committed", stats.committed.total());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BatchWriter<'conn> {
    connection: &'conn Connection,
    batch_size: NonZeroUsize,
    rows_in_batch: usize,
    pending: CategoryCounts,
    in_transaction: bool,
    finished: bool,
    stats: BatchStats,
}

impl<'conn> BatchWriter<'conn> {
    /// Open the first transaction on `connection`.
    ///
    /// # Errors
    /// Returns [`StoreError::BeginTransaction`] when SQLite refuses to start
    /// the transaction.
    pub fn begin(
        connection: &'conn Connection,
        batch_size: NonZeroUsize,
    ) -> Result<Self, StoreError> {
        connection
            .execute_batch("BEGIN")
            .map_err(|source| StoreError::BeginTransaction { source })?;
        Ok(Self {
            connection,
            batch_size,
            rows_in_batch: 0,
            pending: CategoryCounts::default(),
            in_transaction: true,
            finished: false,
            stats: BatchStats::default(),
        })
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Commit the open batch and return the final counters.
    pub fn finish(mut self) -> BatchStats {
        self.commit();
        self.finished = true;
        std::mem::take(&mut self.stats)
    }

    fn insert(&self, row: &FeatureRow) -> rusqlite::Result<()> {
        let mut statement = self.connection.prepare_cached(INSERT_FEATURE)?;
        statement.execute(params![
            row.name,
            row.category.as_str(),
            row.height,
            row.levels,
            row.address,
            row.latitude(),
            row.longitude(),
        ])?;
        Ok(())
    }

    fn rotate(&mut self) {
        self.commit();
        match self.connection.execute_batch("BEGIN") {
            Ok(()) => self.in_transaction = true,
            Err(err) => {
                warn!("Failed to open a new feature batch, continuing in autocommit mode: {err}");
            }
        }
    }

    fn commit(&mut self) {
        if !self.in_transaction {
            self.rows_in_batch = 0;
            return;
        }
        self.in_transaction = false;
        let rows = std::mem::take(&mut self.pending);
        self.rows_in_batch = 0;

        match self.connection.execute_batch("COMMIT") {
            Ok(()) => {
                self.stats.committed.absorb(rows);
                self.stats.batches_committed += 1;
                debug!(
                    "Committed feature batch {} ({} rows)",
                    self.stats.batches_committed,
                    rows.total()
                );
            }
            Err(err) => {
                self.stats.failed_commits += 1;
                self.stats.rolled_back_rows += rows.total();
                warn!("Failed to commit batch of {} feature rows: {err}", rows.total());
                if !self.connection.is_autocommit()
                    && let Err(rollback) = self.connection.execute_batch("ROLLBACK")
                {
                    warn!("Failed to roll back feature batch: {rollback}");
                }
            }
        }
    }
}

impl FeatureSink for BatchWriter<'_> {
    fn submit(&mut self, row: FeatureRow) {
        self.stats.attempted.record(row.category);
        match self.insert(&row) {
            Ok(()) if self.in_transaction => self.pending.record(row.category),
            Ok(()) => self.stats.committed.record(row.category),
            Err(err) => {
                self.stats.failed_rows += 1;
                warn!(
                    "Failed to insert {} feature '{}' at ({}, {}): {err}",
                    row.category,
                    row.name,
                    row.latitude(),
                    row.longitude()
                );
            }
        }

        // Failed inserts still count towards the boundary.
        self.rows_in_batch += 1;
        if self.rows_in_batch >= self.batch_size.get() {
            self.rotate();
        }
    }
}

impl Drop for BatchWriter<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.commit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::create_schema;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use skyline_core::{Category, WatchlistEntry};

    #[fixture]
    fn connection() -> Connection {
        let connection = Connection::open_in_memory().expect("open in-memory store");
        create_schema(&connection).expect("create schema");
        connection
    }

    fn row(name: &str) -> FeatureRow {
        let entry = WatchlistEntry {
            name: name.to_owned(),
            height: 42.0,
            levels: 12,
            address: "1 Main Street".to_owned(),
        };
        FeatureRow::building(&entry, Coord { x: -1.5, y: 53.8 })
    }

    fn count_rows(connection: &Connection) -> i64 {
        connection
            .query_row("SELECT COUNT(*) FROM features", [], |r| r.get(0))
            .expect("count rows")
    }

    fn batch_size(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).expect("non-zero batch size")
    }

    #[rstest]
    fn persists_every_column(connection: Connection) {
        let mut writer = BatchWriter::begin(&connection, batch_size(10)).expect("begin");
        writer.submit(row("Civic Centre"));
        let stats = writer.finish();

        assert_eq!(stats.committed.get(Category::Building), 1);
        let persisted: (String, String, f64, u32, String, f64, f64) = connection
            .query_row(
                "SELECT name, type, height, levels, address, latitude, longitude FROM features",
                [],
                |r| {
                    Ok((
                        r.get(0)?,
                        r.get(1)?,
                        r.get(2)?,
                        r.get(3)?,
                        r.get(4)?,
                        r.get(5)?,
                        r.get(6)?,
                    ))
                },
            )
            .expect("read row");
        assert_eq!(
            persisted,
            (
                "Civic Centre".to_owned(),
                "building".to_owned(),
                42.0,
                12,
                "1 Main Street".to_owned(),
                53.8,
                -1.5,
            )
        );
    }

    #[rstest]
    fn commits_at_each_boundary_and_flushes_remainder(connection: Connection) {
        let mut writer = BatchWriter::begin(&connection, batch_size(3)).expect("begin");
        for index in 0..7 {
            writer.submit(row(&format!("b{index}")));
        }
        assert_eq!(writer.stats().batches_committed, 2);
        assert_eq!(writer.stats().committed.total(), 6);

        let stats = writer.finish();
        assert_eq!(stats.batches_committed, 3);
        assert_eq!(stats.committed.total(), 7);
        assert_eq!(stats.attempted.total(), 7);
        assert_eq!(count_rows(&connection), 7);
        assert!(connection.is_autocommit(), "no transaction left open");
    }

    #[rstest]
    fn insert_failures_are_counted_and_skipped(connection: Connection) {
        connection
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON features
                 WHEN NEW.name = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .expect("create trigger");

        let mut writer = BatchWriter::begin(&connection, batch_size(2)).expect("begin");
        writer.submit(row("good"));
        writer.submit(row("bad"));
        writer.submit(row("also good"));
        let stats = writer.finish();

        assert_eq!(stats.attempted.total(), 3);
        assert_eq!(stats.failed_rows, 1);
        assert_eq!(stats.committed.total(), 2);
        assert_eq!(count_rows(&connection), 2);
    }

    #[rstest]
    fn failed_inserts_still_reach_the_batch_boundary(connection: Connection) {
        connection
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON features
                 WHEN NEW.name = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .expect("create trigger");

        let mut writer = BatchWriter::begin(&connection, batch_size(3)).expect("begin");
        writer.submit(row("good"));
        writer.submit(row("bad"));
        writer.submit(row("also good"));

        assert_eq!(writer.stats().batches_committed, 1);
        assert_eq!(writer.stats().committed.total(), 2);
        assert_eq!(count_rows(&connection), 2);

        writer.submit(row("next batch"));
        let stats = writer.finish();
        assert_eq!(stats.batches_committed, 2);
        assert_eq!(stats.failed_rows, 1);
        assert_eq!(count_rows(&connection), 3);
    }

    #[rstest]
    fn commit_failures_roll_back_and_continue(connection: Connection) {
        connection
            .execute_batch(
                "PRAGMA foreign_keys = ON;
                 CREATE TABLE owners (id INTEGER PRIMARY KEY);
                 CREATE TABLE claims (
                     owner_id INTEGER REFERENCES owners(id) DEFERRABLE INITIALLY DEFERRED
                 );
                 CREATE TRIGGER orphan_claim AFTER INSERT ON features
                 WHEN NEW.name = 'orphan'
                 BEGIN INSERT INTO claims (owner_id) VALUES (999); END;",
            )
            .expect("create deferred constraint");

        let mut writer = BatchWriter::begin(&connection, batch_size(2)).expect("begin");
        writer.submit(row("first"));
        writer.submit(row("orphan"));
        writer.submit(row("after"));
        let stats = writer.finish();

        assert_eq!(stats.failed_commits, 1);
        assert_eq!(stats.rolled_back_rows, 2);
        assert_eq!(stats.committed.total(), 1);
        assert_eq!(stats.batches_committed, 1);
        assert_eq!(count_rows(&connection), 1);
    }

    #[rstest]
    fn dropping_the_writer_commits_pending_rows(connection: Connection) {
        {
            let mut writer = BatchWriter::begin(&connection, batch_size(100)).expect("begin");
            writer.submit(row("kept"));
        }
        assert_eq!(count_rows(&connection), 1);
        assert!(connection.is_autocommit());
    }

    #[rstest]
    fn begin_fails_inside_an_open_transaction(connection: Connection) {
        connection.execute_batch("BEGIN").expect("outer transaction");
        let err = BatchWriter::begin(&connection, batch_size(1)).expect_err("nested begin");
        assert!(matches!(err, StoreError::BeginTransaction { .. }));
    }
}
