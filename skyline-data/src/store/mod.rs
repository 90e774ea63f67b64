//! SQLite persistence for extracted features.
//!
//! The store is a single `features` table plus a composite coordinate index
//! and a category index. [`open_store`] prepares it before the first pass,
//! [`BatchWriter`] owns every write during the second pass, and
//! [`consolidate`] checkpoints and compacts the file afterwards.
#![forbid(unsafe_code)]

use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use rusqlite::{Connection, Error as SqliteError};
use thiserror::Error;

mod batch;
mod maintenance;
mod schema;

pub use batch::{BatchStats, BatchWriter};
pub use maintenance::{ConsolidationReport, consolidate};
pub use schema::JournalMode;

/// Rows committed per transaction unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

/// Fatal failures raised while preparing the output store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create the parent directory for the SQLite file.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the table or one of its indexes failed.
    #[error("failed to execute schema step '{step}'")]
    Schema {
        /// Description of the schema step that failed.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Opening the first write transaction failed.
    #[error("failed to begin feature write transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// An initialised output store.
#[derive(Debug)]
pub struct Store {
    connection: Connection,
    path: Utf8PathBuf,
    journal_mode: JournalMode,
}

impl Store {
    /// Borrow the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Location of the SQLite file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Journal mode in effect after initialisation.
    #[must_use]
    pub const fn journal_mode(&self) -> JournalMode {
        self.journal_mode
    }

    /// Start batched writes against this store.
    ///
    /// # Errors
    /// Returns [`StoreError::BeginTransaction`] when the first transaction
    /// cannot be opened, for example because one is already in progress.
    pub fn batch_writer(&self, batch_size: NonZeroUsize) -> Result<BatchWriter<'_>, StoreError> {
        BatchWriter::begin(&self.connection, batch_size)
    }

    /// Checkpoint the write-ahead log and reclaim free space.
    pub fn consolidate(&self) -> ConsolidationReport {
        consolidate(&self.connection)
    }
}

/// Open (creating if needed) the store at `path` and ensure its schema.
///
/// Parent directories are created first. Schema creation is idempotent, so
/// an existing store gains any missing index and keeps its rows. Failing to
/// switch to write-ahead logging is logged and tolerated.
///
/// # Errors
/// Returns [`StoreError::CreateDirectory`] when a parent directory cannot be
/// created, [`StoreError::Open`] when SQLite cannot open the file, and
/// [`StoreError::Schema`] when a schema step fails.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use skyline_data::store::open_store;
///
/// # fn main() -> Result<(), skyline_data::store::StoreError> {
/// let store = open_store(Utf8Path::new("out/skyline.db"))?;
/// println!("journal mode: {:?}", store.journal_mode());
/// # Ok(())
/// # }
/// ```
pub fn open_store(path: &Utf8Path) -> Result<Store, StoreError> {
    ensure_parent_dir(path)?;
    let connection =
        Connection::open(path.as_std_path()).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let journal_mode = schema::enable_wal(&connection);
    schema::create_schema(&connection)?;
    Ok(Store {
        connection,
        path: path.to_path_buf(),
        journal_mode,
    })
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    base_dir
        .create_dir_all(&relative)
        .map_err(|source| StoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })
}

fn base_dir_and_relative(parent: &Utf8Path) -> Result<(fs_utf8::Dir, Utf8PathBuf), StoreError> {
    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };

    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(|source| {
        StoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        }
    })?;

    Ok((dir, relative.to_path_buf()))
}
