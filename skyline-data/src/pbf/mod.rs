//! Streaming OSM PBF decoding backed by a dedicated worker pool.
//!
//! Blobs are read sequentially from disk, decoded in parallel windows of one
//! blob per worker, and handed out in file order. Consumers therefore see a
//! single ordered stream while decompression and protobuf decoding run on
//! the pool.

use std::{
    collections::VecDeque,
    fs::File,
    io::BufReader,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use log::debug;
use osmpbf::{Blob, BlobDecode, BlobReader};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder, prelude::*};
use skyline_core::{Entity, EntitySource};
use thiserror::Error;

mod convert;

use convert::convert_element;

/// Errors raised while opening or decoding an OSM PBF file.
#[derive(Debug, Error)]
pub enum PbfSourceError {
    /// Opening the PBF file failed.
    #[error("failed to open OSM PBF file at {path:?}")]
    Open {
        /// Location of the PBF file.
        path: PathBuf,
        /// Source error returned by `osmpbf`.
        #[source]
        source: osmpbf::Error,
    },
    /// Reading or decoding a blob failed.
    #[error("failed to decode OSM PBF data at {path:?}")]
    Decode {
        /// Location of the PBF file.
        path: PathBuf,
        /// Source error returned by `osmpbf`.
        #[source]
        source: osmpbf::Error,
    },
    /// The decoder worker pool could not be started.
    #[error("failed to start {workers} decoder workers")]
    WorkerPool {
        /// Requested worker count.
        workers: usize,
        /// Source error returned by `rayon`.
        #[source]
        source: ThreadPoolBuildError,
    },
}

/// Pick the decoder worker count, treating `None` and `0` as "auto".
///
/// Auto-detection uses the host's available parallelism and falls back to a
/// single worker when that cannot be determined.
///
/// # Examples
/// ```
/// use skyline_data::resolve_workers;
///
/// assert_eq!(resolve_workers(Some(3)).get(), 3);
/// assert!(resolve_workers(Some(0)).get() >= 1);
/// ```
#[must_use]
pub fn resolve_workers(requested: Option<usize>) -> NonZeroUsize {
    requested
        .and_then(NonZeroUsize::new)
        .unwrap_or_else(|| thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
}

/// Restartable [`EntitySource`] over an OSM PBF file.
///
/// Every [`open`](EntitySource::open) re-reads the file from the start. The
/// worker pool is shared by all traversals.
pub struct PbfEntitySource {
    path: PathBuf,
    workers: NonZeroUsize,
    pool: Arc<ThreadPool>,
}

impl std::fmt::Debug for PbfEntitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PbfEntitySource")
            .field("path", &self.path)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl PbfEntitySource {
    /// Prepare a source for `path` decoded by `workers` threads.
    ///
    /// The file itself is not touched until the first traversal.
    ///
    /// # Errors
    /// Returns [`PbfSourceError::WorkerPool`] when the decoder threads cannot
    /// be spawned.
    pub fn new(path: impl Into<PathBuf>, workers: NonZeroUsize) -> Result<Self, PbfSourceError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|index| format!("pbf-decode-{index}"))
            .build()
            .map_err(|source| PbfSourceError::WorkerPool {
                workers: workers.get(),
                source,
            })?;
        Ok(Self {
            path: path.into(),
            workers,
            pool: Arc::new(pool),
        })
    }

    /// Location of the PBF file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of decoder workers.
    #[must_use]
    pub const fn workers(&self) -> NonZeroUsize {
        self.workers
    }
}

impl EntitySource for PbfEntitySource {
    type Error = PbfSourceError;
    type Entities = PbfEntities;

    fn open(&self) -> Result<Self::Entities, Self::Error> {
        let blobs = BlobReader::from_path(&self.path).map_err(|source| PbfSourceError::Open {
            source,
            path: self.path.clone(),
        })?;
        debug!("Opened {:?} for decoding", self.path);
        Ok(PbfEntities {
            blobs,
            pool: Arc::clone(&self.pool),
            window: self.workers.get(),
            pending: VecDeque::new(),
            path: self.path.clone(),
            exhausted: false,
        })
    }
}

/// One ordered traversal of a PBF file.
///
/// The stream ends after the last blob, or immediately after yielding the
/// first read or decode error.
pub struct PbfEntities {
    blobs: BlobReader<BufReader<File>>,
    pool: Arc<ThreadPool>,
    window: usize,
    pending: VecDeque<Result<Entity, PbfSourceError>>,
    path: PathBuf,
    exhausted: bool,
}

impl PbfEntities {
    fn refill(&mut self) {
        let mut blobs = Vec::with_capacity(self.window);
        let mut read_failure = None;
        while blobs.len() < self.window {
            match self.blobs.next() {
                Some(Ok(blob)) => blobs.push(blob),
                Some(Err(source)) => {
                    read_failure = Some(source);
                    break;
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        let decoded: Vec<Result<Vec<Entity>, osmpbf::Error>> = self
            .pool
            .install(|| blobs.into_par_iter().map(|blob| decode_blob(&blob)).collect());

        for batch in decoded {
            match batch {
                Ok(entities) => self.pending.extend(entities.into_iter().map(Ok)),
                Err(source) => {
                    self.fail(source);
                    return;
                }
            }
        }
        if let Some(source) = read_failure {
            self.fail(source);
        }
    }

    fn fail(&mut self, source: osmpbf::Error) {
        self.pending.push_back(Err(PbfSourceError::Decode {
            path: self.path.clone(),
            source,
        }));
        self.exhausted = true;
    }
}

impl Iterator for PbfEntities {
    type Item = Result<Entity, PbfSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            if self.exhausted {
                return None;
            }
            self.refill();
        }
    }
}

fn decode_blob(blob: &Blob) -> Result<Vec<Entity>, osmpbf::Error> {
    match blob.decode()? {
        BlobDecode::OsmData(block) => Ok(block.elements().map(convert_element).collect()),
        BlobDecode::OsmHeader(_) | BlobDecode::Unknown(_) => Ok(Vec::new()),
    }
}
