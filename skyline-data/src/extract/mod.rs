//! Two-pass extraction of tall features.
//!
//! [`Extraction`] owns an [`EntitySource`] and enforces the pass order:
//! [`Extraction::scan`] builds the [`Watchlist`] from ways, and only once it
//! has completed may [`Extraction::resolve`] traverse the source again to
//! emit [`FeatureRow`](skyline_core::FeatureRow)s for points.

use std::{error::Error, fmt};

use log::warn;
use skyline_core::{Entity, EntitySource, FeatureSink, Watchlist};
use thiserror::Error;

use crate::{pbf::PbfSourceError, store::StoreError};

mod resolve;
mod run;
mod scan;

pub use resolve::ResolveReport;
pub use run::{ExtractOptions, ExtractionReport, PipelineReport, extract_to_store, run_extraction};
pub use scan::ScanReport;

/// Boxed error carried across the generic source boundary.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Progress of one extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassState {
    /// The pass has not been attempted, or its last attempt failed.
    #[default]
    NotStarted,
    /// The pass is consuming the entity stream.
    Running,
    /// The pass drained its stream.
    Complete,
}

/// Identifies a pass in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Pass 1: way scan building the watchlist.
    Scan,
    /// Pass 2: point resolution writing features.
    Resolve,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan => f.write_str("pass 1 (way scan)"),
            Self::Resolve => f.write_str("pass 2 (point resolution)"),
        }
    }
}

/// How a decode error in the middle of a pass is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// End the pass as if the stream had finished, recording the error.
    #[default]
    Truncate,
    /// Abort the extraction with [`ExtractError::Decode`].
    Fail,
}

/// Errors returned by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// `resolve` was called before the way scan completed.
    #[error("cannot resolve points before the way scan completes (scan is {state:?})")]
    ScanIncomplete {
        /// State of the way scan at the time of the call.
        state: PassState,
    },
    /// `scan` was called after the way scan already completed.
    #[error("the way scan has already completed")]
    AlreadyScanned,
    /// `resolve` was called after point resolution already completed.
    #[error("point resolution has already completed")]
    AlreadyResolved,
    /// The entity source could not start a traversal.
    #[error("failed to open the entity source for {pass}")]
    OpenSource {
        /// Pass that attempted the traversal.
        pass: Pass,
        /// Error reported by the source.
        #[source]
        source: BoxError,
    },
    /// A decode error interrupted a pass under [`DecodePolicy::Fail`].
    #[error("decode error during {pass}")]
    Decode {
        /// Pass that was interrupted.
        pass: Pass,
        /// Error reported by the source.
        #[source]
        source: BoxError,
    },
    /// The PBF decoder could not be prepared.
    #[error(transparent)]
    Decoder(#[from] PbfSourceError),
    /// The output store could not be prepared.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Two-pass pipeline over a restartable entity source.
///
/// # Examples
/// ```
/// use skyline_core::{Entity, EntitySource, FeatureRow, PointEntity, Tags, WayEntity};
/// use skyline_data::Extraction;
///
/// struct Fixed(Vec<Entity>);
///
/// impl EntitySource for Fixed {
///     type Error = std::convert::Infallible;
///     type Entities = std::vec::IntoIter<Result<Entity, Self::Error>>;
///
///     fn open(&self) -> Result<Self::Entities, Self::Error> {
///         Ok(self.0.iter().cloned().map(Ok).collect::<Vec<_>>().into_iter())
///     }
/// }
///
/// let tags = |pairs: &[(&str, &str)]| -> Tags {
///     pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
/// };
/// let source = Fixed(vec![
///     Entity::Way(WayEntity {
///         id: 100,
///         node_refs: vec![1, 2],
///         tags: tags(&[("building", "yes"), ("building:levels", "10")]),
///     }),
///     Entity::Point(PointEntity::new(1, 10.0, 20.0, Tags::new())),
/// ]);
///
/// let mut extraction = Extraction::new(source);
/// extraction.scan()?;
/// let mut rows: Vec<FeatureRow> = Vec::new();
/// extraction.resolve(&mut rows)?;
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].levels, 10);
/// # Ok::<(), skyline_data::ExtractError>(())
/// ```
#[derive(Debug)]
pub struct Extraction<S> {
    source: S,
    decode_policy: DecodePolicy,
    scan_state: PassState,
    resolve_state: PassState,
    watchlist: Watchlist,
}

impl<S: EntitySource> Extraction<S> {
    /// Wrap `source` with both passes not yet started.
    pub fn new(source: S) -> Self {
        Self {
            source,
            decode_policy: DecodePolicy::default(),
            scan_state: PassState::NotStarted,
            resolve_state: PassState::NotStarted,
            watchlist: Watchlist::new(),
        }
    }

    /// Choose how mid-stream decode errors are handled.
    #[must_use]
    pub fn with_decode_policy(mut self, decode_policy: DecodePolicy) -> Self {
        self.decode_policy = decode_policy;
        self
    }

    /// Run pass 1, registering every tall building under its first point.
    ///
    /// A failed scan leaves the pipeline in [`PassState::NotStarted`] with an
    /// empty watchlist, so it may be retried.
    ///
    /// # Errors
    /// Returns [`ExtractError::AlreadyScanned`] once the scan has completed,
    /// [`ExtractError::OpenSource`] when the source cannot start a traversal,
    /// and [`ExtractError::Decode`] on a decode error under
    /// [`DecodePolicy::Fail`].
    pub fn scan(&mut self) -> Result<ScanReport, ExtractError> {
        if self.scan_state != PassState::NotStarted {
            return Err(ExtractError::AlreadyScanned);
        }
        self.scan_state = PassState::Running;
        match scan::scan_ways(&self.source, self.decode_policy) {
            Ok((watchlist, report)) => {
                self.watchlist = watchlist;
                self.scan_state = PassState::Complete;
                Ok(report)
            }
            Err(err) => {
                self.watchlist = Watchlist::new();
                self.scan_state = PassState::NotStarted;
                Err(err)
            }
        }
    }

    /// Run pass 2, submitting every matched feature to `sink`.
    ///
    /// Rows submitted before a failure stay submitted; a failed pass returns
    /// to [`PassState::NotStarted`].
    ///
    /// # Errors
    /// Returns [`ExtractError::ScanIncomplete`] until [`Extraction::scan`]
    /// has completed and [`ExtractError::AlreadyResolved`] once this pass has.
    /// Source failures are reported as for [`Extraction::scan`].
    pub fn resolve<K: FeatureSink + ?Sized>(
        &mut self,
        sink: &mut K,
    ) -> Result<ResolveReport, ExtractError> {
        if self.scan_state != PassState::Complete {
            return Err(ExtractError::ScanIncomplete {
                state: self.scan_state,
            });
        }
        if self.resolve_state != PassState::NotStarted {
            return Err(ExtractError::AlreadyResolved);
        }
        self.resolve_state = PassState::Running;
        let outcome =
            resolve::resolve_points(&self.source, self.decode_policy, &self.watchlist, sink);
        self.resolve_state = if outcome.is_ok() {
            PassState::Complete
        } else {
            PassState::NotStarted
        };
        outcome
    }

    /// Buildings registered by the way scan.
    #[must_use]
    pub const fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// State of pass 1.
    #[must_use]
    pub const fn scan_state(&self) -> PassState {
        self.scan_state
    }

    /// State of pass 2.
    #[must_use]
    pub const fn resolve_state(&self) -> PassState {
        self.resolve_state
    }

    /// Borrow the wrapped source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }
}

fn open_pass<S: EntitySource>(source: &S, pass: Pass) -> Result<S::Entities, ExtractError> {
    source.open().map_err(|err| ExtractError::OpenSource {
        pass,
        source: Box::new(err),
    })
}

/// Feed every entity to `visit` until the stream ends or errors.
///
/// Returns the message of the error that truncated the pass, if any.
fn drain<I, E, F>(
    entities: I,
    pass: Pass,
    policy: DecodePolicy,
    mut visit: F,
) -> Result<Option<String>, ExtractError>
where
    I: Iterator<Item = Result<Entity, E>>,
    E: Error + Send + Sync + 'static,
    F: FnMut(Entity),
{
    for item in entities {
        match item {
            Ok(entity) => visit(entity),
            Err(err) => {
                return match policy {
                    DecodePolicy::Truncate => {
                        warn!("Decode error ended {pass} early: {err}");
                        Ok(Some(err.to_string()))
                    }
                    DecodePolicy::Fail => Err(ExtractError::Decode {
                        pass,
                        source: Box::new(err),
                    }),
                };
            }
        }
    }
    Ok(None)
}
