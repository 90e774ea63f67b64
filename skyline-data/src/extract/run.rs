use std::{num::NonZeroUsize, path::Path};

use camino::Utf8Path;
use log::info;
use skyline_core::{Category, EntitySource};

use super::{DecodePolicy, ExtractError, Extraction, ResolveReport, ScanReport};
use crate::{
    pbf::{PbfEntitySource, resolve_workers},
    store::{BatchStats, ConsolidationReport, DEFAULT_BATCH_SIZE, Store, open_store},
};

/// Tunables for a full extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Decoder worker count; `None` or `Some(0)` auto-detects.
    pub workers: Option<usize>,
    /// Rows committed per transaction.
    pub batch_size: NonZeroUsize,
    /// Handling of mid-stream decode errors.
    pub decode_policy: DecodePolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            workers: None,
            batch_size: DEFAULT_BATCH_SIZE,
            decode_policy: DecodePolicy::Truncate,
        }
    }
}

/// Outcome of both passes against a store.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Pass 1 outcome.
    pub scan: ScanReport,
    /// Pass 2 outcome.
    pub resolve: ResolveReport,
    /// Persistence counters from the batch writer.
    pub writes: BatchStats,
}

/// Outcome of [`run_extraction`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    /// Decoder workers used.
    pub workers: NonZeroUsize,
    /// Outcome of both passes.
    pub pipeline: PipelineReport,
    /// Outcome of post-run maintenance.
    pub consolidation: ConsolidationReport,
}

/// Run both passes over `source`, writing features into `store`.
///
/// The batch writer is always finished, so rows inserted before a pass-2
/// failure are committed before the error is returned.
///
/// # Errors
/// Fails when a pass cannot open the source, when the first transaction
/// cannot begin, or on a decode error under [`DecodePolicy::Fail`].
pub fn extract_to_store<S: EntitySource>(
    source: S,
    store: &Store,
    options: &ExtractOptions,
) -> Result<PipelineReport, ExtractError> {
    let mut extraction = Extraction::new(source).with_decode_policy(options.decode_policy);

    info!("Scanning ways for tall buildings");
    let scan = extraction.scan()?;
    info!("Found {} tall buildings", scan.tall_buildings);

    info!("Resolving points and writing features");
    let mut writer = store.batch_writer(options.batch_size)?;
    let resolved = extraction.resolve(&mut writer);
    let writes = writer.finish();
    let resolve = resolved?;

    log_summary(&scan, &resolve, &writes);
    Ok(PipelineReport {
        scan,
        resolve,
        writes,
    })
}

/// Extract tall features from the PBF file at `input` into the SQLite store
/// at `output`.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
/// use camino::Utf8Path;
/// use skyline_data::{ExtractOptions, run_extraction};
///
/// # fn main() -> Result<(), skyline_data::ExtractError> {
/// let report = run_extraction(
///     Path::new("planet.osm.pbf"),
///     Utf8Path::new("skyline.db"),
///     &ExtractOptions::default(),
/// )?;
/// println!("{} features", report.pipeline.writes.committed.total());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Returns an error for the fatal conditions of [`extract_to_store`], and
/// when the decoder or the store cannot be prepared.
pub fn run_extraction(
    input: &Path,
    output: &Utf8Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    let workers = resolve_workers(options.workers);
    info!("Using {workers} CPU workers");
    let source = PbfEntitySource::new(input, workers)?;
    let store = open_store(output)?;

    let pipeline = extract_to_store(source, &store, options)?;
    let consolidation = store.consolidate();
    info!("Done! Saved to {output}");

    Ok(ExtractionReport {
        workers,
        pipeline,
        consolidation,
    })
}

fn log_summary(scan: &ScanReport, resolve: &ResolveReport, writes: &BatchStats) {
    info!("Inserted {} features", writes.committed.total());
    for category in Category::ALL {
        info!(
            "  {category}: {} of {} rows committed",
            writes.committed.get(category),
            writes.attempted.get(category)
        );
    }
    if writes.failed_rows > 0 || writes.failed_commits > 0 {
        info!(
            "{} rows failed to insert; {} rows lost to {} failed commits",
            writes.failed_rows, writes.rolled_back_rows, writes.failed_commits
        );
    }
    info!(
        "Resolved {} of {} tall buildings",
        resolve.buildings_resolved(),
        scan.tall_buildings
    );
    if let Some(bounds) = resolve.bounds {
        info!(
            "Feature extent: lon {:.5}..{:.5}, lat {:.5}..{:.5}",
            bounds.min().x,
            bounds.max().x,
            bounds.min().y,
            bounds.max().y
        );
    }
}
