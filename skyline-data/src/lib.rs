//! Data access and extraction logic for the Skyline extractor.
//!
//! Responsibilities:
//! - Decode OSM PBF files into the entity stream defined by `skyline-core`.
//! - Drive the two-pass extraction pipeline over any entity source.
//! - Persist extracted features to SQLite in bounded transactions.
//!
//! Boundaries:
//! - Do not encode classification rules (live in `skyline-core`).
//! - Do not parse command-line arguments or install a logger.
//!
//! Invariants:
//! - Pass 1 completes before pass 2 reads its first entity.
//! - Decoder parallelism never changes the order entities are delivered in.
//! - No global mutable state.

pub mod extract;
mod pbf;
pub mod store;

pub use extract::{
    DecodePolicy, ExtractError, ExtractOptions, Extraction, ExtractionReport, Pass, PassState,
    PipelineReport, ResolveReport, ScanReport, extract_to_store, run_extraction,
};
pub use pbf::{PbfEntities, PbfEntitySource, PbfSourceError, resolve_workers};
