//! Facade crate for the Skyline extractor.
//!
//! This crate re-exports the domain types from `skyline-core` and the
//! PBF-to-SQLite pipeline from `skyline-data`.

#![forbid(unsafe_code)]

pub use skyline_core::{
    Category, CategoryCounts, Entity, EntitySource, FeatureRow, FeatureSink, PointEntity,
    TagLookup, Tags, Watchlist, WatchlistEntry, WayEntity, parse_height,
};

pub use skyline_data::{
    DecodePolicy, ExtractError, ExtractOptions, Extraction, ExtractionReport, PbfEntitySource,
    extract_to_store, run_extraction,
};
