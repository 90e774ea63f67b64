//! Core domain types for the Skyline extractor.
//!
//! This crate holds the pure parts of tall-feature extraction: the entity
//! model delivered by a decoder, the tag classifier and height normaliser,
//! the cross-pass [`Watchlist`], and the [`FeatureRow`] records handed to a
//! [`FeatureSink`]. Nothing here performs I/O; decoders and stores live in
//! `skyline-data`.

#![forbid(unsafe_code)]

pub mod classify;
mod entity;
mod feature;
mod height;
mod sink;
mod tags;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
mod watchlist;

pub use classify::{
    BUILDING_MIN_HEIGHT, BUILDING_MIN_LEVELS, PointMatches, classify_point, classify_way,
    format_address, parse_levels,
};
pub use entity::{Entity, EntitySource, PointEntity, WayEntity};
pub use feature::{Category, CategoryCounts, FeatureRow};
pub use height::parse_height;
pub use sink::FeatureSink;
pub use tags::{TagLookup, Tags};
pub use watchlist::{Watchlist, WatchlistEntry};
