//! Cross-pass index from representative point identifier to building metadata.

use std::collections::HashMap;

/// Metadata captured for a tall building during the way scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WatchlistEntry {
    /// Display name; empty when the way carries no `name` tag.
    pub name: String,
    /// Height in metres, never negative.
    pub height: f64,
    /// Number of building levels.
    pub levels: u32,
    /// Space-joined house number, street and city.
    pub address: String,
}

/// Buildings awaiting a coordinate, keyed by the first point of their way.
///
/// The watchlist grows only while ways are scanned and is read-only
/// afterwards. Its size is bounded by the number of qualifying buildings,
/// not by the size of the dataset.
///
/// # Examples
/// ```
/// use skyline_core::{Watchlist, WatchlistEntry};
///
/// let mut watchlist = Watchlist::new();
/// watchlist.put(10, WatchlistEntry { levels: 12, ..WatchlistEntry::default() });
/// assert_eq!(watchlist.get(10).map(|entry| entry.levels), Some(12));
/// assert!(watchlist.get(11).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    entries: HashMap<i64, WatchlistEntry>,
}

impl Watchlist {
    /// Create an empty watchlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` under `node_id`, replacing and returning any
    /// previous entry for the same point.
    pub fn put(&mut self, node_id: i64, entry: WatchlistEntry) -> Option<WatchlistEntry> {
        self.entries.insert(node_id, entry)
    }

    /// Look up the building anchored at `node_id`.
    #[must_use]
    pub fn get(&self, node_id: i64) -> Option<&WatchlistEntry> {
        self.entries.get(&node_id)
    }

    /// Number of registered buildings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no building has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
