use skyline_core::{Entity, EntitySource, Watchlist, classify_way};

use super::{DecodePolicy, ExtractError, Pass, drain, open_pass};

/// Outcome of pass 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanReport {
    /// Way entities examined.
    pub ways_examined: u64,
    /// Ways that qualified as tall buildings, including any that later
    /// overwrote an earlier entry for the same first point.
    pub qualifying_ways: u64,
    /// Distinct entries left in the watchlist.
    pub tall_buildings: usize,
    /// Message of the decode error that ended the pass early, if any.
    pub truncated_by: Option<String>,
}

pub(super) fn scan_ways<S: EntitySource>(
    source: &S,
    policy: DecodePolicy,
) -> Result<(Watchlist, ScanReport), ExtractError> {
    let entities = open_pass(source, Pass::Scan)?;
    let mut watchlist = Watchlist::new();
    let mut report = ScanReport::default();

    let truncated_by = drain(entities, Pass::Scan, policy, |entity| {
        let Entity::Way(way) = entity else {
            return;
        };
        report.ways_examined += 1;
        let Some(first_node) = way.first_node() else {
            return;
        };
        if let Some(entry) = classify_way(&way.tags) {
            report.qualifying_ways += 1;
            watchlist.put(first_node, entry);
        }
    })?;

    report.tall_buildings = watchlist.len();
    report.truncated_by = truncated_by;
    Ok((watchlist, report))
}
