use geo::{Coord, Rect};
use skyline_core::{
    Category, CategoryCounts, Entity, EntitySource, FeatureRow, FeatureSink, PointEntity,
    Watchlist, classify_point,
};

use super::{DecodePolicy, ExtractError, Pass, drain, open_pass};

/// Outcome of pass 2.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolveReport {
    /// Point entities examined.
    pub points_examined: u64,
    /// Rows handed to the sink, per category.
    pub rows_submitted: CategoryCounts,
    /// Bounding box of every submitted row, with `x = longitude`,
    /// `y = latitude`. `None` when no row had a valid coordinate.
    pub bounds: Option<Rect<f64>>,
    /// Message of the decode error that ended the pass early, if any.
    pub truncated_by: Option<String>,
}

impl ResolveReport {
    /// Watchlisted buildings that were matched by a point.
    #[must_use]
    pub const fn buildings_resolved(&self) -> u64 {
        self.rows_submitted.building
    }

    fn record(&mut self, row: &FeatureRow) {
        self.rows_submitted.record(row.category);
        if let Some(bounds) = coordinate_bounds(row.location) {
            self.include_bounds(bounds);
        }
    }

    fn include_bounds(&mut self, bounds: Rect<f64>) {
        match &mut self.bounds {
            Some(existing) => {
                let min = Coord {
                    x: existing.min().x.min(bounds.min().x),
                    y: existing.min().y.min(bounds.min().y),
                };
                let max = Coord {
                    x: existing.max().x.max(bounds.max().x),
                    y: existing.max().y.max(bounds.max().y),
                };
                *existing = Rect::new(min, max);
            }
            None => self.bounds = Some(bounds),
        }
    }
}

fn coordinate_bounds(location: Coord<f64>) -> Option<Rect<f64>> {
    (location.x.is_finite()
        && location.y.is_finite()
        && (-180.0..=180.0).contains(&location.x)
        && (-90.0..=90.0).contains(&location.y))
    .then(|| Rect::new(location, location))
}

pub(super) fn resolve_points<S, K>(
    source: &S,
    policy: DecodePolicy,
    watchlist: &Watchlist,
    sink: &mut K,
) -> Result<ResolveReport, ExtractError>
where
    S: EntitySource,
    K: FeatureSink + ?Sized,
{
    let entities = open_pass(source, Pass::Resolve)?;
    let mut report = ResolveReport::default();

    let outcome = drain(entities, Pass::Resolve, policy, |entity| {
        let Entity::Point(point) = entity else {
            return;
        };
        report.points_examined += 1;
        emit_rows(&point, watchlist, |row| {
            report.record(&row);
            sink.submit(row);
        });
    });

    report.truncated_by = outcome?;
    Ok(report)
}

/// Produce the rows for one point: peak, then mast or tower, then building.
fn emit_rows<F: FnMut(FeatureRow)>(point: &PointEntity, watchlist: &Watchlist, mut emit: F) {
    let matches = classify_point(&point.tags);
    if matches.peak {
        emit(FeatureRow::peak(&point.tags, point.location));
    }
    if let Some(category @ (Category::Mast | Category::Tower)) = matches.structure {
        emit(FeatureRow::structure(category, &point.tags, point.location));
    }
    if let Some(entry) = watchlist.get(point.id) {
        emit(FeatureRow::building(entry, point.location));
    }
}
