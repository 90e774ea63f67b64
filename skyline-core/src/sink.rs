use crate::FeatureRow;

/// Destination for extracted feature rows.
///
/// Submission is infallible from the caller's point of view: sinks that can
/// fail are expected to record and log failures themselves so one bad row
/// never aborts an extraction pass.
pub trait FeatureSink {
    /// Accept one row.
    fn submit(&mut self, row: FeatureRow);
}

impl FeatureSink for Vec<FeatureRow> {
    fn submit(&mut self, row: FeatureRow) {
        self.push(row);
    }
}

impl<S: FeatureSink + ?Sized> FeatureSink for &mut S {
    fn submit(&mut self, row: FeatureRow) {
        (**self).submit(row);
    }
}
