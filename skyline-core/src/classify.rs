//! Tag classification for tall features.
//!
//! Provides the predicates that decide whether an entity is:
//! - a tall building (ways only; registered in the [`Watchlist`](crate::Watchlist));
//! - a peak (`natural=peak`); or
//! - a mast or tower (`man_made=mast|tower`).
//!
//! Every function here is total. A missing or malformed tag is a default,
//! never an error.

use crate::{Category, TagLookup, WatchlistEntry, parse_height};

/// A building qualifies when it has strictly more levels than this.
pub const BUILDING_MIN_LEVELS: u32 = 5;

/// A building qualifies when it is strictly taller than this, in metres.
pub const BUILDING_MIN_HEIGHT: f64 = 30.0;

/// Parse a `building:levels` value, defaulting to zero.
///
/// # Examples
/// ```
/// use skyline_core::parse_levels;
///
/// assert_eq!(parse_levels("12"), 12);
/// assert_eq!(parse_levels("12.5"), 0);
/// assert_eq!(parse_levels(""), 0);
/// ```
#[must_use]
pub fn parse_levels(raw: &str) -> u32 {
    raw.parse().unwrap_or(0)
}

/// Join `addr:housenumber`, `addr:street` and `addr:city` with single spaces.
///
/// Missing parts contribute empty strings, so inner separators may double up;
/// only the ends are trimmed.
///
/// # Examples
/// ```
/// use skyline_core::{Tags, format_address};
///
/// let tags = Tags::from([
///     ("addr:housenumber".into(), "1".into()),
///     ("addr:city".into(), "London".into()),
/// ]);
/// assert_eq!(format_address(&tags), "1  London");
/// ```
#[must_use]
pub fn format_address<T: TagLookup + ?Sized>(tags: &T) -> String {
    let joined = format!(
        "{} {} {}",
        tags.tag("addr:housenumber"),
        tags.tag("addr:street"),
        tags.tag("addr:city"),
    );
    joined.trim().to_owned()
}

/// Classify a way's tags as a tall building.
///
/// Returns the metadata to register when `building` is set and the way has
/// more than [`BUILDING_MIN_LEVELS`] levels or is taller than
/// [`BUILDING_MIN_HEIGHT`].
///
/// # Examples
/// ```
/// use skyline_core::{Tags, classify_way};
///
/// let tall = Tags::from([
///     ("building".into(), "yes".into()),
///     ("building:levels".into(), "10".into()),
/// ]);
/// assert_eq!(classify_way(&tall).map(|entry| entry.levels), Some(10));
///
/// let short = Tags::from([("building".into(), "yes".into())]);
/// assert!(classify_way(&short).is_none());
/// ```
#[must_use]
pub fn classify_way<T: TagLookup + ?Sized>(tags: &T) -> Option<WatchlistEntry> {
    if tags.tag("building").is_empty() {
        return None;
    }
    let levels = parse_levels(tags.tag("building:levels"));
    let height = parse_height(tags.tag("height"));
    if levels <= BUILDING_MIN_LEVELS && height <= BUILDING_MIN_HEIGHT {
        return None;
    }
    Some(WatchlistEntry {
        name: tags.tag("name").to_owned(),
        height,
        levels,
        address: format_address(tags),
    })
}

/// Direct classifications of a point's own tags.
///
/// The two outcomes are independent: a point may be both a peak and a
/// structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointMatches {
    /// Whether the point is tagged `natural=peak`.
    pub peak: bool,
    /// Mast or tower category from `man_made`, when present.
    pub structure: Option<Category>,
}

impl PointMatches {
    /// Whether neither predicate matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.peak && self.structure.is_none()
    }
}

/// Evaluate the peak and mast/tower predicates for a point.
///
/// # Examples
/// ```
/// use skyline_core::{Category, Tags, classify_point};
///
/// let tags = Tags::from([
///     ("natural".into(), "peak".into()),
///     ("man_made".into(), "tower".into()),
/// ]);
/// let matches = classify_point(&tags);
/// assert!(matches.peak);
/// assert_eq!(matches.structure, Some(Category::Tower));
/// ```
#[must_use]
pub fn classify_point<T: TagLookup + ?Sized>(tags: &T) -> PointMatches {
    PointMatches {
        peak: tags.tag("natural") == "peak",
        structure: Category::from_man_made(tags.tag("man_made")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tags;
    use rstest::rstest;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[rstest]
    #[case::many_levels(&[("building", "yes"), ("building:levels", "6"), ("height", "0")], true)]
    #[case::very_tall(&[("building", "yes"), ("building:levels", "0"), ("height", "31")], true)]
    #[case::tall_with_unit(&[("building", "office"), ("height", "31 m")], true)]
    #[case::short(&[("building", "yes"), ("building:levels", "3"), ("height", "10")], false)]
    #[case::level_boundary(&[("building", "yes"), ("building:levels", "5")], false)]
    #[case::height_boundary(&[("building", "yes"), ("height", "30")], false)]
    #[case::no_building(&[("building:levels", "40"), ("height", "200")], false)]
    #[case::empty_building(&[("building", ""), ("height", "200")], false)]
    #[case::garbage_levels(&[("building", "yes"), ("building:levels", "many")], false)]
    fn classifies_tall_buildings(#[case] pairs: &[(&str, &str)], #[case] expected: bool) {
        assert_eq!(classify_way(&tags(pairs)).is_some(), expected);
    }

    #[rstest]
    fn captures_building_metadata() {
        let way_tags = tags(&[
            ("building", "yes"),
            ("building:levels", "44"),
            ("height", "180 m"),
            ("name", "Tower 42"),
            ("addr:housenumber", "25"),
            ("addr:street", "Old Broad Street"),
            ("addr:city", "London"),
        ]);
        let entry = classify_way(&way_tags).expect("tall building");

        assert_eq!(entry.name, "Tower 42");
        assert_eq!(entry.levels, 44);
        assert_eq!(entry.height, 180.0);
        assert_eq!(entry.address, "25 Old Broad Street London");
    }

    #[rstest]
    #[case(&[], "")]
    #[case(&[("addr:street", "High Street")], "High Street")]
    #[case(&[("addr:housenumber", "7"), ("addr:street", "Mill Lane")], "7 Mill Lane")]
    #[case(&[("addr:housenumber", "7"), ("addr:city", "York")], "7  York")]
    fn formats_addresses(#[case] pairs: &[(&str, &str)], #[case] expected: &str) {
        assert_eq!(format_address(&tags(pairs)), expected);
    }

    #[rstest]
    #[case(&[("natural", "peak")], true, None)]
    #[case(&[("man_made", "mast")], false, Some(Category::Mast))]
    #[case(&[("man_made", "tower")], false, Some(Category::Tower))]
    #[case(&[("man_made", "chimney")], false, None)]
    #[case(&[("natural", "peak"), ("man_made", "mast")], true, Some(Category::Mast))]
    #[case(&[("natural", "volcano")], false, None)]
    fn classifies_points(
        #[case] pairs: &[(&str, &str)],
        #[case] peak: bool,
        #[case] structure: Option<Category>,
    ) {
        let matches = classify_point(&tags(pairs));
        assert_eq!(matches.peak, peak);
        assert_eq!(matches.structure, structure);
        assert_eq!(matches.is_empty(), !peak && structure.is_none());
    }
}
