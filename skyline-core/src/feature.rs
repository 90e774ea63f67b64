//! Persisted feature records.

use std::fmt;

use geo::Coord;

use crate::{TagLookup, WatchlistEntry, parse_height};

/// Kind of vertical feature stored in the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A tall building resolved through the watchlist.
    Building,
    /// A `natural=peak` point.
    Peak,
    /// A `man_made=mast` point.
    Mast,
    /// A `man_made=tower` point.
    Tower,
}

impl Category {
    /// Every category, in the order rows are produced for a single point.
    pub const ALL: [Self; 4] = [Self::Peak, Self::Mast, Self::Tower, Self::Building];

    /// Label persisted in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Peak => "peak",
            Self::Mast => "mast",
            Self::Tower => "tower",
        }
    }

    /// Map a `man_made` tag value onto a structure category.
    ///
    /// # Examples
    /// ```
    /// use skyline_core::Category;
    ///
    /// assert_eq!(Category::from_man_made("mast"), Some(Category::Mast));
    /// assert_eq!(Category::from_man_made("chimney"), None);
    /// ```
    #[must_use]
    pub fn from_man_made(value: &str) -> Option<Self> {
        match value {
            "mast" => Some(Self::Mast),
            "tower" => Some(Self::Tower),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row tallies broken down by [`Category`].
///
/// # Examples
/// ```
/// use skyline_core::{Category, CategoryCounts};
///
/// let mut counts = CategoryCounts::default();
/// counts.record(Category::Peak);
/// counts.record(Category::Peak);
/// counts.record(Category::Tower);
/// assert_eq!(counts.get(Category::Peak), 2);
/// assert_eq!(counts.total(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryCounts {
    /// Building rows.
    pub building: u64,
    /// Peak rows.
    pub peak: u64,
    /// Mast rows.
    pub mast: u64,
    /// Tower rows.
    pub tower: u64,
}

impl CategoryCounts {
    /// Count one row of `category`.
    pub fn record(&mut self, category: Category) {
        let slot = self.slot_mut(category);
        *slot = slot.saturating_add(1);
    }

    /// Rows counted for `category`.
    #[must_use]
    pub const fn get(&self, category: Category) -> u64 {
        match category {
            Category::Building => self.building,
            Category::Peak => self.peak,
            Category::Mast => self.mast,
            Category::Tower => self.tower,
        }
    }

    /// Rows counted across every category.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.building
            .saturating_add(self.peak)
            .saturating_add(self.mast)
            .saturating_add(self.tower)
    }

    /// Add every tally in `other` to this one.
    pub fn absorb(&mut self, other: Self) {
        for category in Category::ALL {
            let slot = self.slot_mut(category);
            *slot = slot.saturating_add(other.get(category));
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Building => &mut self.building,
            Category::Peak => &mut self.peak,
            Category::Mast => &mut self.mast,
            Category::Tower => &mut self.tower,
        }
    }
}

/// One extracted feature, always anchored at a point's coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Display name, possibly empty.
    pub name: String,
    /// Feature kind.
    pub category: Category,
    /// Height or elevation in metres.
    pub height: f64,
    /// Building levels; zero for non-building features.
    pub levels: u32,
    /// Postal address; empty for non-building features.
    pub address: String,
    /// WGS84 position with `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
}

impl FeatureRow {
    /// Row for a peak, using `ele` as its height.
    #[must_use]
    pub fn peak<T: TagLookup + ?Sized>(tags: &T, location: Coord<f64>) -> Self {
        Self::from_point_tags(Category::Peak, tags, parse_height(tags.tag("ele")), location)
    }

    /// Row for a mast or tower, using `height` as its height.
    #[must_use]
    pub fn structure<T: TagLookup + ?Sized>(
        category: Category,
        tags: &T,
        location: Coord<f64>,
    ) -> Self {
        Self::from_point_tags(category, tags, parse_height(tags.tag("height")), location)
    }

    /// Row for a watchlisted building resolved at `location`.
    #[must_use]
    pub fn building(entry: &WatchlistEntry, location: Coord<f64>) -> Self {
        Self {
            name: entry.name.clone(),
            category: Category::Building,
            height: entry.height,
            levels: entry.levels,
            address: entry.address.clone(),
            location,
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    fn from_point_tags<T: TagLookup + ?Sized>(
        category: Category,
        tags: &T,
        height: f64,
        location: Coord<f64>,
    ) -> Self {
        Self {
            name: tags.tag("name").to_owned(),
            category,
            height,
            levels: 0,
            address: String::new(),
            location,
        }
    }
}
