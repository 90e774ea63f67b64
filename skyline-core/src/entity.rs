//! Entities delivered by a map-data decoder.

use geo::Coord;

use crate::Tags;

/// A tagged point with a WGS84 position.
///
/// Coordinates use `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointEntity {
    /// Point identifier as assigned by the source dataset.
    pub id: i64,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// OpenStreetMap-style tags.
    pub tags: Tags,
}

impl PointEntity {
    /// Construct a point from latitude/longitude order, as decoders report it.
    ///
    /// # Examples
    /// ```
    /// use skyline_core::{PointEntity, Tags};
    ///
    /// let point = PointEntity::new(5, 51.5, -0.12, Tags::new());
    /// assert_eq!(point.location.x, -0.12);
    /// assert_eq!(point.location.y, 51.5);
    /// ```
    #[must_use]
    pub fn new(id: i64, lat: f64, lon: f64, tags: Tags) -> Self {
        Self {
            id,
            location: Coord { x: lon, y: lat },
            tags,
        }
    }
}

/// An ordered run of point references with tags.
#[derive(Debug, Clone, PartialEq)]
pub struct WayEntity {
    /// Way identifier as assigned by the source dataset.
    pub id: i64,
    /// Referenced point identifiers, in way order.
    pub node_refs: Vec<i64>,
    /// OpenStreetMap-style tags.
    pub tags: Tags,
}

impl WayEntity {
    /// Identifier of the first referenced point, used as the way's
    /// representative location.
    #[must_use]
    pub fn first_node(&self) -> Option<i64> {
        self.node_refs.first().copied()
    }
}

/// One decoded element of an input dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// A tagged point.
    Point(PointEntity),
    /// A way referencing points by identifier.
    Way(WayEntity),
    /// Any other element kind; extraction ignores it.
    Other,
}

/// A restartable, finite stream of decoded entities.
///
/// Each call to [`EntitySource::open`] starts a fresh traversal from the
/// beginning of the same input. No ordering across entity kinds is promised.
///
/// # Examples
/// ```
/// use std::convert::Infallible;
/// use skyline_core::{Entity, EntitySource, PointEntity, Tags};
///
/// struct Fixed(Vec<Entity>);
///
/// impl EntitySource for Fixed {
///     type Error = Infallible;
///     type Entities = std::vec::IntoIter<Result<Entity, Infallible>>;
///
///     fn open(&self) -> Result<Self::Entities, Self::Error> {
///         let items: Vec<_> = self.0.iter().cloned().map(Ok).collect();
///         Ok(items.into_iter())
///     }
/// }
///
/// let source = Fixed(vec![Entity::Point(PointEntity::new(1, 0.0, 0.0, Tags::new()))]);
/// assert_eq!(source.open().map(Iterator::count), Ok(1));
/// assert_eq!(source.open().map(Iterator::count), Ok(1));
/// ```
pub trait EntitySource {
    /// Error raised when opening the source or decoding an element.
    type Error: std::error::Error + Send + Sync + 'static;
    /// Iterator over one traversal of the input.
    type Entities: Iterator<Item = Result<Entity, Self::Error>>;

    /// Start a new traversal from the beginning of the input.
    fn open(&self) -> Result<Self::Entities, Self::Error>;
}
