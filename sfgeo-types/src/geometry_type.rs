//! See documentation for [`GeometryType`].
use serde::{Deserialize, Serialize};

/// Type tag of a [`Geometry`](crate::Geometry).
///
/// The types form the Simple Features hierarchy: `Line` and `LinearRing` are subtypes of `LineString`, and the
/// three `Multi*` types are subtypes of `GeometryCollection`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    /// Point.
    Point,
    /// LineString.
    LineString,
    /// LineString with exactly zero or two points.
    Line,
    /// Closed and simple LineString.
    LinearRing,
    /// Polygon.
    Polygon,
    /// Heterogeneous collection.
    GeometryCollection,
    /// Collection of points.
    MultiPoint,
    /// Collection of line strings.
    MultiLineString,
    /// Collection of polygons.
    MultiPolygon,
}

impl GeometryType {
    /// OGC Simple Features name of the type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Line => "Line",
            Self::LinearRing => "LinearRing",
            Self::Polygon => "Polygon",
            Self::GeometryCollection => "GeometryCollection",
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
        }
    }

    /// The nearest type that has its own representation in WKT and WKB: `Line` and `LinearRing` are encoded as
    /// `LineString`.
    pub fn encoded_type(&self) -> Self {
        match self {
            Self::Line | Self::LinearRing => Self::LineString,
            other => *other,
        }
    }

    /// Returns true if `self` is `other` or one of its subtypes.
    pub fn is_subtype_of(&self, other: GeometryType) -> bool {
        if *self == other {
            return true;
        }

        matches!(
            (self, other),
            (Self::Line | Self::LinearRing, Self::LineString)
                | (
                    Self::MultiPoint | Self::MultiLineString | Self::MultiPolygon,
                    Self::GeometryCollection
                )
        )
    }

    /// Element type of a homogeneous collection type.
    pub fn element_type(&self) -> Option<GeometryType> {
        match self {
            Self::MultiPoint => Some(Self::Point),
            Self::MultiLineString => Some(Self::LineString),
            Self::MultiPolygon => Some(Self::Polygon),
            _ => None,
        }
    }

    /// Returns true for `GeometryCollection` and its subtypes.
    pub fn is_collection(&self) -> bool {
        self.is_subtype_of(Self::GeometryCollection)
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}
