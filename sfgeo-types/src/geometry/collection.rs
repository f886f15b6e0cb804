use crate::error::SfGeoError;
use crate::factory::Factory;
use crate::geometry::{Geometry, LineString, Point, Polygon};
use crate::rect::Rect;

/// Heterogeneous collection of geometries.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCollection {
    factory: Factory,
    elements: Vec<Geometry>,
}

impl GeometryCollection {
    pub(crate) fn new(factory: Factory, elements: Vec<Geometry>) -> Self {
        Self { factory, elements }
    }

    /// Factory that created the collection.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Elements of the collection.
    pub fn elements(&self) -> &[Geometry] {
        &self.elements
    }

    /// Number of elements.
    pub fn num_geometries(&self) -> usize {
        self.elements.len()
    }

    /// Element with the given index.
    pub fn geometry_n(&self, n: usize) -> Option<&Geometry> {
        self.elements.get(n)
    }

    /// Returns true if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Bounding rectangle of all the elements.
    pub fn envelope(&self) -> Option<Rect> {
        merge_envelopes(self.elements.iter().map(Geometry::envelope))
    }
}

/// Collection of points.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPoint {
    factory: Factory,
    points: Vec<Point>,
}

impl MultiPoint {
    pub(crate) fn new(factory: Factory, points: Vec<Point>) -> Self {
        Self { factory, points }
    }

    /// Factory that created the multipoint.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Points of the multipoint.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    pub fn num_geometries(&self) -> usize {
        self.points.len()
    }

    /// Point with the given index.
    pub fn geometry_n(&self, n: usize) -> Option<Geometry> {
        self.points.get(n).cloned().map(Geometry::from)
    }

    /// Returns true if there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding rectangle of the non-empty points.
    pub fn envelope(&self) -> Option<Rect> {
        let coords: Vec<_> = self
            .points
            .iter()
            .map(|p| p.coord())
            .filter(|c| !c.is_empty())
            .collect();
        Rect::from_points(coords.iter())
    }
}

/// Collection of line strings.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiLineString {
    factory: Factory,
    line_strings: Vec<LineString>,
}

impl MultiLineString {
    pub(crate) fn new(factory: Factory, line_strings: Vec<LineString>) -> Self {
        Self {
            factory,
            line_strings,
        }
    }

    /// Factory that created the multilinestring.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Line strings of the multilinestring.
    pub fn line_strings(&self) -> &[LineString] {
        &self.line_strings
    }

    /// Number of line strings.
    pub fn num_geometries(&self) -> usize {
        self.line_strings.len()
    }

    /// Line string with the given index.
    pub fn geometry_n(&self, n: usize) -> Option<Geometry> {
        self.line_strings.get(n).cloned().map(Geometry::from)
    }

    /// Returns true if there are no line strings.
    pub fn is_empty(&self) -> bool {
        self.line_strings.is_empty()
    }

    /// Returns true if every line string is closed. An empty multilinestring is not closed.
    pub fn is_closed(&self) -> bool {
        !self.line_strings.is_empty() && self.line_strings.iter().all(LineString::is_closed)
    }

    /// Bounding rectangle of all the line strings.
    pub fn envelope(&self) -> Option<Rect> {
        merge_envelopes(self.line_strings.iter().map(LineString::envelope))
    }
}

/// Collection of polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygon {
    factory: Factory,
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    pub(crate) fn new(factory: Factory, polygons: Vec<Polygon>) -> Result<Self, SfGeoError> {
        let multi_polygon = Self { factory, polygons };
        if let Some(engine) = multi_polygon.factory.topology_engine() {
            engine.validate_multi_polygon(&multi_polygon)?;
        }

        Ok(multi_polygon)
    }

    /// Factory that created the multipolygon.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Polygons of the multipolygon.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Number of polygons.
    pub fn num_geometries(&self) -> usize {
        self.polygons.len()
    }

    /// Polygon with the given index.
    pub fn geometry_n(&self, n: usize) -> Option<Geometry> {
        self.polygons.get(n).cloned().map(Geometry::from)
    }

    /// Returns true if there are no polygons.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Bounding rectangle of all the polygons.
    pub fn envelope(&self) -> Option<Rect> {
        merge_envelopes(self.polygons.iter().map(Polygon::envelope))
    }
}

fn merge_envelopes(rects: impl Iterator<Item = Option<Rect>>) -> Option<Rect> {
    rects
        .flatten()
        .reduce(|acc, rect| acc.merge(rect))
}
