//! Construction of geometries.
//!
//! Every geometry is created by a [`Factory`] and keeps a handle to it for its whole life. The factory fixes the
//! spatial reference id and whether the geometries carry `z` and `m` ordinates, and optionally holds a
//! [`TopologyEngine`] that performs the full topological validation of polygons.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::SfGeoError;
use crate::geometry::{
    Geometry, GeometryCollection, Line, LineString, LinearRing, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use crate::geometry_type::GeometryType;

/// Settings of a [`Factory`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Spatial reference system id of the created geometries.
    pub srid: i32,
    /// Whether the geometries have a `z` ordinate.
    pub has_z: bool,
    /// Whether the geometries have an `m` ordinate.
    pub has_m: bool,
}

impl FactoryConfig {
    /// Sets the SRID.
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    /// Enables or disables the `z` ordinate.
    pub fn with_z(mut self, has_z: bool) -> Self {
        self.has_z = has_z;
        self
    }

    /// Enables or disables the `m` ordinate.
    pub fn with_m(mut self, has_m: bool) -> Self {
        self.has_m = has_m;
        self
    }
}

/// External engine that checks topological validity the local checks cannot establish: that holes lie inside
/// the exterior ring and do not overlap, and that the polygons of a multipolygon do not overlap.
///
/// Ring simplicity is always checked by the factory itself before the engine is called.
pub trait TopologyEngine: std::fmt::Debug + Send + Sync {
    /// Validates a polygon whose rings are known to be simple.
    fn validate_polygon(&self, polygon: &Polygon) -> Result<(), SfGeoError>;

    /// Validates a multipolygon made of individually valid polygons.
    fn validate_multi_polygon(&self, multi_polygon: &MultiPolygon) -> Result<(), SfGeoError>;
}

#[derive(Debug)]
struct FactoryInner {
    config: FactoryConfig,
    topology_engine: Option<Arc<dyn TopologyEngine>>,
}

/// Creates geometries. Cloning a factory is cheap: all clones share the same settings.
///
/// ```
/// use sfgeo_types::{Factory, FactoryConfig};
///
/// let factory = Factory::new(FactoryConfig::default().with_srid(4326));
/// let ring = factory
///     .linear_ring(vec![
///         factory.point(0.0, 0.0),
///         factory.point(1.0, 0.0),
///         factory.point(1.0, 1.0),
///     ])
///     .unwrap();
///
/// assert_eq!(ring.num_points(), 4);
/// assert_eq!(ring.factory().srid(), 4326);
/// ```
#[derive(Debug, Clone)]
pub struct Factory(Arc<FactoryInner>);

impl Default for Factory {
    fn default() -> Self {
        Self::new(FactoryConfig::default())
    }
}

impl PartialEq for Factory {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }

        let same_engine = match (&self.0.topology_engine, &other.0.topology_engine) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };

        same_engine && self.0.config == other.0.config
    }
}

impl Factory {
    /// Creates a new factory without a topology engine.
    pub fn new(config: FactoryConfig) -> Self {
        Self(Arc::new(FactoryInner {
            config,
            topology_engine: None,
        }))
    }

    /// Creates a new factory that delegates full polygon validation to the given engine.
    pub fn with_topology_engine(config: FactoryConfig, engine: Arc<dyn TopologyEngine>) -> Self {
        Self(Arc::new(FactoryInner {
            config,
            topology_engine: Some(engine),
        }))
    }

    /// Settings of the factory.
    pub fn config(&self) -> FactoryConfig {
        self.0.config
    }

    /// Spatial reference system id.
    pub fn srid(&self) -> i32 {
        self.0.config.srid
    }

    /// Whether geometries of this factory have a `z` ordinate.
    pub fn has_z(&self) -> bool {
        self.0.config.has_z
    }

    /// Whether geometries of this factory have an `m` ordinate.
    pub fn has_m(&self) -> bool {
        self.0.config.has_m
    }

    pub(crate) fn topology_engine(&self) -> Option<&dyn TopologyEngine> {
        self.0.topology_engine.as_deref()
    }

    pub(crate) fn normalize(&self, coord: Coord) -> Coord {
        coord.normalized(self.has_z(), self.has_m())
    }

    /// Creates a 2d point. If the factory supports `z` or `m`, they are set to `0.0`.
    pub fn point(&self, x: f64, y: f64) -> Point {
        self.point_from_coord(Coord::xy(x, y))
    }

    /// Creates a point with `z`.
    pub fn point_z(&self, x: f64, y: f64, z: f64) -> Point {
        self.point_from_coord(Coord::xyz(x, y, z))
    }

    /// Creates a point with a measure.
    pub fn point_m(&self, x: f64, y: f64, m: f64) -> Point {
        self.point_from_coord(Coord::xym(x, y, m))
    }

    /// Creates a point with `z` and a measure.
    pub fn point_zm(&self, x: f64, y: f64, z: f64, m: f64) -> Point {
        self.point_from_coord(Coord::xyzm(x, y, z, m))
    }

    /// Creates a point from a coordinate. Ordinates the factory does not support are dropped.
    pub fn point_from_coord(&self, coord: Coord) -> Point {
        Point::new(self.clone(), self.normalize(coord))
    }

    /// Creates a point from `x`, `y` and a list of extra ordinates. The extra ordinates are assigned to `z` and then
    /// to `m`, skipping the ones the factory does not support. Missing ones are set to `0.0`, surplus ones are
    /// ignored.
    pub fn point_with_ordinates(&self, x: f64, y: f64, extra: &[f64]) -> Point {
        let mut extra = extra.iter().copied();
        let z = if self.has_z() { extra.next() } else { None };
        let m = if self.has_m() { extra.next() } else { None };

        self.point_from_coord(Coord { x, y, z, m })
    }

    /// Creates an empty point.
    pub fn empty_point(&self) -> Point {
        self.point_from_coord(Coord::empty())
    }

    /// Creates a line string. A line string cannot consist of exactly one point.
    pub fn line_string(
        &self,
        points: impl IntoIterator<Item = Point>,
    ) -> Result<LineString, SfGeoError> {
        self.line_string_from_coords(points.into_iter().map(|p| p.coord()).collect())
    }

    /// Creates a line string from coordinates.
    pub fn line_string_from_coords(&self, coords: Vec<Coord>) -> Result<LineString, SfGeoError> {
        LineString::new(self.clone(), self.normalize_all(coords))
    }

    /// Creates a line between two points.
    pub fn line(&self, start: Point, end: Point) -> Line {
        Line::from_ends(self.clone(), self.normalize(start.coord()), self.normalize(end.coord()))
    }

    /// Creates a line from either zero or two coordinates.
    pub fn line_from_coords(&self, coords: Vec<Coord>) -> Result<Line, SfGeoError> {
        Line::new(self.clone(), self.normalize_all(coords))
    }

    /// Creates a linear ring. If the first and the last points differ, the first point is appended to close the
    /// ring. The ring must not intersect itself.
    pub fn linear_ring(
        &self,
        points: impl IntoIterator<Item = Point>,
    ) -> Result<LinearRing, SfGeoError> {
        self.linear_ring_from_coords(points.into_iter().map(|p| p.coord()).collect())
    }

    /// Creates a linear ring from coordinates. See [`Factory::linear_ring`].
    pub fn linear_ring_from_coords(&self, coords: Vec<Coord>) -> Result<LinearRing, SfGeoError> {
        LinearRing::new(self.clone(), self.normalize_all(coords))
    }

    /// Creates a polygon. The rings must be linear rings or closed line strings.
    pub fn polygon(
        &self,
        exterior: impl Into<Geometry>,
        interiors: Vec<Geometry>,
    ) -> Result<Polygon, SfGeoError> {
        let exterior = self.ring_from(exterior.into())?;
        let interiors = interiors
            .into_iter()
            .map(|ring| self.ring_from(ring))
            .collect::<Result<Vec<_>, _>>()?;

        Polygon::new(self.clone(), exterior, interiors)
    }

    /// Creates a collection of arbitrary geometries.
    pub fn collection(&self, elements: Vec<Geometry>) -> Result<GeometryCollection, SfGeoError> {
        let elements = elements
            .into_iter()
            .map(|element| self.adopt(element))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GeometryCollection::new(self.clone(), elements))
    }

    /// Creates a multipoint. All elements must be points.
    pub fn multi_point(&self, elements: Vec<Geometry>) -> Result<MultiPoint, SfGeoError> {
        let points = elements
            .into_iter()
            .map(|element| match self.adopt(element)? {
                Geometry::Point(p) => Ok(p),
                other => Err(wrong_element(GeometryType::MultiPoint, &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MultiPoint::new(self.clone(), points))
    }

    /// Creates a multilinestring. All elements must be line strings (lines and linear rings are stored as plain
    /// line strings).
    pub fn multi_line_string(
        &self,
        elements: Vec<Geometry>,
    ) -> Result<MultiLineString, SfGeoError> {
        let line_strings = elements
            .into_iter()
            .map(|element| match self.adopt(element)? {
                Geometry::LineString(ls) => Ok(ls),
                Geometry::Line(line) => Ok(line.into_line_string()),
                Geometry::LinearRing(ring) => Ok(ring.into_line_string()),
                other => Err(wrong_element(GeometryType::MultiLineString, &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MultiLineString::new(self.clone(), line_strings))
    }

    /// Creates a multipolygon. All elements must be polygons.
    pub fn multi_polygon(&self, elements: Vec<Geometry>) -> Result<MultiPolygon, SfGeoError> {
        let polygons = elements
            .into_iter()
            .map(|element| match self.adopt(element)? {
                Geometry::Polygon(p) => Ok(p),
                other => Err(wrong_element(GeometryType::MultiPolygon, &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        MultiPolygon::new(self.clone(), polygons)
    }

    /// Re-creates the geometry with this factory.
    ///
    /// If the geometry already belongs to this factory and `force_new` is false, a clone is returned. Returns `None`
    /// if the geometry cannot be represented by this factory.
    pub fn cast(&self, geometry: &Geometry, force_new: bool) -> Option<Geometry> {
        if !force_new && geometry.factory() == self {
            return Some(geometry.clone());
        }

        match self.rebuild(geometry) {
            Ok(v) => Some(v),
            Err(err) => {
                log::debug!("Cannot cast {} into factory: {err}", geometry.geometry_type());
                None
            }
        }
    }

    /// Re-creates the geometry with this factory and converts it into the given type. See [`Geometry::cast`].
    pub fn cast_as(&self, geometry: &Geometry, target: GeometryType) -> Option<Geometry> {
        self.cast(geometry, false)?.cast(target)
    }

    fn rebuild(&self, geometry: &Geometry) -> Result<Geometry, SfGeoError> {
        Ok(match geometry {
            Geometry::Point(p) => self.point_from_coord(p.coord()).into(),
            Geometry::LineString(ls) => self.line_string_from_coords(ls.coords().to_vec())?.into(),
            Geometry::Line(line) => self.line_from_coords(line.coords().to_vec())?.into(),
            Geometry::LinearRing(ring) => {
                self.linear_ring_from_coords(ring.coords().to_vec())?.into()
            }
            Geometry::Polygon(polygon) => self
                .polygon(
                    polygon.exterior_ring().clone(),
                    polygon
                        .interior_rings()
                        .iter()
                        .cloned()
                        .map(Geometry::from)
                        .collect(),
                )?
                .into(),
            Geometry::GeometryCollection(c) => self.collection(c.elements().to_vec())?.into(),
            Geometry::MultiPoint(mp) => self
                .multi_point(mp.points().iter().cloned().map(Geometry::from).collect())?
                .into(),
            Geometry::MultiLineString(mls) => self
                .multi_line_string(
                    mls.line_strings()
                        .iter()
                        .cloned()
                        .map(Geometry::from)
                        .collect(),
                )?
                .into(),
            Geometry::MultiPolygon(mp) => self
                .multi_polygon(mp.polygons().iter().cloned().map(Geometry::from).collect())?
                .into(),
        })
    }

    fn adopt(&self, geometry: Geometry) -> Result<Geometry, SfGeoError> {
        if geometry.factory() == self {
            return Ok(geometry);
        }

        self.rebuild(&geometry)
    }

    fn ring_from(&self, geometry: Geometry) -> Result<LinearRing, SfGeoError> {
        let geometry_type = geometry.geometry_type();
        match self.adopt(geometry)?.cast(GeometryType::LinearRing) {
            Some(Geometry::LinearRing(ring)) => Ok(ring),
            _ => Err(SfGeoError::invalid(format!(
                "{geometry_type} cannot be used as a polygon ring"
            ))),
        }
    }

    fn normalize_all(&self, mut coords: Vec<Coord>) -> Vec<Coord> {
        for coord in &mut coords {
            *coord = self.normalize(*coord);
        }

        coords
    }
}

fn wrong_element(container: GeometryType, element: &Geometry) -> SfGeoError {
    let found = element.geometry_type();
    match container.element_type() {
        Some(expected) => {
            SfGeoError::invalid(format!("{container} cannot contain {found}, only {expected}"))
        }
        None => SfGeoError::invalid(format!("{container} cannot contain {found}")),
    }
}
