//! Conversions to and from [`geo_types`] geometries. Only planar coordinates are transferred.

use crate::coord::Coord;
use crate::error::SfGeoError;
use crate::factory::Factory;
use crate::geometry::{Geometry, LineString, Polygon};

fn to_geo_coord(coord: &Coord) -> geo_types::Coord<f64> {
    geo_types::coord! { x: coord.x, y: coord.y }
}

fn to_geo_line_string(ls: &LineString) -> geo_types::LineString<f64> {
    geo_types::LineString(ls.coords().iter().map(to_geo_coord).collect())
}

fn to_geo_polygon(polygon: &Polygon) -> geo_types::Polygon<f64> {
    geo_types::Polygon::new(
        to_geo_line_string(polygon.exterior_ring()),
        polygon
            .interior_rings()
            .iter()
            .map(|ring| to_geo_line_string(ring))
            .collect(),
    )
}

impl From<&Geometry> for geo_types::Geometry<f64> {
    fn from(value: &Geometry) -> Self {
        match value {
            Geometry::Point(p) => geo_types::Point(to_geo_coord(&p.coord())).into(),
            Geometry::Line(line) if line.num_points() == 2 => {
                geo_types::Line::new(
                    to_geo_coord(&line.coords()[0]),
                    to_geo_coord(&line.coords()[1]),
                )
                .into()
            }
            Geometry::LineString(_) | Geometry::Line(_) | Geometry::LinearRing(_) => {
                match value.as_line_string() {
                    Some(ls) => to_geo_line_string(ls).into(),
                    None => geo_types::LineString::<f64>(vec![]).into(),
                }
            }
            Geometry::Polygon(p) => to_geo_polygon(p).into(),
            Geometry::GeometryCollection(c) => {
                geo_types::GeometryCollection(c.elements().iter().map(Self::from).collect()).into()
            }
            Geometry::MultiPoint(mp) => geo_types::MultiPoint(
                mp.points()
                    .iter()
                    .map(|p| geo_types::Point(to_geo_coord(&p.coord())))
                    .collect(),
            )
            .into(),
            Geometry::MultiLineString(mls) => geo_types::MultiLineString(
                mls.line_strings().iter().map(to_geo_line_string).collect(),
            )
            .into(),
            Geometry::MultiPolygon(mp) => {
                geo_types::MultiPolygon(mp.polygons().iter().map(to_geo_polygon).collect()).into()
            }
        }
    }
}

impl Factory {
    /// Creates a geometry from a [`geo_types`] geometry. `Rect` and `Triangle` become polygons.
    pub fn from_geo(&self, geometry: &geo_types::Geometry<f64>) -> Result<Geometry, SfGeoError> {
        Ok(match geometry {
            geo_types::Geometry::Point(p) => self.point(p.x(), p.y()).into(),
            geo_types::Geometry::Line(line) => self
                .line(
                    self.point(line.start.x, line.start.y),
                    self.point(line.end.x, line.end.y),
                )
                .into(),
            geo_types::Geometry::LineString(ls) => self.line_string_from_geo(ls)?.into(),
            geo_types::Geometry::Polygon(p) => self.polygon_from_geo(p)?.into(),
            geo_types::Geometry::MultiPoint(mp) => self
                .multi_point(mp.iter().map(|p| self.point(p.x(), p.y()).into()).collect())?
                .into(),
            geo_types::Geometry::MultiLineString(mls) => self
                .multi_line_string(
                    mls.iter()
                        .map(|ls| self.line_string_from_geo(ls).map(Geometry::from))
                        .collect::<Result<_, _>>()?,
                )?
                .into(),
            geo_types::Geometry::MultiPolygon(mp) => self
                .multi_polygon(
                    mp.iter()
                        .map(|p| self.polygon_from_geo(p).map(Geometry::from))
                        .collect::<Result<_, _>>()?,
                )?
                .into(),
            geo_types::Geometry::GeometryCollection(c) => self
                .collection(
                    c.iter()
                        .map(|g| self.from_geo(g))
                        .collect::<Result<_, _>>()?,
                )?
                .into(),
            geo_types::Geometry::Rect(r) => self.polygon_from_geo(&r.to_polygon())?.into(),
            geo_types::Geometry::Triangle(t) => self.polygon_from_geo(&t.to_polygon())?.into(),
        })
    }

    fn line_string_from_geo(
        &self,
        ls: &geo_types::LineString<f64>,
    ) -> Result<LineString, SfGeoError> {
        self.line_string_from_coords(ls.coords().map(|c| Coord::xy(c.x, c.y)).collect())
    }

    fn polygon_from_geo(&self, polygon: &geo_types::Polygon<f64>) -> Result<Polygon, SfGeoError> {
        self.polygon(
            self.line_string_from_geo(polygon.exterior())?,
            polygon
                .interiors()
                .iter()
                .map(|ring| self.line_string_from_geo(ring).map(Geometry::from))
                .collect::<Result<_, _>>()?,
        )
    }
}
