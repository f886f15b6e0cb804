//! Simple Features geometry types.
//!
//! All geometries are immutable and are created by a [`Factory`]. [`Geometry`] wraps any of them and provides the
//! operations common to all types: type tag, dimension, casting between types and two kinds of equality.
//!
//! * [`Geometry::eql`] (also used by `==`) is structural: the same factory, the same type and the same coordinates
//!   in the same order.
//! * [`Geometry::equals`] is spatial: the geometries cover the same set of points, no matter how they are
//!   represented.

use std::ops::Deref;

use crate::coord::Coord;
use crate::factory::Factory;
use crate::geometry_type::GeometryType;
use crate::rect::Rect;

mod collection;
pub use collection::*;

mod line_string;
pub use line_string::*;

mod point;
pub use point::*;

mod polygon;
pub use polygon::*;

/// Any Simple Features geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Point.
    Point(Point),
    /// Line string.
    LineString(LineString),
    /// Line.
    Line(Line),
    /// Linear ring.
    LinearRing(LinearRing),
    /// Polygon.
    Polygon(Polygon),
    /// Heterogeneous collection.
    GeometryCollection(GeometryCollection),
    /// Multipoint.
    MultiPoint(MultiPoint),
    /// Multilinestring.
    MultiLineString(MultiLineString),
    /// Multipolygon.
    MultiPolygon(MultiPolygon),
}

impl Geometry {
    /// Factory that created the geometry.
    pub fn factory(&self) -> &Factory {
        match self {
            Geometry::Point(v) => v.factory(),
            Geometry::LineString(v) => v.factory(),
            Geometry::Line(v) => v.factory(),
            Geometry::LinearRing(v) => v.factory(),
            Geometry::Polygon(v) => v.factory(),
            Geometry::GeometryCollection(v) => v.factory(),
            Geometry::MultiPoint(v) => v.factory(),
            Geometry::MultiLineString(v) => v.factory(),
            Geometry::MultiPolygon(v) => v.factory(),
        }
    }

    /// Spatial reference id of the geometry's factory.
    pub fn srid(&self) -> i32 {
        self.factory().srid()
    }

    /// Type tag.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Line(_) => GeometryType::Line,
            Geometry::LinearRing(_) => GeometryType::LinearRing,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// Topological dimension: 0 for points, 1 for curves, 2 for surfaces. A collection has the largest dimension of
    /// its elements, or -1 if it has none.
    pub fn dimension(&self) -> i32 {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => 0,
            Geometry::LineString(_)
            | Geometry::Line(_)
            | Geometry::LinearRing(_)
            | Geometry::MultiLineString(_) => 1,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => 2,
            Geometry::GeometryCollection(c) => c
                .elements()
                .iter()
                .map(Geometry::dimension)
                .max()
                .unwrap_or(-1),
        }
    }

    /// Returns true if the geometry contains no points.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(v) => v.is_empty(),
            Geometry::LineString(v) => v.is_empty(),
            Geometry::Line(v) => v.is_empty(),
            Geometry::LinearRing(v) => v.is_empty(),
            Geometry::Polygon(v) => v.is_empty(),
            Geometry::GeometryCollection(v) => v.is_empty(),
            Geometry::MultiPoint(v) => v.is_empty(),
            Geometry::MultiLineString(v) => v.is_empty(),
            Geometry::MultiPolygon(v) => v.is_empty(),
        }
    }

    /// Bounding rectangle. `None` for empty geometries.
    pub fn envelope(&self) -> Option<Rect> {
        match self {
            Geometry::Point(v) if v.is_empty() => None,
            Geometry::Point(v) => Some(Rect::from_point(&v.coord())),
            Geometry::LineString(v) => v.envelope(),
            Geometry::Line(v) => v.envelope(),
            Geometry::LinearRing(v) => v.envelope(),
            Geometry::Polygon(v) => v.envelope(),
            Geometry::GeometryCollection(v) => v.envelope(),
            Geometry::MultiPoint(v) => v.envelope(),
            Geometry::MultiLineString(v) => v.envelope(),
            Geometry::MultiPolygon(v) => v.envelope(),
        }
    }

    /// Number of elements of a collection. Non-collection geometries count as a single element.
    pub fn num_geometries(&self) -> usize {
        match self {
            Geometry::GeometryCollection(v) => v.num_geometries(),
            Geometry::MultiPoint(v) => v.num_geometries(),
            Geometry::MultiLineString(v) => v.num_geometries(),
            Geometry::MultiPolygon(v) => v.num_geometries(),
            _ => 1,
        }
    }

    /// Element of a collection with the given index. For non-collection geometries index 0 returns the geometry
    /// itself.
    pub fn geometry_n(&self, n: usize) -> Option<Geometry> {
        match self {
            Geometry::GeometryCollection(v) => v.geometry_n(n).cloned(),
            Geometry::MultiPoint(v) => v.geometry_n(n),
            Geometry::MultiLineString(v) => v.geometry_n(n),
            Geometry::MultiPolygon(v) => v.geometry_n(n),
            _ if n == 0 => Some(self.clone()),
            _ => None,
        }
    }

    /// Line string view of any member of the line string family.
    pub fn as_line_string(&self) -> Option<&LineString> {
        match self {
            Geometry::LineString(v) => Some(v),
            Geometry::Line(v) => Some(v.deref()),
            Geometry::LinearRing(v) => Some(v.deref()),
            _ => None,
        }
    }

    /// Returns the point if the geometry is a point.
    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Geometry::Point(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the polygon if the geometry is a polygon.
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Geometry::Polygon(v) => Some(v),
            _ => None,
        }
    }

    /// Strict structural equality. Same as `==`.
    pub fn eql(&self, other: &Geometry) -> bool {
        self == other
    }

    /// Converts the geometry into another type without losing information.
    ///
    /// * Every type can be cast to itself.
    /// * A non-collection geometry can be wrapped into a `GeometryCollection` or a matching `Multi*` type.
    /// * Line string family members convert between each other if the target's constraints hold (two or zero
    ///   points for `Line`, closed and simple for `LinearRing`).
    /// * A collection converts into another collection type if all its elements fit, and into a singular type if it
    ///   has exactly one element that can be cast into that type.
    ///
    /// Returns `None` if the conversion is not possible.
    pub fn cast(&self, target: GeometryType) -> Option<Geometry> {
        if self.geometry_type() == target {
            return Some(self.clone());
        }

        let factory = self.factory();
        match target {
            GeometryType::GeometryCollection => {
                factory.collection(self.members()).ok().map(Geometry::from)
            }
            GeometryType::MultiPoint => {
                factory.multi_point(self.members()).ok().map(Geometry::from)
            }
            GeometryType::MultiLineString => factory
                .multi_line_string(self.members())
                .ok()
                .map(Geometry::from),
            GeometryType::MultiPolygon => factory
                .multi_polygon(self.members())
                .ok()
                .map(Geometry::from),
            _ if self.geometry_type().is_collection() => match self.members().as_slice() {
                [single] => single.cast(target),
                _ => None,
            },
            GeometryType::LineString => {
                let ls = self.as_line_string()?;
                factory
                    .line_string_from_coords(ls.coords().to_vec())
                    .ok()
                    .map(Geometry::from)
            }
            GeometryType::Line => {
                let ls = self.as_line_string()?;
                factory
                    .line_from_coords(ls.coords().to_vec())
                    .ok()
                    .map(Geometry::from)
            }
            GeometryType::LinearRing => {
                let ls = self.as_line_string()?;
                if !ls.is_closed() && !ls.is_empty() {
                    return None;
                }

                factory
                    .linear_ring_from_coords(ls.coords().to_vec())
                    .ok()
                    .map(Geometry::from)
            }
            GeometryType::Point | GeometryType::Polygon => None,
        }
    }

    /// Spatial equality: true if both geometries consist of the same points.
    ///
    /// Geometries are compared by their non-empty parts: points by planar position, curves by their vertices in
    /// either direction (closed curves from any starting vertex), polygons by exterior ring and the set of holes.
    /// Collections are equal if every part of one has an equal part in the other, so a collection of one element
    /// equals that element.
    pub fn equals(&self, other: &Geometry) -> bool {
        let mut a = Vec::new();
        let mut b = Vec::new();
        self.collect_atoms(&mut a);
        other.collect_atoms(&mut b);

        a.iter().all(|x| b.iter().any(|y| x.same_as(y)))
            && b.iter().all(|y| a.iter().any(|x| y.same_as(x)))
    }

    fn members(&self) -> Vec<Geometry> {
        match self {
            Geometry::GeometryCollection(v) => v.elements().to_vec(),
            Geometry::MultiPoint(v) => v.points().iter().cloned().map(Geometry::from).collect(),
            Geometry::MultiLineString(v) => v
                .line_strings()
                .iter()
                .cloned()
                .map(Geometry::from)
                .collect(),
            Geometry::MultiPolygon(v) => v.polygons().iter().cloned().map(Geometry::from).collect(),
            _ => vec![self.clone()],
        }
    }

    fn collect_atoms<'a>(&'a self, atoms: &mut Vec<Atom<'a>>) {
        match self {
            Geometry::Point(p) => {
                if !p.is_empty() {
                    atoms.push(Atom::Point(p.coord()));
                }
            }
            Geometry::LineString(_) | Geometry::Line(_) | Geometry::LinearRing(_) => {
                if let Some(ls) = self.as_line_string() {
                    if !ls.is_empty() {
                        atoms.push(Atom::Curve(ls.coords()));
                    }
                }
            }
            Geometry::Polygon(p) => {
                if !p.is_empty() {
                    atoms.push(Atom::Surface(p));
                }
            }
            Geometry::GeometryCollection(c) => {
                for element in c.elements() {
                    element.collect_atoms(atoms);
                }
            }
            Geometry::MultiPoint(mp) => {
                for p in mp.points().iter().filter(|p| !p.is_empty()) {
                    atoms.push(Atom::Point(p.coord()));
                }
            }
            Geometry::MultiLineString(mls) => {
                for ls in mls.line_strings().iter().filter(|ls| !ls.is_empty()) {
                    atoms.push(Atom::Curve(ls.coords()));
                }
            }
            Geometry::MultiPolygon(mp) => {
                for p in mp.polygons().iter().filter(|p| !p.is_empty()) {
                    atoms.push(Atom::Surface(p));
                }
            }
        }
    }
}

enum Atom<'a> {
    Point(Coord),
    Curve(&'a [Coord]),
    Surface(&'a Polygon),
}

impl Atom<'_> {
    fn same_as(&self, other: &Atom) -> bool {
        match (self, other) {
            (Atom::Point(a), Atom::Point(b)) => a.equal_2d(b),
            (Atom::Curve(a), Atom::Curve(b)) => same_curve(a, b),
            (Atom::Surface(a), Atom::Surface(b)) => {
                same_curve(a.exterior_ring().coords(), b.exterior_ring().coords())
                    && same_ring_set(a.interior_rings(), b.interior_rings())
                    && same_ring_set(b.interior_rings(), a.interior_rings())
            }
            _ => false,
        }
    }
}

fn same_ring_set(a: &[LinearRing], b: &[LinearRing]) -> bool {
    a.iter()
        .all(|x| b.iter().any(|y| same_curve(x.coords(), y.coords())))
}

fn same_curve(a: &[Coord], b: &[Coord]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let eq = |x: &Coord, y: &Coord| x.equal_2d(y);
    if a.iter().zip(b).all(|(x, y)| eq(x, y))
        || a.iter().zip(b.iter().rev()).all(|(x, y)| eq(x, y))
    {
        return true;
    }

    let closed = |c: &[Coord]| c.len() > 1 && eq(&c[0], &c[c.len() - 1]);
    if !closed(a) || !closed(b) {
        return false;
    }

    // Closed curves may start at any vertex; compare without the repeated closing point.
    let a = &a[..a.len() - 1];
    let b = &b[..b.len() - 1];
    let n = a.len();
    (0..n).any(|shift| {
        (0..n).all(|i| eq(&a[i], &b[(i + shift) % n]))
            || (0..n).all(|i| eq(&a[i], &b[(shift + n - i) % n]))
    })
}

impl From<Point> for Geometry {
    fn from(value: Point) -> Self {
        Self::Point(value)
    }
}

impl From<LineString> for Geometry {
    fn from(value: LineString) -> Self {
        Self::LineString(value)
    }
}

impl From<Line> for Geometry {
    fn from(value: Line) -> Self {
        Self::Line(value)
    }
}

impl From<LinearRing> for Geometry {
    fn from(value: LinearRing) -> Self {
        Self::LinearRing(value)
    }
}

impl From<Polygon> for Geometry {
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}

impl From<GeometryCollection> for Geometry {
    fn from(value: GeometryCollection) -> Self {
        Self::GeometryCollection(value)
    }
}

impl From<MultiPoint> for Geometry {
    fn from(value: MultiPoint) -> Self {
        Self::MultiPoint(value)
    }
}

impl From<MultiLineString> for Geometry {
    fn from(value: MultiLineString) -> Self {
        Self::MultiLineString(value)
    }
}

impl From<MultiPolygon> for Geometry {
    fn from(value: MultiPolygon) -> Self {
        Self::MultiPolygon(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> Factory {
        Factory::default()
    }

    fn ls(factory: &Factory, points: &[(f64, f64)]) -> Geometry {
        factory
            .line_string_from_coords(points.iter().map(|&p| p.into()).collect())
            .unwrap()
            .into()
    }

    fn triangle(factory: &Factory) -> Geometry {
        factory
            .polygon(ls(factory, &[(0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (0.0, 0.0)]), vec![])
            .unwrap()
            .into()
    }

    #[test]
    fn dimension() {
        let f = factory();
        assert_eq!(Geometry::from(f.point(0.0, 0.0)).dimension(), 0);
        assert_eq!(ls(&f, &[(0.0, 0.0), (1.0, 1.0)]).dimension(), 1);
        assert_eq!(triangle(&f).dimension(), 2);
        assert_eq!(Geometry::from(f.collection(vec![]).unwrap()).dimension(), -1);

        let mixed = f
            .collection(vec![f.point(0.0, 0.0).into(), triangle(&f)])
            .unwrap();
        assert_eq!(Geometry::from(mixed).dimension(), 2);
    }

    #[test]
    fn cast_point() {
        let f = factory();
        let point: Geometry = f.point(1.0, 2.0).into();

        assert_eq!(point.cast(GeometryType::Point), Some(point.clone()));
        let mp = point.cast(GeometryType::MultiPoint).unwrap();
        assert_eq!(mp.num_geometries(), 1);
        assert_eq!(mp.cast(GeometryType::Point), Some(point.clone()));
        assert_eq!(point.cast(GeometryType::LineString), None);
        assert_eq!(point.cast(GeometryType::MultiPolygon), None);
    }

    #[test]
    fn cast_line_string_family() {
        let f = factory();
        let open = ls(&f, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(open.cast(GeometryType::LinearRing), None);
        assert_eq!(open.cast(GeometryType::Line), None);

        let closed = ls(&f, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let ring = closed.cast(GeometryType::LinearRing).unwrap();
        assert_eq!(ring.geometry_type(), GeometryType::LinearRing);
        assert_eq!(ring.cast(GeometryType::LineString), Some(closed.clone()));

        let two = ls(&f, &[(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(
            two.cast(GeometryType::Line).map(|g| g.geometry_type()),
            Some(GeometryType::Line)
        );

        let mls = ring.cast(GeometryType::MultiLineString).unwrap();
        assert_eq!(mls.geometry_n(0), Some(closed));
    }

    #[test]
    fn cast_collections() {
        let f = factory();
        let points = f
            .collection(vec![f.point(0.0, 0.0).into(), f.point(1.0, 1.0).into()])
            .unwrap();
        let points: Geometry = points.into();

        assert_eq!(
            points.cast(GeometryType::MultiPoint).map(|g| g.geometry_type()),
            Some(GeometryType::MultiPoint)
        );
        assert_eq!(points.cast(GeometryType::Point), None);
        assert_eq!(points.cast(GeometryType::MultiPolygon), None);

        let single: Geometry = f.collection(vec![triangle(&f)]).unwrap().into();
        assert_eq!(single.cast(GeometryType::Polygon), Some(triangle(&f)));
    }

    #[test]
    fn eql_is_strict() {
        let f = factory();
        let a = ls(&f, &[(0.0, 0.0), (1.0, 1.0)]);
        let reversed = ls(&f, &[(1.0, 1.0), (0.0, 0.0)]);

        assert!(a.eql(&a.clone()));
        assert!(!a.eql(&reversed));
        assert!(a.equals(&reversed));

        let as_line = a.cast(GeometryType::Line).unwrap();
        assert!(!a.eql(&as_line));
        assert!(a.equals(&as_line));
    }

    #[test]
    fn equals_ignores_representation() {
        let f = factory();
        let point: Geometry = f.point(1.0, 1.0).into();
        let wrapped: Geometry = f.collection(vec![point.clone()]).unwrap().into();
        assert!(point.equals(&wrapped));
        assert!(!point.eql(&wrapped));

        let rotated: Geometry = f
            .polygon(ls(&f, &[(4.0, 0.0), (0.0, 4.0), (0.0, 0.0), (4.0, 0.0)]), vec![])
            .unwrap()
            .into();
        assert!(triangle(&f).equals(&rotated));

        let other_point: Geometry = f.point(1.0, 2.0).into();
        assert!(!point.equals(&other_point));
        assert!(!point.equals(&triangle(&f)));

        let empty: Geometry = f.empty_point().into();
        let empty_collection: Geometry = f.collection(vec![]).unwrap().into();
        assert!(empty.equals(&empty_collection));
    }

    #[test]
    fn envelope() {
        let f = factory();
        assert_eq!(Geometry::from(f.empty_point()).envelope(), None);
        assert_eq!(
            triangle(&f).envelope(),
            Some(Rect::new(0.0, 0.0, 4.0, 4.0))
        );
    }
}
