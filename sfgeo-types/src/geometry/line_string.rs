use std::ops::Deref;

use crate::coord::Coord;
use crate::error::SfGeoError;
use crate::factory::Factory;
use crate::geometry::Point;
use crate::orient::Orientation;
use crate::rect::Rect;
use crate::segment::Segment;
use crate::sweepline::{chain_segments, is_simple_chain};

/// Curve with linear interpolation between its points.
#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    factory: Factory,
    coords: Vec<Coord>,
}

impl LineString {
    pub(crate) fn new(factory: Factory, coords: Vec<Coord>) -> Result<Self, SfGeoError> {
        if coords.len() == 1 {
            return Err(SfGeoError::invalid(
                "LineString cannot have exactly one point",
            ));
        }

        Ok(Self { factory, coords })
    }

    /// Factory that created the line string.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Coordinates of the points.
    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    /// Number of points.
    pub fn num_points(&self) -> usize {
        self.coords.len()
    }

    /// Point with the given index.
    pub fn point_n(&self, n: usize) -> Option<Point> {
        self.coords
            .get(n)
            .map(|coord| Point::new(self.factory.clone(), *coord))
    }

    /// Iterates over the points of the line string.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.coords
            .iter()
            .map(|coord| Point::new(self.factory.clone(), *coord))
    }

    /// First point.
    pub fn start_point(&self) -> Option<Point> {
        self.point_n(0)
    }

    /// Last point.
    pub fn end_point(&self) -> Option<Point> {
        self.point_n(self.coords.len().checked_sub(1)?)
    }

    /// Returns true if there are no points.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Returns true if the line string is not empty and starts where it ends.
    pub fn is_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => first.equal_2d(last),
            _ => false,
        }
    }

    /// Returns true if the line string does not pass through the same point twice, except for the start and end
    /// points of a closed line string.
    pub fn is_simple(&self) -> bool {
        is_simple_chain(&self.coords)
    }

    /// Returns true if the line string is closed and simple.
    pub fn is_ring(&self) -> bool {
        self.is_closed() && self.is_simple()
    }

    /// Segments between consecutive points.
    pub fn segments(&self) -> Vec<Segment> {
        chain_segments(&self.coords)
    }

    /// Bounding rectangle.
    pub fn envelope(&self) -> Option<Rect> {
        Rect::from_points(self.coords.iter())
    }
}

/// Line string with either zero or exactly two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Line(LineString);

impl Line {
    pub(crate) fn new(factory: Factory, coords: Vec<Coord>) -> Result<Self, SfGeoError> {
        if !coords.is_empty() && coords.len() != 2 {
            return Err(SfGeoError::invalid(format!(
                "Line must have 0 or 2 points, got {}",
                coords.len()
            )));
        }

        Ok(Self(LineString { factory, coords }))
    }

    pub(crate) fn from_ends(factory: Factory, start: Coord, end: Coord) -> Self {
        Self(LineString {
            factory,
            coords: vec![start, end],
        })
    }

    /// Converts the line into a plain line string.
    pub fn into_line_string(self) -> LineString {
        self.0
    }
}

impl Deref for Line {
    type Target = LineString;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Closed simple line string.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRing(LineString);

impl LinearRing {
    pub(crate) fn new(factory: Factory, mut coords: Vec<Coord>) -> Result<Self, SfGeoError> {
        if coords.len() > 1 {
            let first = coords[0];
            if !first.equal_2d(&coords[coords.len() - 1]) {
                coords.push(first);
            }
        }

        let line_string = LineString::new(factory, coords)?;
        if !line_string.is_empty() && !line_string.is_ring() {
            return Err(SfGeoError::invalid(
                "LinearRing must be closed and must not intersect itself",
            ));
        }

        Ok(Self(line_string))
    }

    /// Converts the ring into a plain line string.
    pub fn into_line_string(self) -> LineString {
        self.0
    }

    /// Winding direction of the ring. `None` for an empty ring.
    pub fn orientation(&self) -> Option<Orientation> {
        let coords = &self.0.coords[..self.0.coords.len().checked_sub(1)?];
        let n = coords.len();

        // The lowest-leftmost vertex is always convex.
        let (i, _) = coords
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))?;

        Some(Orientation::triplet(
            &coords[(i + n - 1) % n],
            &coords[i],
            &coords[(i + 1) % n],
        ))
    }
}

impl Deref for LinearRing {
    type Target = LineString;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use crate::orient::Orientation;
    use crate::{Coord, Factory, Point};

    fn coords(points: &[(f64, f64)]) -> Vec<Coord> {
        points.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn accessors() {
        let factory = Factory::default();
        let ls = factory
            .line_string_from_coords(coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]))
            .unwrap();

        assert_eq!(ls.num_points(), 3);
        assert_eq!(ls.point_n(1).map(|p| p.x()), Some(1.0));
        assert_eq!(ls.point_n(3), None);
        assert_eq!(ls.end_point().map(|p| p.coord()), Some(Coord::xy(1.0, 1.0)));
        assert_eq!(ls.points().collect::<Vec<Point>>().len(), 3);
        assert!(!ls.is_closed());
        assert!(ls.is_simple());
        assert_eq!(ls.segments().len(), 2);

        let empty = factory.line_string_from_coords(vec![]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.start_point(), None);
        assert!(!empty.is_closed());
        assert_eq!(empty.envelope(), None);
    }

    #[test]
    fn self_crossing_line_string_is_not_simple() {
        let factory = Factory::default();
        let ls = factory
            .line_string_from_coords(coords(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]))
            .unwrap();

        assert!(!ls.is_simple());
        assert!(!ls.is_ring());
    }

    #[test]
    fn line_requires_zero_or_two_points() {
        let factory = Factory::default();
        assert!(factory.line_from_coords(vec![]).is_ok());
        assert!(factory
            .line_from_coords(coords(&[(0.0, 0.0), (1.0, 1.0)]))
            .is_ok());
        assert!(factory
            .line_from_coords(coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]))
            .is_err());
    }

    #[test]
    fn closed_ring_is_kept_as_is() {
        let factory = Factory::default();
        let ring = factory
            .linear_ring_from_coords(coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]))
            .unwrap();

        assert_eq!(ring.num_points(), 4);
        assert!(ring.is_ring());
        assert_eq!(ring.clone().into_line_string().num_points(), 4);
        assert_eq!(ring.orientation(), Some(Orientation::Counterclockwise));

        let clockwise = factory
            .linear_ring_from_coords(coords(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]))
            .unwrap();
        assert_eq!(clockwise.orientation(), Some(Orientation::Clockwise));
        assert_eq!(factory.linear_ring(vec![]).unwrap().orientation(), None);
    }

    #[test]
    fn one_point_ring_is_invalid() {
        let factory = Factory::default();
        assert!(factory
            .linear_ring_from_coords(coords(&[(0.0, 0.0)]))
            .is_err());
    }
}
