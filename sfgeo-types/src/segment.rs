use crate::coord::{CartesianPoint2d, Coord};
use serde::{Deserialize, Serialize};

/// A directed straight line segment from `s` to `e`.
///
/// Only the planar part of the end points takes part in the predicates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    s: Coord,
    e: Coord,
}

impl Segment {
    /// Creates a new segment.
    pub fn new(s: impl Into<Coord>, e: impl Into<Coord>) -> Self {
        Self {
            s: s.into(),
            e: e.into(),
        }
    }

    /// Start point.
    pub fn s(&self) -> Coord {
        self.s
    }

    /// End point.
    pub fn e(&self) -> Coord {
        self.e
    }

    /// `e.x - s.x`
    pub fn dx(&self) -> f64 {
        self.e.x - self.s.x
    }

    /// `e.y - s.y`
    pub fn dy(&self) -> f64 {
        self.e.y - self.s.y
    }

    /// Returns true if the segment starts and ends at the same point.
    pub fn is_degenerate(&self) -> bool {
        self.s.equal_2d(&self.e)
    }

    /// Signed area of the parallelogram built on `e - s` and `point - s`.
    ///
    /// Zero means the point is collinear with the segment, positive values mean it lies to the left of the segment,
    /// negative to the right.
    pub fn side(&self, point: &impl CartesianPoint2d) -> f64 {
        self.dx() * (point.y() - self.s.y) - self.dy() * (point.x() - self.s.x)
    }

    /// Scalar projection of `point - s` onto the segment direction, in units of the segment length. The value is not
    /// clamped, so points before `s` give negative values and points after `e` give values larger than 1.
    ///
    /// Returns `None` for degenerate segments.
    pub fn tproj(&self, point: &impl CartesianPoint2d) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }

        let (dx, dy) = (self.dx(), self.dy());
        Some((dx * (point.x() - self.s.x) + dy * (point.y() - self.s.y)) / (dx * dx + dy * dy))
    }

    /// Returns true if the point lies on the segment, end points included.
    pub fn contains_point(&self, point: &Coord) -> bool {
        if self.s.equal_2d(point) || self.e.equal_2d(point) {
            return true;
        }
        if self.is_degenerate() || self.side(point) != 0.0 {
            return false;
        }

        // Measure along the dominant axis so that the divisor is never close to zero.
        let (dx, dy) = (self.dx(), self.dy());
        let t = if dx.abs() > dy.abs() {
            (point.x - self.s.x) / dx
        } else {
            (point.y - self.s.y) / dy
        };

        (0.0..=1.0).contains(&t)
    }

    /// Returns true if the segment has at least one common point with the `other` segment.
    pub fn intersects_segment(&self, other: &Segment) -> bool {
        self.segment_intersection(other).is_some()
    }

    /// Returns a common point of the two segments, if there is one.
    ///
    /// Collinear segments that overlap along a range produce a single point of that range: the first of
    /// `other.s`, `other.e`, `self.s`, `self.e` that lies on the opposite segment.
    pub fn segment_intersection(&self, other: &Segment) -> Option<Coord> {
        let (dx1, dy1) = (self.dx(), self.dy());
        let (dx2, dy2) = (other.dx(), other.dy());
        let denom = dx1 * dy2 - dy1 * dx2;

        if denom == 0.0 {
            if self.side(&other.s) != 0.0 || other.side(&self.s) != 0.0 {
                return None;
            }

            return [other.s, other.e]
                .into_iter()
                .find(|p| self.contains_point(p))
                .or_else(|| [self.s, self.e].into_iter().find(|p| other.contains_point(p)));
        }

        // Non-parallel segments meet at most once, so a shared end point is the answer.
        for p in [self.s, self.e] {
            if p.equal_2d(&other.s) || p.equal_2d(&other.e) {
                return Some(p);
            }
        }

        let wx = other.s.x - self.s.x;
        let wy = other.s.y - self.s.y;
        let ta = (wx * dy2 - wy * dx2) / denom;
        let tb = (wx * dy1 - wy * dx1) / denom;

        if (0.0..=1.0).contains(&ta) && (0.0..=1.0).contains(&tb) {
            Some(Coord::xy(self.s.x + ta * dx1, self.s.y + ta * dy1))
        } else {
            None
        }
    }
}
