use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

/// A single position: planar `x`/`y` with optional `z` (elevation) and `m` (measure).
///
/// Coordinates are compared ordinate by ordinate. Two `NaN` ordinates are considered equal, so that empty points
/// (stored with `NaN` x and y) compare equal to each other.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct Coord {
    /// X ordinate.
    pub x: f64,
    /// Y ordinate.
    pub y: f64,
    /// Z ordinate, if present.
    pub z: Option<f64>,
    /// Measure, if present.
    pub m: Option<f64>,
}

impl Coord {
    /// Creates a 2d coordinate.
    pub const fn xy(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    /// Creates a coordinate with `z`.
    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    /// Creates a coordinate with a measure.
    pub const fn xym(x: f64, y: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: Some(m),
        }
    }

    /// Creates a coordinate with both `z` and a measure.
    pub const fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: Some(m),
        }
    }

    /// Coordinate of an empty point.
    pub const fn empty() -> Self {
        Self::xy(f64::NAN, f64::NAN)
    }

    /// Returns true if this is the coordinate of an empty point.
    pub fn is_empty(&self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }

    /// Returns true if the planar parts of the coordinates are the same.
    pub fn equal_2d(&self, other: &Coord) -> bool {
        ordinate_eq(self.x, other.x) && ordinate_eq(self.y, other.y)
    }

    /// Returns a copy of the coordinate with `z` and `m` set (or dropped) according to the given capabilities.
    /// Missing but supported ordinates become `0.0`.
    pub fn normalized(&self, has_z: bool, has_m: bool) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: has_z.then(|| self.z.unwrap_or(0.0)),
            m: has_m.then(|| self.m.unwrap_or(0.0)),
        }
    }
}

fn ordinate_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn optional_ordinate_eq(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => ordinate_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for Coord {
    fn eq(&self, other: &Self) -> bool {
        self.equal_2d(other)
            && optional_ordinate_eq(self.z, other.z)
            && optional_ordinate_eq(self.m, other.m)
    }
}

impl AbsDiffEq for Coord {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let opt_eq = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => a.abs_diff_eq(&b, epsilon),
            (None, None) => true,
            _ => false,
        };

        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && opt_eq(self.z, other.z)
            && opt_eq(self.m, other.m)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self::xy(x, y)
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::xy(x, y)
    }
}

/// Anything that has planar cartesian coordinates.
pub trait CartesianPoint2d {
    /// X coordinate.
    fn x(&self) -> f64;
    /// Y coordinate.
    fn y(&self) -> f64;
}

impl CartesianPoint2d for Coord {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}
