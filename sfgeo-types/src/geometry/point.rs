use crate::coord::{CartesianPoint2d, Coord};
use crate::factory::Factory;

/// A single position. An empty point has `NaN` planar ordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    factory: Factory,
    coord: Coord,
}

impl Point {
    pub(crate) fn new(factory: Factory, coord: Coord) -> Self {
        Self { factory, coord }
    }

    /// Factory that created the point.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Coordinate of the point.
    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// X ordinate.
    pub fn x(&self) -> f64 {
        self.coord.x
    }

    /// Y ordinate.
    pub fn y(&self) -> f64 {
        self.coord.y
    }

    /// Z ordinate, if the factory supports it.
    pub fn z(&self) -> Option<f64> {
        self.coord.z
    }

    /// Measure, if the factory supports it.
    pub fn m(&self) -> Option<f64> {
        self.coord.m
    }

    /// Returns true for the empty point.
    pub fn is_empty(&self) -> bool {
        self.coord.is_empty()
    }
}

impl CartesianPoint2d for Point {
    fn x(&self) -> f64 {
        self.coord.x
    }

    fn y(&self) -> f64 {
        self.coord.y
    }
}
