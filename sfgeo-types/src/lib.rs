//! OGC Simple Features geometry model.
//!
//! Geometries are created by a [`Factory`], which fixes the SRID and the supported ordinates of everything it
//! creates. Line strings and rings are validated on construction with a sweep-line segment intersector
//! ([`SweeplineIntersector`]), which is also usable on its own.

mod coord;
pub use coord::*;

pub mod error;

mod factory;
pub use factory::*;

mod geometry;
pub use geometry::*;

mod geometry_type;
pub use geometry_type::*;

pub mod orient;
pub mod rect;
pub use rect::Rect;

pub mod segment;
pub use segment::Segment;

pub mod sweepline;
pub use sweepline::{Intersection, SweepEvent, SweepEventKind, SweeplineIntersector};

#[cfg(feature = "geo-types")]
pub mod geo_interop;
