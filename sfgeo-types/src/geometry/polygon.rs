use crate::error::SfGeoError;
use crate::factory::Factory;
use crate::geometry::LinearRing;
use crate::rect::Rect;

/// Planar surface bounded by an exterior ring, with optional holes.
///
/// A polygon with an empty exterior ring is the empty polygon. Only the simplicity of each ring is checked locally;
/// the relations between the rings are checked by the [`TopologyEngine`](crate::TopologyEngine) of the factory, if
/// one is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    factory: Factory,
    exterior: LinearRing,
    interiors: Vec<LinearRing>,
}

impl Polygon {
    pub(crate) fn new(
        factory: Factory,
        exterior: LinearRing,
        interiors: Vec<LinearRing>,
    ) -> Result<Self, SfGeoError> {
        if exterior.is_empty() && interiors.iter().any(|ring| !ring.is_empty()) {
            return Err(SfGeoError::invalid(
                "Polygon with an empty exterior ring cannot have holes",
            ));
        }

        let polygon = Self {
            factory,
            exterior,
            interiors,
        };

        if let Some(engine) = polygon.factory.topology_engine() {
            engine.validate_polygon(&polygon)?;
        }

        Ok(polygon)
    }

    /// Factory that created the polygon.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Exterior ring.
    pub fn exterior_ring(&self) -> &LinearRing {
        &self.exterior
    }

    /// Holes.
    pub fn interior_rings(&self) -> &[LinearRing] {
        &self.interiors
    }

    /// Number of holes.
    pub fn num_interior_rings(&self) -> usize {
        self.interiors.len()
    }

    /// Hole with the given index.
    pub fn interior_ring_n(&self, n: usize) -> Option<&LinearRing> {
        self.interiors.get(n)
    }

    /// Exterior ring followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &LinearRing> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }

    /// Returns true if the exterior ring is empty.
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    /// Bounding rectangle of the exterior ring.
    pub fn envelope(&self) -> Option<Rect> {
        self.exterior.envelope()
    }
}
