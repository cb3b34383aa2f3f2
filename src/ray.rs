//! Ray representation.
//!
//! A ray is r(t) = origin + t * direction. The tracer always constructs
//! rays with unit directions, so t is a geometric distance.

use crate::vector::Vec3;

/// Ray in 3D space defined by origin and unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Starting point of the ray in world coordinates.
    pub origin: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with origin and direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at distance t along the ray.
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + t * self.direction
    }
}
