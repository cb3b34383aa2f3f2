//! Triangle primitive: geometry plus material.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Each triangle carries its diffuse reflectivity and emissivity, so the
//! scene is a flat list of one primitive kind.

use crate::aabb::Aabb;
use crate::random::Lfsr113;
use crate::ray::Ray;
use crate::vector::{clamp_non_negative, clamp_unit_open, Vec3};

/// Geometric slack used when enclosing triangles in bounds and when
/// testing hit points against octree cell bounds.
pub const TOLERANCE: f64 = 1.0 / 1024.0;

/// Determinant cutoff below which a ray counts as parallel to the plane.
const EPSILON: f64 = 1.0 / 1_048_576.0;

/// A triangle with Lambertian material.
///
/// Immutable once constructed; edges, tangent, normal and area are
/// precomputed. A degenerate (zero-area) triangle gets a zero normal and
/// tangent and can never be hit or emit.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// First vertex; the anchor of both stored edges.
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Edge v1 - v0.
    edge0: Vec3,
    /// Edge v2 - v0.
    edge3: Vec3,
    /// Diffuse reflectivity, each channel in [0, 1).
    pub reflectivity: Vec3,
    /// Emitted radiance, each channel >= 0.
    pub emissivity: Vec3,
    /// Unit surface tangent (along edge0).
    pub tangent: Vec3,
    /// Unit surface normal (right-handed around v0 v1 v2).
    pub normal: Vec3,
    /// Surface area.
    pub area: f64,
}

impl Triangle {
    /// Create a triangle from three vertices and its material vectors.
    ///
    /// Reflectivity is clamped into [0, 1) per channel and emissivity to
    /// be non-negative.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, reflectivity: Vec3, emissivity: Vec3) -> Self {
        let edge0 = v1 - v0;
        let edge1 = v2 - v1;
        let edge3 = v2 - v0;
        let pa2 = edge0.cross(edge1);
        Self {
            v0,
            v1,
            v2,
            edge0,
            edge3,
            reflectivity: clamp_unit_open(reflectivity),
            emissivity: clamp_non_negative(emissivity),
            tangent: edge0.normalize_or_zero(),
            normal: pa2.normalize_or_zero(),
            area: 0.5 * pa2.length(),
        }
    }

    /// Axis-aligned bound of the vertices, grown by [`TOLERANCE`] on
    /// every side so the octree never loses a hit to rounding at a cell
    /// face.
    pub fn bound(&self) -> Aabb {
        Aabb::point(self.v0)
            .union(&Aabb::point(self.v1))
            .union(&Aabb::point(self.v2))
            .expand(TOLERANCE)
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns the non-negative distance along the (unit) ray direction,
    /// or `None` on a miss. Back-face hits are reported; the surface
    /// model decides what to do with them.
    pub fn intersection(&self, ray: &Ray) -> Option<f64> {
        let p = ray.direction.cross(self.edge3);
        let det = self.edge0.dot(p);
        if det.abs() < EPSILON {
            return None;
        }

        let t = ray.origin - self.v0;
        let u = t.dot(p) / det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = t.cross(self.edge0);
        let v = ray.direction.dot(q) / det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let distance = self.edge3.dot(q) / det;
        (distance >= 0.0).then_some(distance)
    }

    /// Point drawn uniformly over the surface.
    ///
    /// Two draws are consumed; the square root turns the unit square into
    /// uniform barycentric coordinates.
    pub fn sample_point(&self, random: &mut Lfsr113) -> Vec3 {
        let sqr1 = random.real64().sqrt();
        let r2 = random.real64();
        let a = 1.0 - sqr1;
        let b = (1.0 - r2) * sqr1;
        self.v0 + a * self.edge0 + b * self.edge3
    }
}
