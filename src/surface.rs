//! Local surface interaction model.
//!
//! A `SurfacePoint` is an ephemeral view of one position on one triangle:
//! it answers what the surface emits toward a point, how it reflects
//! incoming radiance, and where a path continues. The material is ideal
//! Lambertian diffuse.

use std::f64::consts::PI;

use crate::random::Lfsr113;
use crate::triangle::Triangle;
use crate::vector::Vec3;

/// Floor applied to the squared emitter distance, so next-event samples
/// taken almost on the emitter do not blow up the 1/r^2 term.
const DISTANCE2_MIN: f64 = 1e-6;

/// A position on a triangle's surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint<'a> {
    /// The triangle the point lies on.
    pub triangle: &'a Triangle,
    /// The triangle's index in the scene, for last-hit exclusion.
    pub id: u32,
    /// World-space position on the surface.
    pub position: Vec3,
}

impl<'a> SurfacePoint<'a> {
    /// View of `position` on `triangle` (scene index `id`).
    pub fn new(triangle: &'a Triangle, id: u32, position: Vec3) -> Self {
        Self { triangle, id, position }
    }

    /// Radiance emitted toward `to_position`.
    ///
    /// `out_direction` is the unit direction from the surface to the
    /// receiver; a triangle back-faced against it emits nothing. With
    /// `is_solid_angle` the emission is scaled by the solid angle the
    /// triangle subtends at the receiver (next-event form); without it
    /// the raw emissivity is returned (direct-view form).
    pub fn emission(&self, to_position: Vec3, out_direction: Vec3, is_solid_angle: bool) -> Vec3 {
        let ray = to_position - self.position;
        let distance2 = ray.length_squared();
        let cos_area = out_direction.dot(self.triangle.normal) * self.triangle.area;
        if cos_area <= 0.0 {
            return Vec3::ZERO;
        }
        let solid_angle = if is_solid_angle {
            cos_area / distance2.max(DISTANCE2_MIN)
        } else {
            1.0
        };
        self.triangle.emissivity * solid_angle
    }

    /// Incoming radiance reflected toward `out_direction`.
    ///
    /// Both directions point away from the surface. If they are on
    /// opposite sides of the face nothing is reflected. The outgoing
    /// cosine is deliberately absent: it cancels against the
    /// cosine-weighted continuation sampling in the estimator.
    pub fn reflection(&self, in_direction: Vec3, in_radiance: Vec3, out_direction: Vec3) -> Vec3 {
        let in_dot = in_direction.dot(self.triangle.normal);
        let out_dot = out_direction.dot(self.triangle.normal);
        if (in_dot < 0.0) != (out_dot < 0.0) {
            return Vec3::ZERO;
        }
        in_radiance * self.triangle.reflectivity * (in_dot.abs() / PI)
    }

    /// Sample a continuation direction, or terminate the path.
    ///
    /// Russian roulette on the mean reflectivity decides survival; a
    /// surviving path gets a cosine-weighted direction on the hemisphere
    /// facing `in_direction` and the roulette-rescaled reflectivity as
    /// its unbiased throughput weight.
    pub fn next_direction(
        &self,
        random: &mut Lfsr113,
        in_direction: Vec3,
    ) -> Option<(Vec3, Vec3)> {
        let reflectivity = self.triangle.reflectivity;
        let mean = (reflectivity.x + reflectivity.y + reflectivity.z) / 3.0;
        if random.real64() >= mean {
            return None;
        }
        let color = reflectivity / mean;

        let phi = 2.0 * PI * random.real64();
        let r2 = random.real64();
        let s = r2.sqrt();
        let (x, y, z) = (phi.cos() * s, phi.sin() * s, (1.0 - r2).sqrt());

        let normal = if self.triangle.normal.dot(in_direction) >= 0.0 {
            self.triangle.normal
        } else {
            -self.triangle.normal
        };
        let tangent = self.triangle.tangent;
        let direction = tangent * x + normal.cross(tangent) * y + normal * z;
        Some((direction, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_triangle() -> Triangle {
        // normal +z, area 2
        Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::splat(0.5),
            Vec3::new(2.0, 2.0, 2.0),
        )
    }

    #[test]
    fn emission_is_zero_behind_the_face() {
        let tri = lit_triangle();
        let p = SurfacePoint::new(&tri, 0, Vec3::ZERO);
        let behind = p.emission(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, -1.0), false);
        assert_eq!(behind, Vec3::ZERO);
    }

    #[test]
    fn direct_view_emission_is_raw_emissivity() {
        let tri = lit_triangle();
        let p = SurfacePoint::new(&tri, 0, Vec3::ZERO);
        let seen = p.emission(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0), false);
        assert_eq!(seen, Vec3::splat(2.0));
    }

    #[test]
    fn solid_angle_emission_falls_off_with_distance() {
        let tri = lit_triangle();
        let p = SurfacePoint::new(&tri, 0, Vec3::ZERO);
        let near = p.emission(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 1.0), true);
        let far = p.emission(Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 0.0, 1.0), true);
        assert!((near.x / far.x - 4.0).abs() < 1e-12);
        // cos * area / d^2 at d = 2
        assert!((near.x - 2.0 * 2.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn reflection_requires_same_side_directions() {
        let tri = lit_triangle();
        let p = SurfacePoint::new(&tri, 0, Vec3::ZERO);
        let radiance = Vec3::ONE;
        let above_in = Vec3::new(0.0, 0.0, 1.0);
        let above_out = Vec3::new(0.6, 0.0, 0.8);
        let below_out = Vec3::new(0.6, 0.0, -0.8);
        let same = p.reflection(above_in, radiance, above_out);
        assert!((same.x - 0.5 / PI).abs() < 1e-12);
        assert_eq!(p.reflection(above_in, radiance, below_out), Vec3::ZERO);
    }

    #[test]
    fn black_surface_always_terminates() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::ZERO,
            Vec3::ZERO,
        );
        let p = SurfacePoint::new(&tri, 0, Vec3::ZERO);
        let mut rng = Lfsr113::new();
        for _ in 0..100 {
            assert!(p.next_direction(&mut rng, Vec3::new(0.0, 0.0, 1.0)).is_none());
        }
    }

    #[test]
    fn continuations_are_unit_and_on_the_facing_side() {
        let tri = lit_triangle();
        let p = SurfacePoint::new(&tri, 0, Vec3::ZERO);
        let mut rng = Lfsr113::new();
        let in_direction = Vec3::new(0.0, 0.0, -1.0); // viewer below the face
        let mut survived = 0;
        for _ in 0..500 {
            if let Some((direction, color)) = p.next_direction(&mut rng, in_direction) {
                survived += 1;
                assert!((direction.length() - 1.0).abs() < 1e-9);
                assert!(direction.z <= 0.0);
                assert_eq!(color, Vec3::ONE); // 0.5 / mean(0.5)
            }
        }
        assert!(survived > 0);
    }
}
