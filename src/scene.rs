//! Scene: triangle storage, emitter list, background emission.
//!
//! Triangles live in one flat array; the emitter list and the octree hold
//! indices into it (nothing else owns geometry). Immutable after
//! construction, so it can be shared freely.

use crate::random::Lfsr113;
use crate::ray::Ray;
use crate::spatial::SpatialIndex;
use crate::triangle::Triangle;
use crate::vector::{clamp_non_negative, clamp_unit_open, Vec3};

/// Hard cap on the number of triangles a scene may hold.
pub const MAX_TRIANGLES: usize = 1 << 24;

/// A renderable scene.
pub struct Scene {
    triangles: Vec<Triangle>,
    /// Indices of triangles that emit: non-zero emissivity and positive
    /// area, in stream order.
    emitters: Vec<u32>,
    sky_emission: Vec3,
    ground_reflection: Vec3,
    index: SpatialIndex,
}

impl Scene {
    /// Assemble a scene and build its spatial index.
    ///
    /// `eye` is the camera position; the index's root bound must enclose
    /// it for traversal to work. Excess triangles beyond
    /// [`MAX_TRIANGLES`] are dropped.
    pub fn new(
        sky_emission: Vec3,
        ground_reflection: Vec3,
        mut triangles: Vec<Triangle>,
        eye: Vec3,
    ) -> Self {
        triangles.truncate(MAX_TRIANGLES);
        let emitters = triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.emissivity != Vec3::ZERO && t.area > 0.0)
            .map(|(i, _)| i as u32)
            .collect();
        let index = SpatialIndex::new(eye, &triangles);
        Self {
            triangles,
            emitters,
            sky_emission: clamp_non_negative(sky_emission),
            ground_reflection: clamp_unit_open(ground_reflection),
            index,
        }
    }

    /// Number of triangles in the scene.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of emitting triangles.
    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Triangle by index.
    pub fn triangle(&self, id: u32) -> &Triangle {
        &self.triangles[id as usize]
    }

    /// Nearest triangle hit by `ray`, skipping `last_hit`.
    pub fn intersection(&self, ray: &Ray, last_hit: Option<u32>) -> Option<(u32, Vec3)> {
        self.index.intersection(ray, last_hit, ray.origin, &self.triangles)
    }

    /// Uniform point on a uniformly chosen emitter.
    ///
    /// Consumes one draw for the emitter choice and two for the surface
    /// point; with no emitters present nothing is drawn.
    pub fn sample_emitter(&self, random: &mut Lfsr113) -> Option<(Vec3, u32)> {
        if self.emitters.is_empty() {
            return None;
        }
        let count = self.emitters.len();
        let chosen = ((random.real64() * count as f64) as usize).min(count - 1);
        let id = self.emitters[chosen];
        Some((self.triangles[id as usize].sample_point(random), id))
    }

    /// Radiance for a ray that left the scene.
    ///
    /// `back_direction` points back along the ray. Downward-looking rays
    /// see the sky directly; upward-looking ones see it reflected off the
    /// ground.
    pub fn default_emission(&self, back_direction: Vec3) -> Vec3 {
        if back_direction.y < 0.0 {
            self.sky_emission
        } else {
            self.sky_emission * self.ground_reflection
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter_triangle(z: f64, emissivity: Vec3) -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(0.0, 1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::ZERO,
            emissivity,
        )
    }

    #[test]
    fn emitters_exclude_dark_and_degenerate_triangles() {
        let dark = Triangle::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::splat(0.5),
            Vec3::ZERO,
        );
        let degenerate = Triangle::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::ONE,
        );
        let lit = emitter_triangle(-3.0, Vec3::ONE);
        let scene = Scene::new(
            Vec3::ZERO,
            Vec3::ZERO,
            vec![dark, degenerate, lit],
            Vec3::ZERO,
        );
        assert_eq!(scene.emitter_count(), 1);
        let mut rng = Lfsr113::new();
        let (_, id) = scene.sample_emitter(&mut rng).unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn sampling_with_no_emitters_draws_nothing() {
        let scene = Scene::new(Vec3::ONE, Vec3::ZERO, Vec::new(), Vec3::ZERO);
        let mut rng = Lfsr113::new();
        let mut untouched = rng.clone();
        assert!(scene.sample_emitter(&mut rng).is_none());
        assert_eq!(untouched.int32u(), rng.int32u());
    }

    #[test]
    fn default_emission_splits_on_direction() {
        let scene = Scene::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::splat(0.5),
            Vec::new(),
            Vec3::ZERO,
        );
        // ray going up: back direction points down
        assert_eq!(
            scene.default_emission(Vec3::new(0.0, -1.0, 0.0)),
            Vec3::new(1.0, 2.0, 3.0)
        );
        // ray going down: sky reflected off the ground
        assert_eq!(
            scene.default_emission(Vec3::new(0.0, 1.0, 0.0)),
            Vec3::new(0.5, 1.0, 1.5)
        );
    }

    #[test]
    fn intersection_delegates_to_the_index() {
        let scene = Scene::new(
            Vec3::ZERO,
            Vec3::ZERO,
            vec![emitter_triangle(-2.0, Vec3::ONE)],
            Vec3::ZERO,
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let (id, position) = scene.intersection(&ray, None).unwrap();
        assert_eq!(id, 0);
        assert!((position.z + 2.0).abs() < 1e-9);
        assert!(scene.intersection(&ray, Some(0)).is_none());
    }
}
