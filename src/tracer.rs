//! Path construction with next-event estimation.
//!
//! One radiance evaluation walks a single path: nearest hit, an explicit
//! emitter sample through a shadow ray, then a recursive continuation
//! until Russian roulette ends the walk. Emitters are seen directly only
//! on the first bounce; afterwards they are accounted for exclusively by
//! the next-event samples, so no light is counted twice.

use crate::random::Lfsr113;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::surface::SurfacePoint;
use crate::vector::Vec3;

/// Radiance evaluator bound to one scene.
pub struct RayTracer<'a> {
    scene: &'a Scene,
}

impl<'a> RayTracer<'a> {
    /// Evaluator over `scene`.
    pub fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// Radiance arriving at `ray.origin` from `ray.direction`.
    ///
    /// `last_hit` is the triangle the ray just left (`None` for camera
    /// rays); it is excluded from intersection so surfaces do not shadow
    /// themselves.
    pub fn radiance(&self, ray: &Ray, random: &mut Lfsr113, last_hit: Option<u32>) -> Vec3 {
        let Some((id, position)) = self.scene.intersection(ray, last_hit) else {
            return self.scene.default_emission(-ray.direction);
        };
        let surface = SurfacePoint::new(self.scene.triangle(id), id, position);

        let local_emission = if last_hit.is_none() {
            surface.emission(ray.origin, -ray.direction, false)
        } else {
            Vec3::ZERO
        };

        let illumination = self.sample_emitters(ray.direction, &surface, random);

        let reflection = match surface.next_direction(random, -ray.direction) {
            Some((direction, color)) => {
                let next = Ray::new(surface.position, direction);
                color * self.radiance(&next, random, Some(id))
            }
            None => Vec3::ZERO,
        };

        reflection + illumination + local_emission
    }

    /// Direct lighting at `surface` from one sampled emitter point.
    ///
    /// The shadow ray ignores the surface's own triangle; reaching the
    /// chosen emitter (or nothing at all, for emitters seen edge-on past
    /// all geometry) counts as unobstructed. The result is scaled by the
    /// emitter count to compensate the uniform selection.
    fn sample_emitters(
        &self,
        ray_direction: Vec3,
        surface: &SurfacePoint,
        random: &mut Lfsr113,
    ) -> Vec3 {
        let Some((emitter_position, emitter_id)) = self.scene.sample_emitter(random) else {
            return Vec3::ZERO;
        };
        let emit_direction = (emitter_position - surface.position).normalize_or_zero();

        let shadow_ray = Ray::new(surface.position, emit_direction);
        let occluder = self.scene.intersection(&shadow_ray, Some(surface.id));
        let unobstructed = occluder.map_or(true, |(hit_id, _)| hit_id == emitter_id);
        if !unobstructed {
            return Vec3::ZERO;
        }

        let emitter = SurfacePoint::new(self.scene.triangle(emitter_id), emitter_id, emitter_position);
        let emission_in = emitter.emission(surface.position, -emit_direction, true);
        surface.reflection(
            emit_direction,
            emission_in * self.scene.emitter_count() as f64,
            -ray_direction,
        )
    }
}
