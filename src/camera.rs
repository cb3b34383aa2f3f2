//! Camera: view frame construction and per-pixel ray generation.

use std::f64::consts::PI;

use crate::image::RenderImage;
use crate::random::Lfsr113;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::tracer::RayTracer;
use crate::vector::Vec3;

/// Smallest accepted view angle, degrees.
pub const VIEW_ANGLE_MIN: f64 = 10.0;
/// Largest accepted view angle, degrees.
pub const VIEW_ANGLE_MAX: f64 = 160.0;

/// Pinhole camera with a right-handed orthonormal frame.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    direction: Vec3,
    right: Vec3,
    up: Vec3,
    /// Horizontal view angle in radians.
    view_angle: f64,
}

impl Camera {
    /// Build a camera frame from a position, a view direction and a view
    /// angle in degrees.
    ///
    /// The direction is unitized, falling back to +z when zero. The
    /// frame's right and up are derived from world-up, with a secondary
    /// axis when the view direction itself is vertical. The angle is
    /// clamped to [[`VIEW_ANGLE_MIN`], [`VIEW_ANGLE_MAX`]].
    pub fn new(position: Vec3, direction: Vec3, angle_degrees: f64) -> Self {
        let direction = {
            let d = direction.normalize_or_zero();
            if d == Vec3::ZERO {
                Vec3::new(0.0, 0.0, 1.0)
            } else {
                d
            }
        };

        let mut right = Vec3::new(0.0, 1.0, 0.0).cross(direction).normalize_or_zero();
        if right == Vec3::ZERO {
            // view direction is vertical: pick a horizon axis by the
            // direction's sign so the frame stays right-handed
            let axis = Vec3::new(0.0, 0.0, if direction.y < 0.0 { 1.0 } else { -1.0 });
            right = axis.cross(direction).normalize_or_zero();
        }
        let up = direction.cross(right).normalize_or_zero();

        let view_angle = angle_degrees.clamp(VIEW_ANGLE_MIN, VIEW_ANGLE_MAX) * (PI / 180.0);
        Self { position, direction, right, up, view_angle }
    }

    /// Accumulate one frame: a single jittered path per pixel.
    ///
    /// Pixels run row-major, y outer, x inner; each pixel draws its two
    /// jitter values (x then y) before tracing, so renders are
    /// reproducible for a given generator state.
    pub fn frame(&self, scene: &Scene, random: &mut Lfsr113, image: &mut RenderImage) {
        let tracer = RayTracer::new(scene);
        let (width, height) = (image.width(), image.height());
        let aspect = f64::from(height) / f64::from(width);
        let tan_half = (self.view_angle * 0.5).tan();

        for y in 0..height {
            for x in 0..width {
                let x_coord = (f64::from(x) + random.real64()) * 2.0 / f64::from(width) - 1.0;
                let y_coord = (f64::from(y) + random.real64()) * 2.0 / f64::from(height) - 1.0;

                let offset = self.right * x_coord + self.up * (y_coord * aspect);
                let direction = (self.direction + offset * tan_half).normalize_or_zero();

                let radiance =
                    tracer.radiance(&Ray::new(self.position, direction), random, None);
                image.add_to_pixel(x, y, radiance);
            }
        }
    }
}
