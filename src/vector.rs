//! Vector math for the renderer.
//!
//! Radiance, reflectivity, positions and directions are all `glam::DVec3`;
//! rendering accumulates many small contributions, so the f64 variant is
//! used throughout.

use glam::DVec3;

/// 3-vector of doubles used for geometry and linear RGB radiance alike.
pub type Vec3 = DVec3;

/// Clamp every component into `[0, 1 - epsilon)`.
///
/// Reflectivity must stay strictly below 1 in each channel or Russian
/// roulette can fail to terminate a path.
pub fn clamp_unit_open(v: Vec3) -> Vec3 {
    v.clamp(Vec3::ZERO, Vec3::splat(1.0 - f64::EPSILON))
}

/// Clamp every component to be non-negative.
pub fn clamp_non_negative(v: Vec3) -> Vec3 {
    v.max(Vec3::ZERO)
}
