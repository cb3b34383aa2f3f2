//! Axis-aligned bounding boxes.
//!
//! The octree stores one box per node; triangles expose an expanded box
//! around their vertices. Boxes are closed at the lower corner and keep
//! the component-wise `min <= max` invariant.

use crate::vector::Vec3;

/// Axis-aligned box given by two corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Lower corner (component-wise minimum).
    pub min: Vec3,
    /// Upper corner (component-wise maximum).
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning the two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box containing a single point.
    pub fn point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box enclosing both operands.
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Box grown by `amount` on every face.
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// Extend the upper corner so every edge equals the largest axial
    /// extent. The lower corner is unchanged.
    pub fn cubify(&self) -> Self {
        let edge = (self.max - self.min).max_element();
        Self {
            min: self.min,
            max: self.max.max(self.min + Vec3::splat(edge)),
        }
    }

    /// Component-wise midpoint.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Is `p` inside the box, allowing `tolerance` slack on every face?
    pub fn contains(&self, p: Vec3, tolerance: f64) -> bool {
        let t = Vec3::splat(tolerance);
        (self.min - p).cmple(t).all() && (p - self.max).cmple(t).all()
    }

    /// Octant overlap test used by the octree build: closed against this
    /// box's lower faces, open against its upper faces, so a shared
    /// subdivision plane assigns a boundary triangle to the upper cell.
    pub fn overlaps(&self, item: &Aabb) -> bool {
        item.min.cmplt(self.max).all() && item.max.cmpge(self.min).all()
    }

    /// Bound of octant `index` (bit i of the index selects the upper half
    /// of axis i) after splitting every axis at the midpoint.
    pub fn octant(&self, index: usize) -> Self {
        let mid = self.center();
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            if (index >> axis) & 1 == 1 {
                min[axis] = mid[axis];
            } else {
                max[axis] = mid[axis];
            }
        }
        Self { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_encloses_both() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::point(Vec3::new(-2.0, 0.5, 3.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(u.max, Vec3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn cubify_produces_equal_edges() {
        let b = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 0.5)).cubify();
        assert_eq!(b.max - b.min, Vec3::splat(2.0));
    }

    #[test]
    fn contains_honors_tolerance() {
        let b = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(b.contains(Vec3::splat(0.5), 0.0));
        assert!(!b.contains(Vec3::new(1.1, 0.5, 0.5), 0.01));
        assert!(b.contains(Vec3::new(1.1, 0.5, 0.5), 0.2));
    }

    #[test]
    fn octants_partition_the_cube() {
        let b = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let o5 = b.octant(0b101); // high x, low y, high z
        assert_eq!(o5.min, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(o5.max, Vec3::new(2.0, 1.0, 2.0));
    }

    #[test]
    fn overlap_is_half_open_on_the_split_plane() {
        let low = Aabb::new(Vec3::ZERO, Vec3::splat(1.0));
        let high = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let on_plane = Aabb::new(Vec3::new(1.0, 0.2, 0.2), Vec3::new(1.0, 0.8, 0.8));
        assert!(!low.overlaps(&on_plane));
        assert!(high.overlaps(&on_plane));
    }
}
