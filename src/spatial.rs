//! Octree spatial index over the scene's triangles.
//!
//! Nodes are a tagged sum: a branch owns eight optional children, a leaf
//! owns a short list of triangle indices into the scene's flat triangle
//! array. Each node stores its exact bound; a triangle straddling cell
//! faces appears in several leaves, and leaves reject hit points outside
//! their own bound, so no phantom hits arise from the duplication.
//!
//! Traversal walks subcells in ray order, computing each face crossing
//! from the ray origin (absolute distances, so no drift accumulates), and
//! can therefore return the first hit found.

use crate::aabb::Aabb;
use crate::ray::Ray;
use crate::triangle::{Triangle, TOLERANCE};
use crate::vector::Vec3;

/// Maximum subdivision depth.
pub const MAX_LEVELS: usize = 44;

/// Triangles a cell may hold before it subdivides.
pub const MAX_ITEMS: usize = 8;

/// One octree node.
#[derive(Debug)]
pub enum SpatialIndex {
    /// Inner node: a cubical cell split into eight octants.
    Branch {
        /// Cell bound; children tile it exactly.
        bound: Aabb,
        /// Child per octant; bit i of the slot index selects the upper
        /// half of axis i. Empty octants are `None`.
        children: [Option<Box<SpatialIndex>>; 8],
    },
    /// Terminal node holding triangle indices.
    Leaf {
        /// Cell bound used to validate candidate hits.
        bound: Aabb,
        /// Indices into the scene's triangle array.
        items: Vec<u32>,
    },
}

impl SpatialIndex {
    /// Build the tree over all triangles.
    ///
    /// The root bound encloses every triangle bound and `eye`, then is
    /// extended into a cube. Including the eye guarantees the camera's
    /// rays start inside the root, which traversal requires.
    pub fn new(eye: Vec3, triangles: &[Triangle]) -> Self {
        let bounds: Vec<Aabb> = triangles.iter().map(Triangle::bound).collect();
        let root = bounds
            .iter()
            .fold(Aabb::point(eye), |acc, b| acc.union(b))
            .cubify();
        let items: Vec<u32> = (0..triangles.len() as u32).collect();
        Self::build(root, items, &bounds, 0)
    }

    fn build(bound: Aabb, items: Vec<u32>, bounds: &[Aabb], level: usize) -> Self {
        if items.len() <= MAX_ITEMS || level >= MAX_LEVELS - 1 {
            return SpatialIndex::Leaf { bound, items };
        }

        let mut children: [Option<Box<SpatialIndex>>; 8] = Default::default();
        // counts children that received the parent's whole set; one such
        // copy must stay subdividable or a scene with a huge triangle
        // (a sun) would overflow every leaf on the way down
        let mut full_copies = 0usize;
        for (slot, child) in children.iter_mut().enumerate() {
            let sub_bound = bound.octant(slot);
            let sub_items: Vec<u32> = items
                .iter()
                .copied()
                .filter(|&i| sub_bound.overlaps(&bounds[i as usize]))
                .collect();
            if sub_items.len() == items.len() {
                full_copies += 1;
            }
            let too_small = (sub_bound.max.x - sub_bound.min.x) < TOLERANCE * 4.0;
            let next_level = if full_copies > 1 || too_small {
                MAX_LEVELS
            } else {
                level + 1
            };
            if !sub_items.is_empty() {
                *child = Some(Box::new(Self::build(sub_bound, sub_items, bounds, next_level)));
            }
        }
        SpatialIndex::Branch { bound, children }
    }

    /// Nearest intersection of `ray` with the indexed triangles.
    ///
    /// `last_hit` names a triangle to skip, so a ray leaving a surface
    /// cannot immediately re-hit it. `start` must lie inside this node's
    /// bound; the top-level caller passes the ray origin.
    ///
    /// Returns the triangle's index and the hit position.
    pub fn intersection(
        &self,
        ray: &Ray,
        last_hit: Option<u32>,
        start: Vec3,
        triangles: &[Triangle],
    ) -> Option<(u32, Vec3)> {
        match self {
            SpatialIndex::Leaf { bound, items } => {
                let mut nearest = f64::INFINITY;
                let mut found = None;
                for &item in items {
                    if last_hit == Some(item) {
                        continue;
                    }
                    if let Some(distance) = triangles[item as usize].intersection(ray) {
                        if distance < nearest {
                            // only accept hits inside this cell, else a
                            // triangle shared with a farther cell could
                            // shadow a nearer hit there
                            let position = ray.at(distance);
                            if bound.contains(position, TOLERANCE) {
                                nearest = distance;
                                found = Some((item, position));
                            }
                        }
                    }
                }
                found
            }
            SpatialIndex::Branch { bound, children } => {
                let mid = bound.center();
                let mut cell = (0..3).fold(0usize, |acc, axis| {
                    acc | (usize::from(start[axis] >= mid[axis]) << axis)
                });
                let mut entry = start;
                loop {
                    if let Some(child) = &children[cell] {
                        if let Some(hit) = child.intersection(ray, last_hit, entry, triangles) {
                            return Some(hit);
                        }
                    }

                    // find which face of the current subcell the ray
                    // crosses first
                    let mut min_distance = f64::INFINITY;
                    let mut crossing = 0usize;
                    for axis in (0..3).rev() {
                        let high = (cell >> axis) & 1 == 1;
                        let outgoing = (ray.direction[axis] < 0.0) != high;
                        let face = if outgoing {
                            if high {
                                bound.max[axis]
                            } else {
                                bound.min[axis]
                            }
                        } else {
                            mid[axis]
                        };
                        let distance = (face - ray.origin[axis]) / ray.direction[axis];
                        if distance <= min_distance {
                            min_distance = distance;
                            crossing = axis;
                        }
                    }

                    // crossing an outer face leaves this branch
                    let high = (cell >> crossing) & 1 == 1;
                    if (ray.direction[crossing] < 0.0) != high {
                        return None;
                    }
                    cell ^= 1 << crossing;
                    entry = ray.at(min_distance);
                }
            }
        }
    }
}
