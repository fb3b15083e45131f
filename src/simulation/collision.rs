//! Narrow-phase collision tests
//!
//! Each test returns at most one contact. Body-body contacts and world-bounds
//! contacts are separate types so a bounds hit can never be mistaken for a
//! pair with itself:
//! - [`PairContact`]   two distinct bodies, normal points from `a` to `b`
//! - [`BoundsContact`] one body against a wall, normal points into the world
//!
//! Degenerate geometry never fails: coincident centres fall back to +Y.

use crate::math::NVec3;
use crate::simulation::states::{Body, Shape};

/// Fallback normal when two centres coincide
pub fn default_normal() -> NVec3 {
    NVec3::new(0.0, 1.0, 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContact {
    pub a: usize,
    pub b: usize,
    pub normal: NVec3, // unit, from a to b
    pub depth: f64,
    pub point: NVec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsContact {
    pub body: usize,
    pub normal: NVec3, // unit, from the wall into the world
    pub depth: f64,
    pub point: NVec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Pair(PairContact),
    Bounds(BoundsContact),
}

impl Contact {
    pub fn depth(&self) -> f64 {
        match self {
            Contact::Pair(c) => c.depth,
            Contact::Bounds(c) => c.depth,
        }
    }
}

/// Axis-aligned world box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: NVec3,
    pub max: NVec3,
}

impl WorldBounds {
    pub fn new(min: NVec3, max: NVec3) -> Self {
        Self { min, max }
    }

    /// Cube of half-size `h` centred at the origin
    pub fn cube(h: f64) -> Self {
        Self {
            min: NVec3::new(-h, -h, -h),
            max: NVec3::new(h, h, h),
        }
    }

    pub fn contains(&self, p: &NVec3) -> bool {
        (0..3).all(|k| p[k] >= self.min[k] && p[k] <= self.max[k])
    }
}

/// Core sphere test on raw centres and radii
pub fn spheres(a: usize, xa: &NVec3, ra: f64, b: usize, xb: &NVec3, rb: f64) -> Option<PairContact> {
    let d = xb - xa;
    let dist = d.norm();
    let radii = ra + rb;
    if dist >= radii {
        return None;
    }
    let normal = if dist > 0.0 { d / dist } else { default_normal() };
    let depth = radii - dist;
    Some(PairContact {
        a,
        b,
        normal,
        depth,
        point: xa + normal * (ra - 0.5 * depth),
    })
}

/// Sphere-sphere on collision radii
pub fn sphere_sphere(a: usize, body_a: &Body, b: usize, body_b: &Body) -> Option<PairContact> {
    spheres(a, &body_a.x, body_a.radius, b, &body_b.x, body_b.radius)
}

/// Capsules approximated as spheres of radius `r + height / 2`, not a
/// segment-segment distance test
pub fn capsule_capsule(a: usize, body_a: &Body, b: usize, body_b: &Body) -> Option<PairContact> {
    spheres(a, &body_a.x, body_a.effective_radius(), b, &body_b.x, body_b.effective_radius())
}

/// Sphere against an axis-aligned box centred on `body_box.x`
///
/// The contact is reported from the box (`a`) to the sphere (`b`).
pub fn sphere_box(s: usize, sphere: &Body, bx: usize, body_box: &Body) -> Option<PairContact> {
    let half = match body_box.shape {
        Shape::Box { half_extents } => half_extents,
        _ => NVec3::repeat(body_box.radius),
    };
    let r = sphere.effective_radius();
    let min = body_box.x - half;
    let max = body_box.x + half;

    let closest = NVec3::new(
        sphere.x.x.clamp(min.x, max.x),
        sphere.x.y.clamp(min.y, max.y),
        sphere.x.z.clamp(min.z, max.z),
    );
    let d = sphere.x - closest;
    let dist = d.norm();
    if dist >= r {
        return None;
    }
    let normal = if dist > 0.0 { d / dist } else { default_normal() };
    Some(PairContact {
        a: bx,
        b: s,
        normal,
        depth: r - dist,
        point: closest,
    })
}

/// Test a body against the world box, one contact per violated face
///
/// A body whose extent exactly touches a face still produces a contact,
/// with depth 0.
pub fn sphere_bounds(i: usize, body: &Body, bounds: &WorldBounds, out: &mut Vec<BoundsContact>) {
    let r = body.effective_radius();
    for axis in 0..3 {
        let c = body.x[axis];

        let low = c - r;
        if low <= bounds.min[axis] {
            let mut normal = NVec3::zeros();
            normal[axis] = 1.0;
            let mut point = body.x;
            point[axis] = bounds.min[axis];
            out.push(BoundsContact {
                body: i,
                normal,
                depth: bounds.min[axis] - low,
                point,
            });
        }

        let high = c + r;
        if high >= bounds.max[axis] {
            let mut normal = NVec3::zeros();
            normal[axis] = -1.0;
            let mut point = body.x;
            point[axis] = bounds.max[axis];
            out.push(BoundsContact {
                body: i,
                normal,
                depth: high - bounds.max[axis],
                point,
            });
        }
    }
}

/// Pick the narrow-phase test for a pair of shapes
pub fn test_pair(a: usize, body_a: &Body, b: usize, body_b: &Body) -> Option<PairContact> {
    match (body_a.shape, body_b.shape) {
        (Shape::Box { .. }, Shape::Box { .. }) => capsule_capsule(a, body_a, b, body_b),
        (Shape::Box { .. }, _) => sphere_box(b, body_b, a, body_a),
        (_, Shape::Box { .. }) => sphere_box(a, body_a, b, body_b),
        (Shape::Capsule { .. }, _) | (_, Shape::Capsule { .. }) => capsule_capsule(a, body_a, b, body_b),
        (Shape::Sphere, Shape::Sphere) => sphere_sphere(a, body_a, b, body_b),
    }
}

/// All-pairs narrow phase without a broad phase, O(N^2)
///
/// Returns the number of tests run and the contacts found. Used as the
/// reference the octree path is benchmarked and checked against.
pub fn brute_force_pairs(bodies: &[Body]) -> (usize, Vec<PairContact>) {
    let mut checks = 0;
    let mut contacts = Vec::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if bodies[i].fixed && bodies[j].fixed {
                continue;
            }
            checks += 1;
            if let Some(c) = test_pair(i, &bodies[i], j, &bodies[j]) {
                contacts.push(c);
            }
        }
    }
    (checks, contacts)
}
