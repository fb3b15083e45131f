//! Impulse-based contact resolution
//!
//! Pair contacts exchange an impulse along the contact normal and then get a
//! small positional nudge (Baumgarte-style) so overlap doesn't persist.
//! Bounds contacts push the body back inside and reflect its normal velocity.
//! Fixed bodies have zero inverse mass and are never moved.

use crate::simulation::collision::{BoundsContact, Contact, PairContact};
use crate::simulation::states::Body;

/// Positional correction settings
#[derive(Debug, Clone, Copy)]
pub struct Correction {
    pub percent: f64, // fraction of the remaining overlap removed per step
    pub slop: f64, // overlap tolerated without correction
}

impl Default for Correction {
    fn default() -> Self {
        Self {
            percent: 0.8,
            slop: 0.01,
        }
    }
}

/// Resolve one contact in place
pub fn resolve(contact: &Contact, bodies: &mut [Body], restitution: f64, correction: &Correction) {
    match contact {
        Contact::Pair(c) => resolve_pair(c, bodies, restitution, correction),
        Contact::Bounds(c) => resolve_bounds(c, bodies, restitution),
    }
}

/// Push the body out of the wall and bounce it if it is moving into it
pub fn resolve_bounds(contact: &BoundsContact, bodies: &mut [Body], restitution: f64) {
    let body = &mut bodies[contact.body];
    if body.fixed {
        return;
    }
    let n = contact.normal;
    body.x += n * contact.depth;

    let vn = body.v.dot(&n);
    if vn < 0.0 {
        body.v -= n * ((1.0 + restitution) * vn);
    }
}

/// Impulse exchange between two distinct bodies
///
/// j = -(1 + e) (v_rel . n) / (1/mA + 1/mB), applied as `-j n` to A and
/// `+j n` to B, each scaled by its own inverse mass.
///
/// For two free bodies this equals dividing by the total mass and scaling
/// each side by the other body's mass. A fixed body has zero inverse mass,
/// so it behaves as infinitely heavy and its partner takes the whole impulse.
pub fn resolve_pair(contact: &PairContact, bodies: &mut [Body], restitution: f64, correction: &Correction) {
    let (ia, ib) = (contact.a, contact.b);
    if ia == ib {
        return;
    }

    let inv_a = bodies[ia].inv_mass();
    let inv_b = bodies[ib].inv_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum == 0.0 {
        return; // both fixed
    }

    let n = contact.normal;
    let v_rel = bodies[ib].v - bodies[ia].v;
    let vn = v_rel.dot(&n);
    if vn >= 0.0 {
        return; // already separating
    }

    let j = -(1.0 + restitution) * vn / inv_sum;
    let impulse = n * j;
    bodies[ia].v -= impulse * inv_a;
    bodies[ib].v += impulse * inv_b;

    let overlap = (contact.depth - correction.slop).max(0.0);
    if overlap > 0.0 {
        let push = n * (overlap * correction.percent / inv_sum);
        bodies[ia].x -= push * inv_a;
        bodies[ib].x += push * inv_b;
    }
}
