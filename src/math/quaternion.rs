//! Orientation quaternions
//!
//! `NQuat` is nalgebra's plain `Quaternion<f64>` (w, i, j, k). The Hamilton
//! product and the conjugation rotation are written out here so the
//! conventions are explicit.

use super::vector::{normalize as normalize_vec, EPSILON};
use super::{NQuat, NVec3};

pub fn identity() -> NQuat {
    NQuat::new(1.0, 0.0, 0.0, 0.0)
}

/// Rotation of `angle` radians about `axis` (axis need not be unit length)
pub fn from_axis_angle(axis: &NVec3, angle: f64) -> NQuat {
    let k = normalize_vec(axis);
    if k == NVec3::zeros() {
        return identity();
    }
    let (s, c) = (0.5 * angle).sin_cos();
    NQuat::new(c, k.x * s, k.y * s, k.z * s)
}

/// Hamilton product `a * b` (apply `b` first, then `a`)
pub fn multiply(a: &NQuat, b: &NQuat) -> NQuat {
    NQuat::new(
        a.w * b.w - a.i * b.i - a.j * b.j - a.k * b.k,
        a.w * b.i + a.i * b.w + a.j * b.k - a.k * b.j,
        a.w * b.j - a.i * b.k + a.j * b.w + a.k * b.i,
        a.w * b.k + a.i * b.j - a.j * b.i + a.k * b.w,
    )
}

pub fn conjugate(q: &NQuat) -> NQuat {
    NQuat::new(q.w, -q.i, -q.j, -q.k)
}

/// Unit quaternion, or identity for a degenerate input
pub fn normalize(q: &NQuat) -> NQuat {
    let len = (q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k).sqrt();
    if len < EPSILON {
        return identity();
    }
    NQuat::new(q.w / len, q.i / len, q.j / len, q.k / len)
}

/// Rotate `v` by `q` via conjugation: `q * (0, v) * q^-1`
pub fn rotate_vector(q: &NQuat, v: &NVec3) -> NVec3 {
    let p = NQuat::new(0.0, v.x, v.y, v.z);
    let r = multiply(&multiply(q, &p), &conjugate(q));
    NVec3::new(r.i, r.j, r.k)
}

/// Advance orientation by angular velocity `w` (rad/s, world frame) over `dt`
///
/// q' = normalize(q + dt/2 * (0, w) * q)
pub fn integrate(q: &NQuat, w: &NVec3, dt: f64) -> NQuat {
    let spin = multiply(&NQuat::new(0.0, w.x, w.y, w.z), q);
    let h = 0.5 * dt;
    normalize(&NQuat::new(
        q.w + h * spin.w,
        q.i + h * spin.i,
        q.j + h * spin.j,
        q.k + h * spin.k,
    ))
}
