//! 3-vector operations
//!
//! nalgebra already provides most of these as methods; the free functions
//! exist so that degenerate inputs have one well-defined answer across the
//! crate:
//! - dividing by zero gives the zero vector
//! - normalizing the zero vector gives the zero vector
//! - angle computations clamp the cosine into `[-1, 1]`

use std::f64::consts::PI;

use rand::Rng;

use super::NVec3;

/// Lengths below this are treated as zero.
pub const EPSILON: f64 = 1e-10;

pub fn zero() -> NVec3 {
    NVec3::zeros()
}

pub fn add(a: &NVec3, b: &NVec3) -> NVec3 {
    a + b
}

pub fn subtract(a: &NVec3, b: &NVec3) -> NVec3 {
    a - b
}

pub fn scale(v: &NVec3, s: f64) -> NVec3 {
    v * s
}

/// Divide by a scalar, returning zero instead of inf/NaN when `s == 0`
pub fn divide(v: &NVec3, s: f64) -> NVec3 {
    if s == 0.0 {
        return NVec3::zeros();
    }
    v / s
}

pub fn magnitude(v: &NVec3) -> f64 {
    v.norm()
}

/// Squared length, for comparisons that don't need the square root
pub fn magnitude_squared(v: &NVec3) -> f64 {
    v.norm_squared()
}

/// Unit vector in the direction of `v`, or zero for a (near) zero vector
pub fn normalize(v: &NVec3) -> NVec3 {
    let len = v.norm();
    if len < EPSILON {
        return NVec3::zeros();
    }
    v / len
}

pub fn distance(a: &NVec3, b: &NVec3) -> f64 {
    (b - a).norm()
}

pub fn distance_squared(a: &NVec3, b: &NVec3) -> f64 {
    (b - a).norm_squared()
}

pub fn dot(a: &NVec3, b: &NVec3) -> f64 {
    a.dot(b)
}

pub fn cross(a: &NVec3, b: &NVec3) -> NVec3 {
    a.cross(b)
}

/// Angle in radians between `a` and `b`
///
/// Floating point can push the cosine slightly outside `[-1, 1]` for
/// (anti)parallel vectors, so it is clamped before `acos`. Zero vectors give 0.
pub fn angle_between(a: &NVec3, b: &NVec3) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

pub fn lerp(a: &NVec3, b: &NVec3, t: f64) -> NVec3 {
    a + (b - a) * t
}

/// Spherical interpolation between two directions
///
/// Falls back to `lerp` when the inputs are nearly parallel, where
/// `sin(theta)` in the denominator would blow up.
pub fn slerp(a: &NVec3, b: &NVec3, t: f64) -> NVec3 {
    let theta = angle_between(a, b);
    let sin_theta = theta.sin();
    if theta.abs() < 1e-6 || sin_theta.abs() < 1e-6 {
        return lerp(a, b, t);
    }
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;
    a * wa + b * wb
}

/// Reflect `v` about a surface with the given normal
pub fn reflect(v: &NVec3, normal: &NVec3) -> NVec3 {
    let n = normalize(normal);
    v - n * (2.0 * v.dot(&n))
}

/// Projection of `v` onto `onto` (zero if `onto` is zero)
pub fn project(v: &NVec3, onto: &NVec3) -> NVec3 {
    let len2 = onto.norm_squared();
    if len2 < EPSILON * EPSILON {
        return NVec3::zeros();
    }
    onto * (v.dot(onto) / len2)
}

/// Rotate `v` about `axis` by `angle` radians (Rodrigues' rotation formula)
///
/// v_rot = v cos(a) + (k x v) sin(a) + k (k . v)(1 - cos(a))
pub fn rotate_about_axis(v: &NVec3, axis: &NVec3, angle: f64) -> NVec3 {
    let k = normalize(axis);
    let (sin_a, cos_a) = angle.sin_cos();
    v * cos_a + k.cross(v) * sin_a + k * (k.dot(v) * (1.0 - cos_a))
}

/// Convert to spherical coordinates `(r, theta, phi)`
/// - `theta`: polar angle from +Y
/// - `phi`  : azimuth in the XZ plane measured from +X toward +Z
pub fn to_spherical(v: &NVec3) -> (f64, f64, f64) {
    let r = v.norm();
    if r < EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let theta = (v.y / r).clamp(-1.0, 1.0).acos();
    let phi = v.z.atan2(v.x);
    (r, theta, phi)
}

/// Inverse of [`to_spherical`]
pub fn from_spherical(r: f64, theta: f64, phi: f64) -> NVec3 {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    NVec3::new(r * sin_t * cos_p, r * cos_t, r * sin_t * sin_p)
}

/// Uniformly distributed direction on the unit sphere
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> NVec3 {
    // z uniform in [-1, 1] and azimuth uniform gives a uniform sphere sample
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let phi: f64 = rng.gen_range(0.0..2.0 * PI);
    let r = (1.0 - z * z).max(0.0).sqrt();
    NVec3::new(r * phi.cos(), r * phi.sin(), z)
}
