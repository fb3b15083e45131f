//! Model matrices handed to the renderer

use super::{NMat4, NQuat, NVec3};

/// Build a column-vector TRS matrix `T * R * S`
///
/// The rotation block is the standard unit-quaternion expansion; each column
/// is then multiplied by the matching scale component.
pub fn compose_trs(position: &NVec3, rotation: &NQuat, scale: &NVec3) -> NMat4 {
    let (x, y, z, w) = (rotation.i, rotation.j, rotation.k, rotation.w);
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);

    let (sx, sy, sz) = (scale.x, scale.y, scale.z);

    NMat4::new(
        (1.0 - (yy + zz)) * sx, (xy - wz) * sy,         (xz + wy) * sz,         position.x,
        (xy + wz) * sx,         (1.0 - (xx + zz)) * sy, (yz - wx) * sz,         position.y,
        (xz - wy) * sx,         (yz + wx) * sy,         (1.0 - (xx + yy)) * sz, position.z,
        0.0,                    0.0,                    0.0,                    1.0,
    )
}

/// Apply a TRS matrix to a point (w = 1)
pub fn transform_point(m: &NMat4, p: &NVec3) -> NVec3 {
    let h = m * nalgebra::Vector4::new(p.x, p.y, p.z, 1.0);
    NVec3::new(h.x, h.y, h.z)
}
