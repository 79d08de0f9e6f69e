//! # Math Types
//!
//! Double-precision vector and matrix aliases over `cgmath`, plus the two
//! value types the mesh model needs that `cgmath` does not model the same way:
//! [`Color`] and [`Quaternion`].

pub mod color;
pub mod quaternion;

pub use color::{Color, Hsv};
pub use quaternion::{EulerOrder, Quaternion};

use cgmath::InnerSpace;

/// UV coordinate (`x` = u, `y` = v).
pub type Vec2 = cgmath::Vector2<f64>;

/// 3D vector.
pub type Vec3 = cgmath::Vector3<f64>;

/// 4D vector. Tangents store handedness in `w`.
pub type Vec4 = cgmath::Vector4<f64>;

/// 4x4 column-major matrix.
pub type Mat4 = cgmath::Matrix4<f64>;

/// Multiply a point by a 4x4 matrix, dividing through by the resulting `w`.
pub fn transform_point(m: &Mat4, v: Vec3) -> Vec3 {
    let d = 1.0 / (m.x.w * v.x + m.y.w * v.y + m.z.w * v.z + m.w.w);

    Vec3::new(
        (m.x.x * v.x + m.y.x * v.y + m.z.x * v.z + m.w.x) * d,
        (m.x.y * v.x + m.y.y * v.y + m.z.y * v.z + m.w.y) * d,
        (m.x.z * v.x + m.y.z * v.y + m.z.z * v.z + m.w.z) * d,
    )
}

/// Rotation part of a transform: the upper 3x3 columns divided by their
/// lengths, with translation removed.
pub fn extract_rotation(m: &Mat4) -> Mat4 {
    let sx = 1.0 / m.x.truncate().magnitude();
    let sy = 1.0 / m.y.truncate().magnitude();
    let sz = 1.0 / m.z.truncate().magnitude();

    #[rustfmt::skip]
    let result = Mat4::new(
        m.x.x * sx, m.x.y * sx, m.x.z * sx, 0.0,
        m.y.x * sy, m.y.y * sy, m.y.z * sy, 0.0,
        m.z.x * sz, m.z.y * sz, m.z.z * sz, 0.0,
        0.0,        0.0,        0.0,        1.0,
    );
    result
}

/// Normalize in place unless the vector is exactly zero.
pub(crate) fn normalize_or_zero(v: Vec3) -> Vec3 {
    if v.x == 0.0 && v.y == 0.0 && v.z == 0.0 {
        v
    } else {
        v / v.magnitude()
    }
}
