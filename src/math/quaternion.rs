//! # Quaternion
//!
//! Rotation quaternion with the conventions the mesh pipeline relies on:
//! normalizing a zero quaternion yields all zeros (not identity), and
//! [`Quaternion::slerp`] falls back to plain averaging when the two inputs
//! are nearly parallel or opposite.

use super::{Mat4, Vec3};
use cgmath::SquareMatrix;

/// Axis order used when building a quaternion from Euler angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EulerOrder {
    #[default]
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn set(&mut self, x: f64, y: f64, z: f64, w: f64) -> &mut Self {
        *self = Self::new(x, y, z, w);
        self
    }

    /// Build from Euler angles (radians) applied in the given axis order.
    pub fn from_euler(angles: Vec3, order: EulerOrder) -> Self {
        let (s1, c1) = (angles.x / 2.0).sin_cos();
        let (s2, c2) = (angles.y / 2.0).sin_cos();
        let (s3, c3) = (angles.z / 2.0).sin_cos();

        let (a, b, c, d) = (s1 * c2 * c3, c1 * s2 * c3, c1 * c2 * s3, c1 * c2 * c3);
        let (e, f, g, h) = (c1 * s2 * s3, s1 * c2 * s3, s1 * s2 * c3, s1 * s2 * s3);

        match order {
            EulerOrder::XYZ => Self::new(a + e, b - f, c + g, d - h),
            EulerOrder::YXZ => Self::new(a + e, b - f, c - g, d + h),
            EulerOrder::ZXY => Self::new(a - e, b + f, c + g, d - h),
            EulerOrder::ZYX => Self::new(a - e, b + f, c - g, d + h),
            EulerOrder::YZX => Self::new(a + e, b + f, c - g, d - h),
            EulerOrder::XZY => Self::new(a - e, b - f, c + g, d + h),
        }
    }

    /// Build from a rotation of `angle` radians around a unit `axis`.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let (s, c) = (angle / 2.0).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Extract the rotation from the upper 3x3 of `m`.
    ///
    /// Magnitudes come from the diagonal scaled by `det^(1/3)`; signs come
    /// from the off-diagonal differences. Scale is divided out by the final
    /// normalization.
    pub fn from_rotation_matrix(m: &Mat4) -> Self {
        let abs_q = m.determinant().powf(1.0 / 3.0);
        let (m00, m11, m22) = (m.x.x, m.y.y, m.z.z);

        let w = (abs_q + m00 + m11 + m22).max(0.0).sqrt() / 2.0;
        let x = (abs_q + m00 - m11 - m22).max(0.0).sqrt() / 2.0;
        let y = (abs_q - m00 + m11 - m22).max(0.0).sqrt() / 2.0;
        let z = (abs_q - m00 - m11 + m22).max(0.0).sqrt() / 2.0;

        let mut q = Self::new(
            copy_sign(x, m.y.z - m.z.y),
            copy_sign(y, m.z.x - m.x.z),
            copy_sign(z, m.x.y - m.y.x),
            w,
        );
        q.normalize();
        q
    }

    /// Recompute `w` for a unit quaternion from `x`, `y`, `z`. Always non-positive.
    pub fn calculate_w(&mut self) {
        self.w = -(1.0 - self.x * self.x - self.y * self.y - self.z * self.z)
            .abs()
            .sqrt();
    }

    /// Conjugate in place.
    pub fn inverse(&mut self) {
        self.x = -self.x;
        self.y = -self.y;
        self.z = -self.z;
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Scale to unit length. A zero quaternion becomes `(0, 0, 0, 0)`.
    pub fn normalize(&mut self) {
        let l = self.length();
        if l == 0.0 {
            *self = Self::new(0.0, 0.0, 0.0, 0.0);
        } else {
            let inv = 1.0 / l;
            self.x *= inv;
            self.y *= inv;
            self.z *= inv;
            self.w *= inv;
        }
    }

    /// Hamilton product `a * b` as a new value.
    pub fn multiply(a: &Quaternion, b: &Quaternion) -> Quaternion {
        Self::new(
            a.x * b.w + a.y * b.z - a.z * b.y + a.w * b.x,
            -a.x * b.z + a.y * b.w + a.z * b.x + a.w * b.y,
            a.x * b.y - a.y * b.x + a.z * b.w + a.w * b.z,
            -a.x * b.x - a.y * b.y - a.z * b.z + a.w * b.w,
        )
    }

    /// Hamilton product `self = self * b`.
    pub fn multiply_assign(&mut self, b: &Quaternion) {
        let (qax, qay, qaz, qaw) = (self.x, self.y, self.z, self.w);

        self.x = qax * b.w + qaw * b.x + qay * b.z - qaz * b.y;
        self.y = qay * b.w + qaw * b.y + qaz * b.x - qax * b.z;
        self.z = qaz * b.w + qaw * b.z + qax * b.y - qay * b.x;
        self.w = qaw * b.w - qax * b.x - qay * b.y - qaz * b.z;
    }

    /// Rotate a vector by `q * v * q^-1`.
    pub fn rotate_vector(&self, v: Vec3) -> Vec3 {
        let (qx, qy, qz, qw) = (self.x, self.y, self.z, self.w);

        let ix = qw * v.x + qy * v.z - qz * v.y;
        let iy = qw * v.y + qz * v.x - qx * v.z;
        let iz = qw * v.z + qx * v.y - qy * v.x;
        let iw = -qx * v.x - qy * v.y - qz * v.z;

        Vec3::new(
            ix * qw + iw * -qx + iy * -qz - iz * -qy,
            iy * qw + iw * -qy + iz * -qx - ix * -qz,
            iz * qw + iw * -qz + ix * -qy - iy * -qx,
        )
    }

    /// Spherical interpolation from `qa` to `qb` along the shortest arc.
    pub fn slerp(qa: &Quaternion, qb: &Quaternion, t: f64) -> Quaternion {
        let mut cos_half_theta = qa.dot(qb);
        let mut qm = *qb;

        if cos_half_theta < 0.0 {
            qm = Self::new(-qb.x, -qb.y, -qb.z, -qb.w);
            cos_half_theta = -cos_half_theta;
        }

        if cos_half_theta.abs() >= 1.0 {
            return *qa;
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();

        // Averages the unflipped target.
        if sin_half_theta.abs() < 0.001 {
            return Self::new(
                0.5 * (qa.x + qb.x),
                0.5 * (qa.y + qb.y),
                0.5 * (qa.z + qb.z),
                0.5 * (qa.w + qb.w),
            );
        }

        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;

        Self::new(
            qa.x * ratio_a + qm.x * ratio_b,
            qa.y * ratio_a + qm.y * ratio_b,
            qa.z * ratio_a + qm.z * ratio_b,
            qa.w * ratio_a + qm.w * ratio_b,
        )
    }
}

fn copy_sign(a: f64, b: f64) -> f64 {
    if b < 0.0 {
        -a.abs()
    } else {
        a.abs()
    }
}

impl From<cgmath::Quaternion<f64>> for Quaternion {
    fn from(q: cgmath::Quaternion<f64>) -> Self {
        Self::new(q.v.x, q.v.y, q.v.z, q.s)
    }
}

impl From<Quaternion> for cgmath::Quaternion<f64> {
    fn from(q: Quaternion) -> Self {
        cgmath::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}
