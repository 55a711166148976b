//! Quaternion for 3D rotations

use crate::vec3::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Unit quaternion representing a 3D rotation
///
/// Composition is the Hamilton product: `(a * b).rotate_vec3(v)` applies `b`
/// first, then `a`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Create from an axis and an angle in radians
    ///
    /// A degenerate (zero-length) axis yields the identity rotation.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let len = axis.length();
        if len < 1e-12 {
            return Self::IDENTITY;
        }

        let half = angle * 0.5;
        let s = half.sin() / len;
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    /// Create from Euler angles (radians), XYZ order
    pub fn from_euler(x: f64, y: f64, z: f64) -> Self {
        let (sx, cx) = (x * 0.5).sin_cos();
        let (sy, cy) = (y * 0.5).sin_cos();
        let (sz, cz) = (z * 0.5).sin_cos();

        Self {
            x: sx * cy * cz - cx * sy * sz,
            y: cx * sy * cz + sx * cy * sz,
            z: cx * cy * sz - sx * sy * cz,
            w: cx * cy * cz + sx * sy * sz,
        }
    }

    /// Normalize, returning identity for a degenerate quaternion
    pub fn normalize(&self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len < 1e-12 {
            return Self::IDENTITY;
        }
        Self {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
            w: self.w / len,
        }
    }

    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Inverse rotation (conjugate, assuming a unit quaternion)
    pub fn inverse(&self) -> Self {
        self.conjugate()
    }

    pub fn dot(&self, other: Quat) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Rotate a vector by this quaternion
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        // v' = v + 2w(q x v) + 2(q x (q x v))
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }
}

impl Mul for Quat {
    type Output = Quat;

    fn mul(self, rhs: Quat) -> Quat {
        Quat {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx::{quat_close, vec3_close, DEFAULT_EPSILON};
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_identity_rotation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Quat::IDENTITY.rotate_vec3(v), v);
    }

    #[test]
    fn test_axis_angle_rotation() {
        let q = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
        let v = q.rotate_vec3(Vec3::X);
        assert!(vec3_close(v, Vec3::Y, DEFAULT_EPSILON));
    }

    #[test]
    fn test_degenerate_axis_is_identity() {
        let q = Quat::from_axis_angle(Vec3::ZERO, PI);
        assert_eq!(q, Quat::IDENTITY);
    }

    #[test]
    fn test_composition_order() {
        // a * b applies b first
        let a = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
        let b = Quat::from_axis_angle(Vec3::X, FRAC_PI_2);
        let combined = a * b;

        let v = Vec3::Y;
        let step = a.rotate_vec3(b.rotate_vec3(v));
        assert!(vec3_close(combined.rotate_vec3(v), step, DEFAULT_EPSILON));
    }

    #[test]
    fn test_inverse_cancels() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7);
        assert!(quat_close(q * q.inverse(), Quat::IDENTITY, DEFAULT_EPSILON));
    }

    #[test]
    fn test_normalize_degenerate() {
        let q = Quat::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(q.normalize(), Quat::IDENTITY);
    }
}
