//! Rigid transform (rotation + translation)

use crate::quat::Quat;
use crate::vec3::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A rigid-body transform: rotate, then translate
///
/// `(a * b)` is the composition applying `b` first, then `a`: the same
/// convention as matrix multiplication and [`Quat`] products. The relative
/// transform of `b` with respect to `a` is therefore `a.inverse() * b`, and
/// `a * (a.inverse() * b) == b`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidTransform {
    pub const IDENTITY: RigidTransform = RigidTransform {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub const fn from_parts(translation: Vec3, rotation: Quat) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation,
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            translation: Vec3::ZERO,
        }
    }

    /// Transform a point
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate_vec3(p) + self.translation
    }

    /// Transform a direction (ignores translation)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation.rotate_vec3(v)
    }

    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.inverse();
        Self {
            rotation: inv_rot,
            translation: -inv_rot.rotate_vec3(self.translation),
        }
    }

    /// `self` composed with itself `n` times by repeated composition
    ///
    /// `power(0)` is the identity. Repeated composition (rather than any
    /// closed form) keeps the result bit-for-bit consistent with walking a
    /// chain of single steps.
    pub fn power(&self, n: u32) -> Self {
        let mut acc = Self::IDENTITY;
        for _ in 0..n {
            acc = acc * *self;
        }
        acc
    }
}

impl Mul for RigidTransform {
    type Output = RigidTransform;

    fn mul(self, rhs: RigidTransform) -> RigidTransform {
        RigidTransform {
            rotation: self.rotation * rhs.rotation,
            translation: self.rotation.rotate_vec3(rhs.translation) + self.translation,
        }
    }
}
