//! Epsilon comparisons for transforms
//!
//! Replication chains compound floating error step by step, so callers scale
//! the epsilon by chain depth rather than using a single global tolerance.

use crate::quat::Quat;
use crate::vec3::Vec3;
use crate::xform::RigidTransform;

/// Baseline tolerance for a single composition step
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Component-wise vector comparison
pub fn vec3_close(a: Vec3, b: Vec3, epsilon: f64) -> bool {
    (a.x - b.x).abs() <= epsilon && (a.y - b.y).abs() <= epsilon && (a.z - b.z).abs() <= epsilon
}

/// Rotation comparison, treating `q` and `-q` as the same rotation
pub fn quat_close(a: Quat, b: Quat, epsilon: f64) -> bool {
    let direct = (a.x - b.x).abs() <= epsilon
        && (a.y - b.y).abs() <= epsilon
        && (a.z - b.z).abs() <= epsilon
        && (a.w - b.w).abs() <= epsilon;
    let negated = (a.x + b.x).abs() <= epsilon
        && (a.y + b.y).abs() <= epsilon
        && (a.z + b.z).abs() <= epsilon
        && (a.w + b.w).abs() <= epsilon;
    direct || negated
}

/// Rigid-transform comparison: translation and rotation within epsilon
pub fn xform_close(a: RigidTransform, b: RigidTransform, epsilon: f64) -> bool {
    vec3_close(a.translation, b.translation, epsilon) && quat_close(a.rotation, b.rotation, epsilon)
}
