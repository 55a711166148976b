//! # Maquette Core
//!
//! Double-precision math for the Maquette object model: vectors, quaternions,
//! rigid transforms, and the epsilon comparisons the rest of the workspace
//! tests against.
//!
//! Everything here is a plain value type. Transform *relationships* (driven
//! objects, replication chains, linked pairs) live in `maquette_scene` and
//! `maquette_links`; this crate only knows how to compose and invert.

pub mod approx;
pub mod quat;
pub mod vec3;
pub mod xform;

pub use approx::{quat_close, vec3_close, xform_close, DEFAULT_EPSILON};
pub use quat::Quat;
pub use vec3::Vec3;
pub use xform::RigidTransform;
