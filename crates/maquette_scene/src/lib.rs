//! # Maquette Scene
//!
//! The object model of the Maquette editor core:
//!
//! - [`SceneObject`]: a rigid object with an explicit authoritative-vs-driven
//!   transform node, a model reference, visibility, and force accumulators
//! - [`World`]: the keyed collection that owns every object and evaluates
//!   driven transforms
//! - [`PushEvent`] / [`MoveEvent`] / [`SceneObserver`]: the synchronous
//!   change-notification protocol consumed by the relationship engines
//!
//! A *driven* object's position and orientation are computed on every query by
//! composing another object's transform with an offset; an *authoritative*
//! object stores its own. The [`World`] guarantees drive chains stay acyclic,
//! so reads never have to defend against infinite regress.

pub mod error;
pub mod object;
pub mod observer;
pub mod world;

pub use error::SceneError;
pub use object::{Drive, DriveSource, ModelId, SceneObject, TransformNode};
pub use observer::{MoveEvent, PushEvent, SceneObserver};
pub use world::{ObjectKey, World};
