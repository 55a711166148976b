//! Change-notification events
//!
//! Direct manipulation is signalled as explicit event values delivered
//! synchronously to registered listeners; the object being manipulated knows
//! nothing about replication or equality semantics. Dispatch is performed by
//! the owner of the world and the listeners (the project façade), which is
//! what lets a listener receive `&mut World` without aliasing it.

use crate::world::{ObjectKey, World};
use serde::{Deserialize, Serialize};

/// An external actor applied a force directly to an object
///
/// Fired for direct manipulation only, never for driven dependents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    pub object: ObjectKey,
}

/// An object's authoritative position or orientation was set
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub object: ObjectKey,
}

/// Listener for scene change events
///
/// Both methods complete all dependent propagation before returning: there is
/// no deferred or cross-frame delivery.
pub trait SceneObserver {
    fn object_pushed(&mut self, world: &mut World, event: PushEvent) {
        let _ = (world, event);
    }

    fn object_moved(&mut self, world: &mut World, event: MoveEvent) {
        let _ = (world, event);
    }
}
