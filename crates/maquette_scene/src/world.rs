//! World collection
//!
//! Owns every [`SceneObject`] and is the single entry point for transform
//! queries and driven-state transitions. Handles returned by
//! [`World::add_object`] stay valid until the object is removed; a stale key
//! reads as identity and writes through it are swallowed, so a dangling
//! reference inside a drive chain degrades gracefully instead of crashing.

use crate::error::SceneError;
use crate::object::{Drive, DriveSource, SceneObject, TransformNode};
use maquette_core::{Quat, RigidTransform, Vec3};
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle to an object owned by the [`World`]
    pub struct ObjectKey;
}

/// The collection of objects making up the scene
#[derive(Default)]
pub struct World {
    objects: SlotMap<ObjectKey, SceneObject>,
}

impl World {
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    /// Add an object, transferring ownership to the world
    ///
    /// The world owns the object's lifetime from here on; the caller keeps the
    /// returned key for repositioning or removal.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectKey {
        self.objects.insert(object)
    }

    /// Remove an object, returning it if it was present
    ///
    /// Anything still driven from the removed object falls back to an identity
    /// base; components that own derived objects are expected to clean up
    /// their own references.
    pub fn remove_object(&mut self, key: ObjectKey) -> Option<SceneObject> {
        self.objects.remove(key)
    }

    /// Spawn a copy of an object: same model and visibility, authoritative at
    /// the source's current effective placement, forces cleared
    pub fn duplicate(&mut self, key: ObjectKey) -> Option<ObjectKey> {
        let transform = self.local_transform(key);
        let source = self.objects.get(key)?;
        let mut copy = SceneObject::new()
            .with_position(transform.translation)
            .with_orientation(transform.rotation)
            .with_visible(source.is_visible());
        copy.set_model(source.model());
        Some(self.objects.insert(copy))
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.objects.keys()
    }

    pub fn object(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    // ------------------------------------------------------------------
    // Transform queries
    // ------------------------------------------------------------------

    /// Current effective local transform, whether driven or authoritative
    ///
    /// Driven nodes are evaluated lazily by walking the drive chain, so the
    /// result is read-consistent within a single query and never stale. A
    /// missing object contributes identity.
    pub fn local_transform(&self, key: ObjectKey) -> RigidTransform {
        let Some(object) = self.objects.get(key) else {
            return RigidTransform::IDENTITY;
        };
        match object.node() {
            TransformNode::Authoritative {
                position,
                orientation,
            } => RigidTransform::from_parts(*position, *orientation),
            TransformNode::Driven(drive) => {
                self.local_transform(drive.base) * self.drive_offset(drive)
            }
        }
    }

    fn drive_offset(&self, drive: &Drive) -> RigidTransform {
        match drive.source {
            DriveSource::Fixed(offset) => offset,
            DriveSource::PairRelative { first, second } => {
                self.local_transform(first).inverse() * self.local_transform(second)
            }
        }
    }

    /// Current effective position
    pub fn position(&self, key: ObjectKey) -> Vec3 {
        self.local_transform(key).translation
    }

    /// Current effective orientation
    pub fn orientation(&self, key: ObjectKey) -> Quat {
        self.local_transform(key).rotation
    }

    /// Transform of `second` relative to `first`:
    /// `inverse(first.local) ∘ second.local`
    pub fn relative_transform(&self, first: ObjectKey, second: ObjectKey) -> RigidTransform {
        self.local_transform(first).inverse() * self.local_transform(second)
    }

    /// Convert a model-space point on `key` to world coordinates
    pub fn model_point_in_world(&self, key: ObjectKey, point: Vec3) -> Vec3 {
        self.local_transform(key).transform_point(point)
    }

    /// Convert a world-space vector into `key`'s model space
    pub fn world_vector_in_model(&self, key: ObjectKey, vector: Vec3) -> Vec3 {
        self.orientation(key).inverse().rotate_vec3(vector)
    }

    // ------------------------------------------------------------------
    // Authoritative-state writes
    // ------------------------------------------------------------------

    /// Set the stored position of an authoritative object
    ///
    /// Swallowed for driven objects: their drive defines the state.
    pub fn set_position(&mut self, key: ObjectKey, position: Vec3) {
        let orientation = self.orientation(key);
        self.set_pos_and_orient(key, position, orientation);
    }

    /// Set the stored orientation of an authoritative object
    pub fn set_orientation(&mut self, key: ObjectKey, orientation: Quat) {
        let position = self.position(key);
        self.set_pos_and_orient(key, position, orientation);
    }

    /// Set stored position and orientation together
    pub fn set_pos_and_orient(&mut self, key: ObjectKey, position: Vec3, orientation: Quat) {
        let Some(object) = self.objects.get_mut(key) else {
            tracing::warn!(?key, "set_pos_and_orient on missing object");
            return;
        };
        if object.is_driven() {
            tracing::debug!(?key, "ignoring placement write to driven object");
            return;
        }
        object.set_node_authoritative(position, orientation);
    }

    // ------------------------------------------------------------------
    // Driven-state protocol
    // ------------------------------------------------------------------

    pub fn is_driven(&self, key: ObjectKey) -> bool {
        self.objects.get(key).is_some_and(SceneObject::is_driven)
    }

    /// Put an object under a drive
    ///
    /// Idempotent: driving an already-driven object replaces its drive.
    /// Rejects drives that would let the object's transform reach itself
    /// through the base/offset chain: cycles are made structurally
    /// impossible here, never detected at read time.
    pub fn set_driven(&mut self, key: ObjectKey, drive: Drive) -> Result<(), SceneError> {
        if !self.objects.contains_key(key) {
            return Err(SceneError::MissingObject(key));
        }
        if self.drive_reaches(&drive, key) {
            return Err(SceneError::DriveCycle(key));
        }
        if let Some(object) = self.objects.get_mut(key) {
            object.set_node_driven(drive);
        }
        Ok(())
    }

    /// Return a driven object to authoritative mode
    ///
    /// Evaluates the drive once and stores the result, so the externally
    /// observable placement is unchanged at the instant of the call. No-op on
    /// authoritative objects.
    pub fn clear_driven(&mut self, key: ObjectKey) {
        if !self.is_driven(key) {
            return;
        }
        let transform = self.local_transform(key);
        if let Some(object) = self.objects.get_mut(key) {
            object.set_node_authoritative(transform.translation, transform.rotation);
        }
    }

    /// Whether evaluating `drive` would visit `target`
    fn drive_reaches(&self, drive: &Drive, target: ObjectKey) -> bool {
        let mut stack: SmallVec<[ObjectKey; 8]> = SmallVec::new();
        stack.push(drive.base);
        if let DriveSource::PairRelative { first, second } = drive.source {
            stack.push(first);
            stack.push(second);
        }

        let mut seen = FxHashSet::default();
        while let Some(key) = stack.pop() {
            if key == target {
                return true;
            }
            if !seen.insert(key) {
                continue;
            }
            if let Some(TransformNode::Driven(next)) = self.objects.get(key).map(SceneObject::node)
            {
                stack.push(next.base);
                if let DriveSource::PairRelative { first, second } = next.source {
                    stack.push(first);
                    stack.push(second);
                }
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Forces
    // ------------------------------------------------------------------

    /// Accumulate a force applied at a model-space point
    ///
    /// Force accumulates in world space; the induced torque accumulates in
    /// model space, from the model-space lever arm and the force converted
    /// into model coordinates.
    pub fn add_force(&mut self, key: ObjectKey, point: Vec3, force: Vec3) {
        let model_force = self.world_vector_in_model(key, force);
        let Some(object) = self.objects.get_mut(key) else {
            tracing::warn!(?key, "add_force on missing object");
            return;
        };
        object.accumulate(force, point.cross(model_force));
    }

    pub fn set_force_and_torque(&mut self, key: ObjectKey, force: Vec3, torque: Vec3) {
        if let Some(object) = self.objects.get_mut(key) {
            object.set_force_and_torque(force, torque);
        }
    }

    pub fn clear_forces(&mut self, key: ObjectKey) {
        if let Some(object) = self.objects.get_mut(key) {
            object.clear_forces();
        }
    }

    // ------------------------------------------------------------------
    // Last-location snapshot
    // ------------------------------------------------------------------

    /// Record the current effective placement for a later restore
    pub fn save_last_location(&mut self, key: ObjectKey) {
        let transform = self.local_transform(key);
        if let Some(object) = self.objects.get_mut(key) {
            object.set_last_location(transform.translation, transform.rotation);
        }
    }

    /// Move an authoritative object back to its saved placement
    pub fn restore_last_location(&mut self, key: ObjectKey) {
        let Some((position, orientation)) = self.objects.get(key).map(SceneObject::last_location)
        else {
            return;
        };
        self.set_pos_and_orient(key, position, orientation);
    }
}
