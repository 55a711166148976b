//! Project façade: the world plus its relationship engines
//!
//! Manipulation enters through here so that every mutation is followed,
//! synchronously and before the call returns, by delivery of the matching
//! event to each engine watching the object. Engines never hold references
//! into the world; they get `&mut World` per call, which is what makes the
//! synchronous dispatch borrow-clean.

use crate::replicator::StructureReplicator;
use crate::transform_equals::TransformEquals;
use maquette_core::{Quat, Vec3};
use maquette_scene::{MoveEvent, ObjectKey, PushEvent, SceneObject, SceneObserver, World};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a replicator owned by a [`Project`]
    pub struct ReplicatorId;

    /// Handle to a transform-equality linker owned by a [`Project`]
    pub struct LinkId;
}

/// Owns the world, every structure relationship, and the event dispatch
/// between them
#[derive(Default)]
pub struct Project {
    world: World,
    replicators: SlotMap<ReplicatorId, StructureReplicator>,
    links: SlotMap<LinkId, TransformEquals>,
}

impl Project {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            replicators: SlotMap::with_key(),
            links: SlotMap::with_key(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    // ------------------------------------------------------------------
    // Object lifecycle
    // ------------------------------------------------------------------

    pub fn add_object(&mut self, object: SceneObject) -> ObjectKey {
        self.world.add_object(object)
    }

    /// Remove an object from the world
    ///
    /// The caller is responsible for first unlinking it from any relationship
    /// that references it; a dangling reference degrades to identity reads.
    pub fn remove_object(&mut self, object: ObjectKey) -> Option<SceneObject> {
        self.world.remove_object(object)
    }

    // ------------------------------------------------------------------
    // Manipulation entry points
    // ------------------------------------------------------------------

    /// Apply a force at a model-space point of an object
    ///
    /// A force landing on a generated replica is redirected to the structure's
    /// original object, scaled by the replica's distance down the chain. The
    /// push notification, any master re-election, and all dependent transform
    /// propagation complete before this returns.
    pub fn apply_force(&mut self, object: ObjectKey, point: Vec3, force: Vec3) {
        let mut target = (object, 1.0);
        for rep in self.replicators.values() {
            if let Some((original, scale)) = rep.force_target(object) {
                target = (original, scale);
                break;
            }
        }
        let (object, scale) = target;
        self.world.add_force(object, point, force * scale);
        self.notify_pushed(object);
    }

    pub fn set_position(&mut self, object: ObjectKey, position: Vec3) {
        self.world.set_position(object, position);
        self.notify_moved(object);
    }

    pub fn set_orientation(&mut self, object: ObjectKey, orientation: Quat) {
        self.world.set_orientation(object, orientation);
        self.notify_moved(object);
    }

    pub fn set_pos_and_orient(&mut self, object: ObjectKey, position: Vec3, orientation: Quat) {
        self.world.set_pos_and_orient(object, position, orientation);
        self.notify_moved(object);
    }

    pub fn clear_forces(&mut self, object: ObjectKey) {
        self.world.clear_forces(object);
    }

    /// Per-frame tick: refresh every replica chain against its master pair
    pub fn update(&mut self) {
        for rep in self.replicators.values_mut() {
            rep.update_transform(&mut self.world);
        }
    }

    // ------------------------------------------------------------------
    // Structure replicators
    // ------------------------------------------------------------------

    pub fn add_replicator(&mut self, first: ObjectKey, second: ObjectKey) -> ReplicatorId {
        let rep = StructureReplicator::new(&self.world, first, second);
        self.replicators.insert(rep)
    }

    pub fn replicator(&self, id: ReplicatorId) -> Option<&StructureReplicator> {
        self.replicators.get(id)
    }

    pub fn replicators(&self) -> impl Iterator<Item = (ReplicatorId, &StructureReplicator)> {
        self.replicators.iter()
    }

    pub fn set_replica_count(&mut self, id: ReplicatorId, num: usize) {
        if let Some(rep) = self.replicators.get_mut(id) {
            rep.set_num_shown(&mut self.world, num);
        }
    }

    /// Destroy a replicator, removing all of its copies from the world
    pub fn remove_replicator(&mut self, id: ReplicatorId) {
        if let Some(mut rep) = self.replicators.remove(id) {
            rep.dissolve(&mut self.world);
        }
    }

    // ------------------------------------------------------------------
    // Transform-equality links
    // ------------------------------------------------------------------

    /// Create a linker from an initial pair; `None` if the pair is invalid
    pub fn add_link(&mut self, first: ObjectKey, second: ObjectKey) -> Option<LinkId> {
        let link = TransformEquals::new(&mut self.world, first, second)?;
        Some(self.links.insert(link))
    }

    pub fn link(&self, id: LinkId) -> Option<&TransformEquals> {
        self.links.get(id)
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &TransformEquals)> {
        self.links.iter()
    }

    pub fn link_add_pair(&mut self, id: LinkId, first: ObjectKey, second: ObjectKey) -> bool {
        // the pair may not collide with any other linker's seconds either;
        // the world-level drive ownership check inside add_pair covers that
        match self.links.get_mut(id) {
            Some(link) => link.add_pair(&mut self.world, first, second),
            None => false,
        }
    }

    pub fn link_remove_pair(&mut self, id: LinkId, first: ObjectKey, second: ObjectKey) {
        if let Some(link) = self.links.get_mut(id) {
            link.remove_pair(&mut self.world, first, second);
        }
    }

    pub fn link_remove_pair_by_first(&mut self, id: LinkId, first: ObjectKey) {
        if let Some(link) = self.links.get_mut(id) {
            link.remove_pair_by_first(&mut self.world, first);
        }
    }

    pub fn link_remove_pair_by_second(&mut self, id: LinkId, second: ObjectKey) {
        if let Some(link) = self.links.get_mut(id) {
            link.remove_pair_by_second(&mut self.world, second);
        }
    }

    /// Destroy a linker, restoring every second to authoritative mode
    pub fn remove_link(&mut self, id: LinkId) {
        if let Some(mut link) = self.links.remove(id) {
            link.dissolve(&mut self.world);
        }
    }

    // ------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------

    fn notify_pushed(&mut self, object: ObjectKey) {
        let event = PushEvent { object };
        for rep in self.replicators.values_mut() {
            if rep.watches(object) {
                rep.object_pushed(&mut self.world, event);
            }
        }
        for link in self.links.values_mut() {
            if link.watches(object) {
                link.object_pushed(&mut self.world, event);
            }
        }
    }

    fn notify_moved(&mut self, object: ObjectKey) {
        let event = MoveEvent { object };
        for rep in self.replicators.values_mut() {
            if rep.watches(object) {
                rep.object_moved(&mut self.world, event);
            }
        }
        for link in self.links.values_mut() {
            if link.watches(object) {
                link.object_moved(&mut self.world, event);
            }
        }
    }
}
