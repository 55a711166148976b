//! Structural replication engine

use maquette_core::RigidTransform;
use maquette_scene::{Drive, MoveEvent, ObjectKey, PushEvent, SceneObserver, World};

/// Hard limit on the number of generated copies
pub const MAX_COPIES: usize = 100;

/// Replicates the transform between a master pair of objects onto a chain of
/// synthesized copies
///
/// With `delta = inverse(first.local) ∘ second.local`, replica `k` is kept at
/// `first.local ∘ delta^(k+2)`: each copy one more application of the step
/// the master pair demonstrates. The copy count can be changed dynamically;
/// copies live in the world like any other object, but the replicator keeps
/// their keys and is the only component that repositions or removes them.
pub struct StructureReplicator {
    first: ObjectKey,
    second: ObjectKey,
    delta: RigidTransform,
    replicas: Vec<ObjectKey>,
}

impl StructureReplicator {
    /// Create a replicator over a master pair
    ///
    /// Assumes the caller has validated that neither object is already bound
    /// into another structural relationship.
    pub fn new(world: &World, first: ObjectKey, second: ObjectKey) -> Self {
        Self {
            first,
            second,
            delta: world.relative_transform(first, second),
            replicas: Vec::new(),
        }
    }

    /// First master object
    pub fn first(&self) -> ObjectKey {
        self.first
    }

    /// Second master object
    pub fn second(&self) -> ObjectKey {
        self.second
    }

    /// Number of copies currently shown
    pub fn num_shown(&self) -> usize {
        self.replicas.len()
    }

    /// Iterator over the replica keys in chain order
    pub fn replicas(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.replicas.iter().copied()
    }

    /// Index of a replica in the chain, if `key` is one of ours
    pub fn replica_index(&self, key: ObjectKey) -> Option<usize> {
        self.replicas.iter().position(|&r| r == key)
    }

    /// Whether this replicator reacts to events on `key`
    pub fn watches(&self, key: ObjectKey) -> bool {
        key == self.first || key == self.second
    }

    /// Where a force applied to `replica` should land instead, and the scale
    /// to apply to it
    ///
    /// Forces on a copy are transferred to the second master object, scaled
    /// down by how many steps down the chain the copy sits, so manipulating a
    /// copy feels like manipulating the original.
    pub fn force_target(&self, replica: ObjectKey) -> Option<(ObjectKey, f64)> {
        self.replica_index(replica)
            .map(|k| (self.second, 1.0 / (k + 2) as f64))
    }

    /// Change the number of copies shown
    ///
    /// `num` is clamped to `[0, MAX_COPIES]`. Growth appends new copies
    /// (duplicating the master objects alternately); shrinkage removes the
    /// highest-index copies first. Calling with the current count changes
    /// nothing.
    pub fn set_num_shown(&mut self, world: &mut World, num: usize) {
        let num = num.min(MAX_COPIES);
        self.refresh_delta(world);

        if num > self.replicas.len() {
            let mut offset = self.delta.power(self.replicas.len() as u32 + 2);
            while self.replicas.len() < num {
                let source = if self.replicas.len() % 2 == 0 {
                    self.first
                } else {
                    self.second
                };
                let Some(copy) = world.duplicate(source) else {
                    tracing::warn!(?source, "master object missing, stopping replication");
                    break;
                };
                if let Err(err) = world.set_driven(copy, Drive::fixed(self.first, offset)) {
                    tracing::warn!(%err, "could not drive new replica");
                    world.remove_object(copy);
                    break;
                }
                self.replicas.push(copy);
                offset = offset * self.delta;
            }
            tracing::debug!(shown = self.replicas.len(), "replica chain grown");
        } else {
            while self.replicas.len() > num {
                if let Some(replica) = self.replicas.pop() {
                    world.remove_object(replica);
                }
            }
            tracing::debug!(shown = self.replicas.len(), "replica chain shrunk");
        }
    }

    /// Re-derive the delta from the master pair's live transforms and
    /// reposition every copy
    ///
    /// Every copy gets a full reassignment of its offset to `delta^(k+2)` by
    /// repeated composition: never an incremental nudge, since the pair may
    /// have moved arbitrarily far since the last refresh.
    pub fn update_transform(&mut self, world: &mut World) {
        self.refresh_delta(world);
        let mut offset = self.delta.power(2);
        for &replica in &self.replicas {
            if let Err(err) = world.set_driven(replica, Drive::fixed(self.first, offset)) {
                tracing::warn!(%err, ?replica, "could not reposition replica");
            }
            offset = offset * self.delta;
        }
    }

    /// Remove every copy from the world
    pub fn dissolve(&mut self, world: &mut World) {
        self.set_num_shown(world, 0);
    }

    fn refresh_delta(&mut self, world: &World) {
        self.delta = world.relative_transform(self.first, self.second);
    }
}

impl SceneObserver for StructureReplicator {
    fn object_pushed(&mut self, world: &mut World, event: PushEvent) {
        if self.watches(event.object) {
            self.update_transform(world);
        }
    }

    fn object_moved(&mut self, world: &mut World, event: MoveEvent) {
        if self.watches(event.object) {
            self.update_transform(world);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maquette_core::{quat_close, vec3_close, Quat, Vec3, DEFAULT_EPSILON};
    use maquette_scene::SceneObject;
    use std::f64::consts::PI;

    fn epsilon_at(step: usize) -> f64 {
        DEFAULT_EPSILON * step as f64
    }

    #[test]
    fn test_translation_only_chain() {
        let mut world = World::new();
        let first = world.add_object(SceneObject::new());
        let second = world.add_object(SceneObject::at(1.0, 0.0, 0.0));

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, 5);

        assert_eq!(rep.num_shown(), 5);
        assert_eq!(world.len(), 7);
        for (k, replica) in rep.replicas().enumerate() {
            let expected = Vec3::new((k + 2) as f64, 0.0, 0.0);
            assert!(vec3_close(
                world.position(replica),
                expected,
                epsilon_at(k + 2)
            ));
            assert!(quat_close(
                world.orientation(replica),
                Quat::IDENTITY,
                epsilon_at(k + 2)
            ));
        }
    }

    #[test]
    fn test_rotation_only_chain() {
        let step = PI / 22.0;
        let mut world = World::new();
        let first = world.add_object(SceneObject::at(0.0, 30.0, 0.0));
        let second = world.add_object(
            SceneObject::at(0.0, 30.0, 0.0).with_orientation(Quat::from_axis_angle(Vec3::Y, step)),
        );

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, 5);

        for (k, replica) in rep.replicas().enumerate() {
            let expected = Quat::from_axis_angle(Vec3::Y, step * (k + 2) as f64);
            assert!(vec3_close(
                world.position(replica),
                Vec3::new(0.0, 30.0, 0.0),
                epsilon_at(k + 2)
            ));
            assert!(quat_close(
                world.orientation(replica),
                expected,
                epsilon_at(k + 2)
            ));
        }
    }

    #[test]
    fn test_set_num_shown_idempotent() {
        let mut world = World::new();
        let first = world.add_object(SceneObject::new());
        let second = world.add_object(SceneObject::at(0.0, 2.0, 0.0));

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, 3);
        let keys: Vec<_> = rep.replicas().collect();
        let transforms: Vec<_> = keys.iter().map(|&k| world.local_transform(k)).collect();

        rep.set_num_shown(&mut world, 3);
        let keys_after: Vec<_> = rep.replicas().collect();
        assert_eq!(keys, keys_after);
        for (&key, &before) in keys.iter().zip(&transforms) {
            assert_eq!(world.local_transform(key), before);
        }
    }

    #[test]
    fn test_shrink_removes_highest_first() {
        let mut world = World::new();
        let first = world.add_object(SceneObject::new());
        let second = world.add_object(SceneObject::at(1.0, 0.0, 0.0));

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, 4);
        let keys: Vec<_> = rep.replicas().collect();

        rep.set_num_shown(&mut world, 2);
        assert_eq!(rep.num_shown(), 2);
        let kept: Vec<_> = rep.replicas().collect();
        assert_eq!(kept, keys[..2].to_vec());
        assert!(!world.contains(keys[2]));
        assert!(!world.contains(keys[3]));

        rep.set_num_shown(&mut world, 0);
        assert_eq!(rep.num_shown(), 0);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_count_clamped_to_max() {
        let mut world = World::new();
        let first = world.add_object(SceneObject::new());
        let second = world.add_object(SceneObject::at(1.0, 0.0, 0.0));

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, MAX_COPIES + 50);
        assert_eq!(rep.num_shown(), MAX_COPIES);
    }

    #[test]
    fn test_update_transform_tracks_new_delta() {
        let mut world = World::new();
        let first = world.add_object(SceneObject::new());
        let second = world.add_object(SceneObject::at(1.0, 0.0, 0.0));

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, 3);

        world.set_position(second, Vec3::new(0.0, 1.0, 0.0));
        rep.update_transform(&mut world);

        for (k, replica) in rep.replicas().enumerate() {
            let expected = Vec3::new(0.0, (k + 2) as f64, 0.0);
            assert!(vec3_close(
                world.position(replica),
                expected,
                epsilon_at(k + 2)
            ));
        }
    }

    #[test]
    fn test_whole_assembly_moves_with_first() {
        let mut world = World::new();
        let first = world.add_object(SceneObject::new());
        let second = world.add_object(SceneObject::at(1.0, 0.0, 0.0));

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, 2);

        // the chain is based on the first object, so it follows a move of
        // the base even before any refresh
        world.set_position(first, Vec3::new(0.0, 0.0, 5.0));
        let keys: Vec<_> = rep.replicas().collect();
        assert!(vec3_close(
            world.position(keys[0]),
            Vec3::new(2.0, 0.0, 5.0),
            epsilon_at(2)
        ));
        assert!(vec3_close(
            world.position(keys[1]),
            Vec3::new(3.0, 0.0, 5.0),
            epsilon_at(3)
        ));
    }

    #[test]
    fn test_replicas_copy_model_alternately() {
        let mut world = World::new();
        let first = world.add_object(SceneObject::new().with_model(maquette_scene::ModelId(1)));
        let second = world.add_object(
            SceneObject::at(1.0, 0.0, 0.0).with_model(maquette_scene::ModelId(2)),
        );

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, 4);

        let models: Vec<_> = rep
            .replicas()
            .map(|k| world.object(k).unwrap().model())
            .collect();
        assert_eq!(
            models,
            vec![
                Some(maquette_scene::ModelId(1)),
                Some(maquette_scene::ModelId(2)),
                Some(maquette_scene::ModelId(1)),
                Some(maquette_scene::ModelId(2)),
            ]
        );
    }

    #[test]
    fn test_force_target_scaling() {
        let mut world = World::new();
        let first = world.add_object(SceneObject::new());
        let second = world.add_object(SceneObject::at(1.0, 0.0, 0.0));

        let mut rep = StructureReplicator::new(&world, first, second);
        rep.set_num_shown(&mut world, 3);
        let keys: Vec<_> = rep.replicas().collect();

        assert_eq!(rep.force_target(keys[0]), Some((second, 0.5)));
        assert_eq!(rep.force_target(keys[2]), Some((second, 0.25)));
        assert_eq!(rep.force_target(first), None);
    }
}
