//! Scene object and its transform node

use crate::world::ObjectKey;
use maquette_core::{Quat, RigidTransform, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier of a shape resource an object instantiates
///
/// Resolution of the resource itself (meshes, conformations) is owned by the
/// host's model manager; the scene only carries the reference so synthesized
/// copies can point at the same shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(pub u32);

/// How a driven object's offset from its base is obtained
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DriveSource {
    /// A baked offset that no longer tracks any object
    Fixed(RigidTransform),
    /// Re-derived on every query as `inverse(first.local) ∘ second.local`
    /// from the referenced pair's live transforms
    PairRelative { first: ObjectKey, second: ObjectKey },
}

/// Recipe for computing a driven object's local transform
///
/// The driven object's transform is `base.local ∘ offset`, where the offset
/// comes from the [`DriveSource`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drive {
    /// Object whose local transform the offset is composed onto
    pub base: ObjectKey,
    pub source: DriveSource,
}

impl Drive {
    pub const fn fixed(base: ObjectKey, offset: RigidTransform) -> Self {
        Self {
            base,
            source: DriveSource::Fixed(offset),
        }
    }

    pub const fn pair_relative(base: ObjectKey, first: ObjectKey, second: ObjectKey) -> Self {
        Self {
            base,
            source: DriveSource::PairRelative { first, second },
        }
    }
}

/// The two states an object's local transform can be in
///
/// Exactly one of:
/// - *authoritative*: the stored position/orientation are canonical;
/// - *driven*: position/orientation are evaluated from a [`Drive`] on every
///   query and nothing is stored.
///
/// Transitions go through [`World::set_driven`](crate::World::set_driven) and
/// [`World::clear_driven`](crate::World::clear_driven) so the snapshot rules
/// cannot be bypassed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransformNode {
    Authoritative { position: Vec3, orientation: Quat },
    Driven(Drive),
}

/// A rigid object in the world
///
/// Owns its transform node, an optional model reference, visibility, force and
/// torque accumulators, and a last-location snapshot used by grab-style
/// interactions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneObject {
    node: TransformNode,
    model: Option<ModelId>,
    visible: bool,
    force: Vec3,
    torque: Vec3,
    last_position: Vec3,
    last_orientation: Quat,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneObject {
    /// Create an authoritative object at the origin
    pub fn new() -> Self {
        Self {
            node: TransformNode::Authoritative {
                position: Vec3::ZERO,
                orientation: Quat::IDENTITY,
            },
            model: None,
            visible: true,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            last_position: Vec3::ZERO,
            last_orientation: Quat::IDENTITY,
        }
    }

    /// Create at a position
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self::new().with_position(Vec3::new(x, y, z))
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        if let TransformNode::Authoritative { position: p, .. } = &mut self.node {
            *p = position;
        }
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        if let TransformNode::Authoritative { orientation: o, .. } = &mut self.node {
            *o = orientation;
        }
        self
    }

    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn node(&self) -> &TransformNode {
        &self.node
    }

    pub fn is_driven(&self) -> bool {
        matches!(self.node, TransformNode::Driven(_))
    }

    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    pub fn set_model(&mut self, model: Option<ModelId>) {
        self.model = model;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Accumulated force, in world space
    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Accumulated torque, in model space
    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /// Position/orientation captured by the last
    /// [`World::save_last_location`](crate::World::save_last_location)
    pub fn last_location(&self) -> (Vec3, Quat) {
        (self.last_position, self.last_orientation)
    }

    pub(crate) fn set_node_authoritative(&mut self, position: Vec3, orientation: Quat) {
        self.node = TransformNode::Authoritative {
            position,
            orientation,
        };
    }

    pub(crate) fn set_node_driven(&mut self, drive: Drive) {
        self.node = TransformNode::Driven(drive);
    }

    pub(crate) fn accumulate(&mut self, force: Vec3, torque: Vec3) {
        self.force += force;
        self.torque += torque;
    }

    pub(crate) fn set_force_and_torque(&mut self, force: Vec3, torque: Vec3) {
        self.force = force;
        self.torque = torque;
    }

    pub(crate) fn set_last_location(&mut self, position: Vec3, orientation: Quat) {
        self.last_position = position;
        self.last_orientation = orientation;
    }
}
