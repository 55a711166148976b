//! Transform-equality engine

use maquette_core::RigidTransform;
use maquette_scene::{Drive, ObjectKey, PushEvent, SceneObserver, World};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An ordered pair of linked objects
///
/// The first can be used freely to place the pair as a whole; manipulating a
/// second changes the shared relation for every pair in the linker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPair {
    pub first: ObjectKey,
    pub second: ObjectKey,
}

/// How the shared delta is sourced
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkMode {
    /// The delta is a fixed baked transform; every second is a rigid
    /// satellite of its first and no pair is master
    PositionCopies,
    /// The delta is re-derived from the master pair's live transforms on
    /// every query; the master's second is detached (authoritative)
    EditTransform,
}

/// Keeps the relative transform of several object pairs equal
///
/// "A is to B as C is to D": one pair is the master the shared delta is read
/// from, and every other pair's second is driven from that delta composed with
/// its own first. Which pair is master is re-elected from push notifications -
/// pushing a pair's *second* makes that pair the transform source
/// ([`LinkMode::EditTransform`]); pushing any *first* freezes the current
/// delta into a baked copy ([`LinkMode::PositionCopies`]).
pub struct TransformEquals {
    pairs: SmallVec<[ObjectPair; 4]>,
    /// Every key occupying a slot of some pair, for dispatch filtering
    watched: FxHashSet<ObjectKey>,
    mode: LinkMode,
    master: Option<usize>,
    /// Shared delta while no live master defines it
    baked: RigidTransform,
}

impl TransformEquals {
    /// Create a linker seeded with one pair
    ///
    /// Starts in [`LinkMode::PositionCopies`] with the delta baked from the
    /// constructing pair, so the second keeps its placement. Returns `None`
    /// if the pair fails validation (e.g. `second` is already driven).
    pub fn new(world: &mut World, first: ObjectKey, second: ObjectKey) -> Option<Self> {
        let mut link = Self {
            pairs: SmallVec::new(),
            watched: FxHashSet::default(),
            mode: LinkMode::PositionCopies,
            master: None,
            baked: RigidTransform::IDENTITY,
        };
        link.add_pair(world, first, second).then_some(link)
    }

    pub fn pairs(&self) -> &[ObjectPair] {
        &self.pairs
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    /// Index of the pair currently defining the delta, if any
    pub fn master_index(&self) -> Option<usize> {
        self.master
    }

    /// Whether this linker reacts to events on `key`
    pub fn watches(&self, key: ObjectKey) -> bool {
        self.watched.contains(&key)
    }

    /// The shared delta as of right now
    pub fn current_delta(&self, world: &World) -> RigidTransform {
        match self.master.and_then(|m| self.pairs.get(m)) {
            Some(master) if self.mode == LinkMode::EditTransform => {
                world.relative_transform(master.first, master.second)
            }
            _ => self.baked,
        }
    }

    /// Link another pair into the shared relation
    ///
    /// Validates that neither object already occupies a slot of this linker,
    /// that `second` is not driven by anything else, and that the drive would
    /// not be cyclic. On success the new second snaps to the current delta
    /// composed with its first immediately. On failure returns `false` with
    /// no state change.
    pub fn add_pair(&mut self, world: &mut World, first: ObjectKey, second: ObjectKey) -> bool {
        if first == second {
            return false;
        }
        if self.watched.contains(&first) || self.watched.contains(&second) {
            tracing::debug!(?first, ?second, "pair rejected: object already linked");
            return false;
        }
        if world.is_driven(second) {
            tracing::debug!(?second, "pair rejected: second already driven elsewhere");
            return false;
        }

        if self.pairs.is_empty() {
            self.baked = world.relative_transform(first, second);
        }
        let drive = match self.master.and_then(|m| self.pairs.get(m).copied()) {
            Some(master) if self.mode == LinkMode::EditTransform => {
                Drive::pair_relative(first, master.first, master.second)
            }
            _ => Drive::fixed(first, self.baked),
        };
        if world.set_driven(second, drive).is_err() {
            tracing::debug!(?first, ?second, "pair rejected: drive would be cyclic");
            return false;
        }

        self.pairs.push(ObjectPair { first, second });
        self.watched.insert(first);
        self.watched.insert(second);
        true
    }

    /// Unlink the pair at `index`
    ///
    /// The pair's second goes back to authoritative mode at its last-known
    /// placement. If the master pair is removed, the then-current delta is
    /// frozen into the remaining pairs and **no new master is elected**: the
    /// caller re-elects with a subsequent push if one is wanted.
    pub fn remove_pair_at(&mut self, world: &mut World, index: usize) {
        if index >= self.pairs.len() {
            return;
        }
        let removed = self.pairs.remove(index);
        world.clear_driven(removed.second);
        self.watched.remove(&removed.first);
        self.watched.remove(&removed.second);

        match self.master {
            Some(m) if m == index => {
                // the removed pair still holds the relation it defined
                self.baked = world.relative_transform(removed.first, removed.second);
                self.master = None;
                for pair in &self.pairs {
                    if let Err(err) =
                        world.set_driven(pair.second, Drive::fixed(pair.first, self.baked))
                    {
                        tracing::warn!(%err, "could not freeze linked pair");
                    }
                }
                tracing::debug!("master pair removed, delta frozen until next push");
            }
            Some(m) if m > index => self.master = Some(m - 1),
            _ => {}
        }
    }

    /// Unlink an exact pair
    pub fn remove_pair(&mut self, world: &mut World, first: ObjectKey, second: ObjectKey) {
        for i in (0..self.pairs.len()).rev() {
            if self.pairs[i].first == first && self.pairs[i].second == second {
                self.remove_pair_at(world, i);
            }
        }
    }

    /// Unlink every pair whose first is `first`
    pub fn remove_pair_by_first(&mut self, world: &mut World, first: ObjectKey) {
        for i in (0..self.pairs.len()).rev() {
            if self.pairs[i].first == first {
                self.remove_pair_at(world, i);
            }
        }
    }

    /// Unlink every pair whose second is `second`
    pub fn remove_pair_by_second(&mut self, world: &mut World, second: ObjectKey) {
        for i in (0..self.pairs.len()).rev() {
            if self.pairs[i].second == second {
                self.remove_pair_at(world, i);
            }
        }
    }

    /// Unlink everything, restoring every second to authoritative mode
    pub fn dissolve(&mut self, world: &mut World) {
        while !self.pairs.is_empty() {
            self.remove_pair_at(world, self.pairs.len() - 1);
        }
    }

    /// Make `index` the transform source and drive everyone else from it
    fn elect_master(&mut self, world: &mut World, index: usize) {
        let Some(&master) = self.pairs.get(index) else {
            return;
        };
        self.mode = LinkMode::EditTransform;
        self.master = Some(index);
        world.clear_driven(master.second);
        for (i, pair) in self.pairs.iter().enumerate() {
            if i == index {
                continue;
            }
            let drive = Drive::pair_relative(pair.first, master.first, master.second);
            if let Err(err) = world.set_driven(pair.second, drive) {
                tracing::warn!(%err, "could not drive linked pair from new master");
            }
        }
        tracing::debug!(index, "master pair elected");
    }

    /// Freeze the live delta and stop tracking any pair
    fn bake(&mut self, world: &mut World) {
        self.baked = self.current_delta(world);
        self.mode = LinkMode::PositionCopies;
        self.master = None;
        for pair in &self.pairs {
            if let Err(err) = world.set_driven(pair.second, Drive::fixed(pair.first, self.baked)) {
                tracing::warn!(%err, "could not drive linked pair from baked delta");
            }
        }
        tracing::debug!("delta baked, no master");
    }
}

impl SceneObserver for TransformEquals {
    fn object_pushed(&mut self, world: &mut World, event: PushEvent) {
        if let Some(index) = self
            .pairs
            .iter()
            .position(|pair| pair.second == event.object)
        {
            if self.master != Some(index) || self.mode == LinkMode::PositionCopies {
                self.elect_master(world, index);
            }
        } else if self.pairs.iter().any(|pair| pair.first == event.object)
            && self.mode != LinkMode::PositionCopies
        {
            self.bake(world);
        }
    }
}
