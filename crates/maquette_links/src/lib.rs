//! # Maquette Links
//!
//! The structure-relationship engines of the Maquette editor core:
//!
//! - [`StructureReplicator`]: synthesizes a chain of derived copies from a
//!   master pair's relative transform and keeps the chain synchronized as the
//!   pair moves or the copy count changes
//! - [`TransformEquals`]: links independent object pairs to one shared delta
//!   transform, re-electing which pair is "master" as push notifications
//!   arrive
//! - [`Project`]: owns the world plus every engine and delivers push/move
//!   events to them synchronously
//!
//! Both engines borrow the world per call instead of holding references into
//! it, which is what keeps event delivery a plain synchronous function call.

pub mod project;
pub mod replicator;
pub mod transform_equals;

pub use project::{LinkId, Project, ReplicatorId};
pub use replicator::{StructureReplicator, MAX_COPIES};
pub use transform_equals::{LinkMode, ObjectPair, TransformEquals};
