//! Scene error taxonomy
//!
//! Everything here is local and recoverable; nothing in the scene core is
//! fatal to the host process. Pair-level link failures are reported as plain
//! boolean returns by the relationship engines, not through this enum.

use crate::world::ObjectKey;
use thiserror::Error;

/// Failures from `Result`-returning world operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The referenced object is not (or no longer) in the world
    #[error("object {0:?} is not in the world")]
    MissingObject(ObjectKey),

    /// Installing the drive would make the object's transform depend,
    /// directly or transitively, on itself
    #[error("drive on {0:?} would create a cyclic transform dependency")]
    DriveCycle(ObjectKey),
}
