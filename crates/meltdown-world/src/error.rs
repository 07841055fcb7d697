//! Error types for the `meltdown-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use meltdown_types::{ContaminationId, EntityKind, GridPos, ReactorId, SettlementId};

/// Errors that can occur during world construction and entity placement.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Startup parameters were rejected. No world is created.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Explanation of what is wrong with the parameters.
        reason: String,
    },

    /// The target cell is outside the grid or already occupied.
    #[error("cell {0} is out of bounds or occupied")]
    CellUnavailable(GridPos),

    /// The bounded random probe found no empty, valid cell.
    #[error("no free cell for {kind} after {attempts} attempts")]
    PlacementFailed {
        /// The kind of entity that could not be placed.
        kind: EntityKind,
        /// Number of candidate cells probed.
        attempts: u32,
    },

    /// The world already holds the maximum number of this kind of entity.
    #[error("{kind} limit of {max} reached")]
    CapacityReached {
        /// The kind of entity at its limit.
        kind: EntityKind,
        /// The configured maximum.
        max: u32,
    },

    /// A settlement was not found in the world.
    #[error("settlement not found: {0}")]
    SettlementNotFound(SettlementId),

    /// A reactor was not found in the world.
    #[error("reactor not found: {0}")]
    ReactorNotFound(ReactorId),

    /// A contamination cloud was not found in the world.
    #[error("contamination not found: {0}")]
    ContaminationNotFound(ContaminationId),

    /// An identifier counter would overflow.
    #[error("identifier space exhausted for {0}")]
    IdOverflow(EntityKind),
}
