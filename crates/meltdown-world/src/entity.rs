//! The capability set shared by every simulated entity.
//!
//! Settlements, reactors, and contamination clouds each embed an
//! [`EntityCore`] and implement [`Entity`]. The set of kinds is closed: the
//! occupancy index and snapshots refer to entities through the tagged
//! [`EntityRef`] handle rather than through trait objects.

use meltdown_types::{EntityRef, GridPos};

/// Identity, position, and active flag common to all entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCore {
    handle: EntityRef,
    position: GridPos,
    /// Cleared once, never set again.
    active: bool,
}

impl EntityCore {
    /// Create an active core at `position`.
    pub const fn new(handle: EntityRef, position: GridPos) -> Self {
        Self {
            handle,
            position,
            active: true,
        }
    }

    /// Tagged identifier.
    pub const fn handle(&self) -> EntityRef {
        self.handle
    }

    /// Grid cell the entity occupies.
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Whether the entity is active.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Clear the active flag.
    pub const fn deactivate(&mut self) {
        self.active = false;
    }

    /// Move to `position`.
    pub const fn set_position(&mut self, position: GridPos) {
        self.position = position;
    }
}

/// Shared entity capabilities.
///
/// Deactivation is one-way: no method re-activates an entity.
pub trait Entity {
    /// Borrow the shared core.
    fn core(&self) -> &EntityCore;

    /// Mutably borrow the shared core.
    fn core_mut(&mut self) -> &mut EntityCore;

    /// The tagged handle for this entity.
    fn handle(&self) -> EntityRef {
        self.core().handle()
    }

    /// Current grid position.
    fn position(&self) -> GridPos {
        self.core().position()
    }

    /// Whether the entity still participates in the simulation.
    fn is_active(&self) -> bool {
        self.core().is_active()
    }

    /// Permanently deactivate the entity.
    fn deactivate(&mut self) {
        self.core_mut().deactivate();
    }
}
