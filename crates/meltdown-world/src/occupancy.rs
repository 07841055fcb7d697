//! Occupancy index: at most one entity per grid cell.
//!
//! The index is a sparse map from [`GridPos`] to the [`EntityRef`] placed
//! there. It does not own entities; it only arbitrates placement.
//!
//! There is no removal operation. Entities are deactivated, never evicted,
//! so an inactive entity keeps its cell for the rest of the run. Over a long
//! run this caps total entity density.

use std::collections::BTreeMap;

use meltdown_types::{EntityRef, GridPos, HEIGHT_LEVELS};

use crate::entity::Entity;

/// Bounded 3D grid recording which entity occupies each cell.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    /// Number of columns.
    width: u32,
    /// Number of rows.
    height: u32,
    /// Occupied cells.
    cells: BTreeMap<GridPos, EntityRef>,
}

impl OccupancyGrid {
    /// Create an empty grid of `width` x `height` x [`HEIGHT_LEVELS`].
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: BTreeMap::new(),
        }
    }

    /// Map width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Map height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether `pos` lies within `[0,width) x [0,height) x [0,HEIGHT_LEVELS)`.
    pub const fn is_valid(&self, pos: GridPos) -> bool {
        pos.x < self.width && pos.y < self.height && pos.z < HEIGHT_LEVELS
    }

    /// Whether no entity is indexed at `pos`.
    pub fn is_empty(&self, pos: GridPos) -> bool {
        !self.cells.contains_key(&pos)
    }

    /// The entity indexed at `pos`, if any.
    pub fn occupant(&self, pos: GridPos) -> Option<EntityRef> {
        self.cells.get(&pos).copied()
    }

    /// Record `entity` at its current position.
    ///
    /// Returns `false` and changes nothing if the position is out of bounds
    /// or already occupied.
    pub fn place<E: Entity>(&mut self, entity: &E) -> bool {
        self.place_handle(entity.handle(), entity.position())
    }

    /// Record `handle` at `pos`. Same contract as [`place`](Self::place).
    pub fn place_handle(&mut self, handle: EntityRef, pos: GridPos) -> bool {
        if !self.is_valid(pos) || !self.is_empty(pos) {
            return false;
        }
        self.cells.insert(pos, handle);
        true
    }

    /// Whether `pos` is valid and free.
    pub fn is_available(&self, pos: GridPos) -> bool {
        self.is_valid(pos) && self.is_empty(pos)
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use meltdown_types::{ContaminationId, ReactorId, SettlementId};

    use super::*;

    #[test]
    fn bounds_are_half_open() {
        let grid = OccupancyGrid::new(400, 500);
        assert!(grid.is_valid(GridPos::new(0, 0, 0)));
        assert!(grid.is_valid(GridPos::new(399, 499, 1)));
        assert!(!grid.is_valid(GridPos::new(400, 0, 0)));
        assert!(!grid.is_valid(GridPos::new(0, 500, 0)));
        assert!(!grid.is_valid(GridPos::new(0, 0, 2)));
    }

    #[test]
    fn place_rejects_occupied_cell() {
        let mut grid = OccupancyGrid::new(400, 400);
        let pos = GridPos::ground(10, 10);
        assert!(grid.place_handle(EntityRef::Settlement(SettlementId(1)), pos));
        assert!(!grid.place_handle(EntityRef::Reactor(ReactorId(1)), pos));
        assert_eq!(grid.occupant(pos), Some(EntityRef::Settlement(SettlementId(1))));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn place_rejects_out_of_bounds() {
        let mut grid = OccupancyGrid::new(400, 400);
        assert!(!grid.place_handle(
            EntityRef::Reactor(ReactorId(1)),
            GridPos::ground(400, 3)
        ));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn levels_are_independent() {
        let mut grid = OccupancyGrid::new(400, 400);
        let ground = GridPos::ground(5, 5);
        assert!(grid.place_handle(EntityRef::Reactor(ReactorId(1)), ground));
        assert!(grid.place_handle(
            EntityRef::Contamination(ContaminationId(1)),
            ground.with_level(1)
        ));
        assert!(!grid.is_empty(ground));
        assert!(!grid.is_empty(ground.with_level(1)));
    }
}
