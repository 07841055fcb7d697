//! Bounded-retry random placement.
//!
//! Placement is a rejection sampler: draw a candidate cell uniformly, keep it
//! if the occupancy grid says it is valid and empty, otherwise draw again, up
//! to a fixed number of attempts. Running out of attempts is not an error at
//! this level; callers decide how to report it.

use meltdown_types::GridPos;
use rand::Rng;

use crate::occupancy::OccupancyGrid;

/// Random cell sampler with an explicit attempt ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementSampler {
    max_attempts: u32,
}

impl PlacementSampler {
    /// Create a sampler that probes at most `max_attempts` cells per request.
    pub const fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// The attempt ceiling.
    pub const fn max_attempts(self) -> u32 {
        self.max_attempts
    }

    /// Find a free cell anywhere on the map at height level `level`.
    pub fn sample_anywhere(
        self,
        grid: &OccupancyGrid,
        level: u32,
        rng: &mut impl Rng,
    ) -> Option<GridPos> {
        if grid.width() == 0 || grid.height() == 0 {
            return None;
        }
        let (width, height) = (grid.width(), grid.height());
        self.probe(grid, rng, |rng| {
            GridPos::new(rng.random_range(0..width), rng.random_range(0..height), level)
        })
    }

    /// Find a free cell within the square of half-width `radius` around
    /// `center`, at `center`'s height level. The square is clipped to the map.
    pub fn sample_near(
        self,
        grid: &OccupancyGrid,
        center: GridPos,
        radius: u32,
        rng: &mut impl Rng,
    ) -> Option<GridPos> {
        if !grid.is_valid(center) {
            return None;
        }
        let x_min = center.x.saturating_sub(radius);
        let x_max = center.x.saturating_add(radius).min(grid.width().saturating_sub(1));
        let y_min = center.y.saturating_sub(radius);
        let y_max = center.y.saturating_add(radius).min(grid.height().saturating_sub(1));
        self.probe(grid, rng, |rng| {
            GridPos::new(
                rng.random_range(x_min..=x_max),
                rng.random_range(y_min..=y_max),
                center.z,
            )
        })
    }

    fn probe<R: Rng>(
        self,
        grid: &OccupancyGrid,
        rng: &mut R,
        mut draw: impl FnMut(&mut R) -> GridPos,
    ) -> Option<GridPos> {
        (0..self.max_attempts)
            .map(|_| draw(rng))
            .find(|&candidate| grid.is_available(candidate))
    }
}

#[cfg(test)]
mod tests {
    use meltdown_types::{EntityRef, GROUND_LEVEL, ReactorId, SettlementId};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn anywhere_finds_free_ground_cell() {
        let mut rng = SmallRng::seed_from_u64(1);
        let grid = OccupancyGrid::new(400, 400);
        let pos = PlacementSampler::new(50).sample_anywhere(&grid, GROUND_LEVEL, &mut rng);
        let pos = pos.unwrap_or_else(|| GridPos::ground(u32::MAX, u32::MAX));
        assert!(grid.is_available(pos));
        assert_eq!(pos.z, GROUND_LEVEL);
    }

    #[test]
    fn zero_attempts_always_fails() {
        let mut rng = SmallRng::seed_from_u64(1);
        let grid = OccupancyGrid::new(400, 400);
        let sampler = PlacementSampler::new(0);
        assert_eq!(sampler.sample_anywhere(&grid, GROUND_LEVEL, &mut rng), None);
        assert_eq!(
            sampler.sample_near(&grid, GridPos::ground(200, 200), 40, &mut rng),
            None
        );
    }

    #[test]
    fn near_stays_inside_square() {
        let mut rng = SmallRng::seed_from_u64(9);
        let grid = OccupancyGrid::new(400, 400);
        let center = GridPos::ground(200, 100);
        let sampler = PlacementSampler::new(50);
        for _ in 0..500 {
            let Some(pos) = sampler.sample_near(&grid, center, 40, &mut rng) else {
                continue;
            };
            assert!((160..=240).contains(&pos.x));
            assert!((60..=140).contains(&pos.y));
        }
    }

    #[test]
    fn near_is_clipped_to_map_corner() {
        let mut rng = SmallRng::seed_from_u64(4);
        let grid = OccupancyGrid::new(400, 400);
        let sampler = PlacementSampler::new(50);
        for _ in 0..200 {
            if let Some(pos) = sampler.sample_near(&grid, GridPos::ground(399, 0), 10, &mut rng) {
                assert!(pos.x >= 389 && pos.x <= 399);
                assert!(pos.y <= 10);
            }
        }
    }

    #[test]
    fn exhausted_neighbourhood_fails() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut grid = OccupancyGrid::new(400, 400);
        // Radius 1 around the origin covers exactly four cells.
        assert!(grid.place_handle(EntityRef::Settlement(SettlementId(1)), GridPos::ground(0, 0)));
        assert!(grid.place_handle(EntityRef::Reactor(ReactorId(1)), GridPos::ground(1, 0)));
        assert!(grid.place_handle(EntityRef::Reactor(ReactorId(2)), GridPos::ground(0, 1)));
        assert!(grid.place_handle(EntityRef::Reactor(ReactorId(3)), GridPos::ground(1, 1)));
        let found = PlacementSampler::new(500).sample_near(&grid, GridPos::ground(0, 0), 1, &mut rng);
        assert_eq!(found, None);
    }

    #[test]
    fn near_rejects_invalid_center() {
        let mut rng = SmallRng::seed_from_u64(2);
        let grid = OccupancyGrid::new(400, 400);
        let found = PlacementSampler::new(50).sample_near(&grid, GridPos::ground(400, 0), 5, &mut rng);
        assert_eq!(found, None);
    }
}
