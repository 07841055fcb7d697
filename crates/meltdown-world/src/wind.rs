//! Ambient wind for the Meltdown simulation.
//!
//! The wind is refreshed once per tick, before assignment, by drawing one of
//! the nine [`WindDirection`] readings uniformly. The previous reading is
//! kept so the tick report can flag a shift.

use meltdown_types::WindDirection;
use rand::Rng;

/// Per-tick wind generator.
#[derive(Debug, Clone)]
pub struct WindSystem {
    /// The reading for the current tick.
    current: WindDirection,

    /// The reading from the tick before.
    previous: WindDirection,
}

impl WindSystem {
    /// Create a wind system starting calm.
    pub const fn new() -> Self {
        Self {
            current: WindDirection::Calm,
            previous: WindDirection::Calm,
        }
    }

    /// Draw a new reading for this tick and return it.
    pub fn refresh(&mut self, rng: &mut impl Rng) -> WindDirection {
        let index = rng.random_range(0..WindDirection::ALL.len());
        let next = WindDirection::ALL
            .get(index)
            .copied()
            .unwrap_or(WindDirection::Calm);
        self.previous = self.current;
        self.current = next;
        next
    }

    /// The current reading.
    pub const fn current(&self) -> WindDirection {
        self.current
    }

    /// The reading before the last refresh.
    pub const fn previous(&self) -> WindDirection {
        self.previous
    }

    /// Whether the last refresh changed the reading.
    pub fn changed(&self) -> bool {
        self.current != self.previous
    }
}

impl Default for WindSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn starts_calm() {
        let wind = WindSystem::new();
        assert_eq!(wind.current(), WindDirection::Calm);
        assert_eq!(wind.previous(), WindDirection::Calm);
        assert!(!wind.changed());
    }

    #[test]
    fn refresh_tracks_previous() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut wind = WindSystem::new();
        let first = wind.refresh(&mut rng);
        let second = wind.refresh(&mut rng);
        assert_eq!(wind.previous(), first);
        assert_eq!(wind.current(), second);
    }

    #[test]
    fn refresh_is_reproducible() {
        let mut rng_a = SmallRng::seed_from_u64(7);
        let mut rng_b = SmallRng::seed_from_u64(7);
        let mut a = WindSystem::new();
        let mut b = WindSystem::new();
        for tick in 0..100 {
            assert_eq!(a.refresh(&mut rng_a), b.refresh(&mut rng_b), "diverged at {tick}");
        }
    }

    #[test]
    fn every_reading_appears() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut wind = WindSystem::new();
        let mut counts = [0_u32; 9];
        for _ in 0..9_000 {
            let reading = wind.refresh(&mut rng);
            let index = WindDirection::ALL
                .iter()
                .position(|&w| w == reading)
                .unwrap_or_default();
            counts[index] += 1;
        }
        // Uniform draw: expect about 1000 each.
        for (reading, count) in WindDirection::ALL.iter().zip(counts) {
            assert!((800..1200).contains(&count), "{reading} drawn {count} times");
        }
    }

    #[test]
    fn changed_compares_last_two_readings() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut wind = WindSystem::new();
        let mut repeats = 0;
        for _ in 0..200 {
            let before = wind.current();
            let now = wind.refresh(&mut rng);
            assert_eq!(wind.changed(), now != before);
            if !wind.changed() {
                repeats += 1;
            }
        }
        // One in nine draws repeats the previous reading.
        assert!(repeats > 0);
    }
}
