//! Settlements: population centers that draw power from one reactor.
//!
//! Each tick a settlement drifts its population and recomputes its demand.
//! Its contamination level is raised only by contamination clouds and is
//! never decayed here, so once a settlement crosses the severe threshold it
//! stays in the severe-decline regime for the rest of the run.

use meltdown_types::{EntityRef, GridPos, ReactorId, SettlementId, THRIVING_POPULATION_FRACTION};
use rand::Rng;

use crate::entity::{Entity, EntityCore};

/// Energy demand per inhabitant, in MW.
pub const ENERGY_PER_CAPITA: f64 = 0.0005;

/// Contamination level at or above which population collapses.
pub const SEVERE_CONTAMINATION_THRESHOLD: f64 = 20.0;

/// Upper bound of the contamination level.
pub const MAX_CONTAMINATION_LEVEL: f64 = 100.0;

/// Draws at or above this value grow the population.
const GROWTH_PROBABILITY_FLOOR: f64 = 0.35;

/// Draws at or below this value shrink the population.
const DECLINE_PROBABILITY_CEILING: f64 = 0.1;

/// Growth rate is `0.001 + u * 0.03` for a uniform `u` in `[0, 1)`.
const GROWTH_RATE_BASE: f64 = 0.001;
const GROWTH_RATE_SPAN: f64 = 0.03;

/// Decline rate is `0.001 + u * 0.005`.
const DECLINE_RATE_BASE: f64 = 0.001;
const DECLINE_RATE_SPAN: f64 = 0.005;

/// How strongly contamination scales the severe reduction factor.
const SEVERE_REDUCTION_WEIGHT: f64 = 0.75;

/// A population center.
#[derive(Debug, Clone)]
pub struct Settlement {
    core: EntityCore,
    id: SettlementId,
    population: u64,
    original_population: u64,
    energy_demand: f64,
    contamination_level: f64,
    /// Non-owning lookup key into the world's reactor table.
    reactor: Option<ReactorId>,
}

impl Settlement {
    /// Create an unconnected, uncontaminated settlement.
    pub fn new(id: SettlementId, position: GridPos, population: u64) -> Self {
        Self {
            core: EntityCore::new(EntityRef::Settlement(id), position),
            id,
            population,
            original_population: population,
            energy_demand: demand_for(population),
            contamination_level: 0.0,
            reactor: None,
        }
    }

    /// Settlement identifier.
    pub const fn id(&self) -> SettlementId {
        self.id
    }

    /// Current population.
    pub const fn population(&self) -> u64 {
        self.population
    }

    /// Population at creation.
    pub const fn original_population(&self) -> u64 {
        self.original_population
    }

    /// The floor population never drops below: 90% of the original, rounded down.
    pub const fn minimum_population(&self) -> u64 {
        self.original_population.saturating_mul(9) / 10
    }

    /// Whether population is still at least 40% of the original.
    #[allow(clippy::cast_precision_loss)]
    pub fn is_thriving(&self) -> bool {
        self.population as f64 >= self.original_population as f64 * THRIVING_POPULATION_FRACTION
    }

    /// Current demand in MW.
    pub const fn energy_demand(&self) -> f64 {
        self.energy_demand
    }

    /// Contamination level in `[0, 100]`.
    pub const fn contamination_level(&self) -> f64 {
        self.contamination_level
    }

    /// The reactor this settlement is linked to, if any.
    pub const fn reactor(&self) -> Option<ReactorId> {
        self.reactor
    }

    /// Link to `reactor`. The reactor side is updated by the caller.
    pub const fn connect(&mut self, reactor: ReactorId) {
        self.reactor = Some(reactor);
    }

    /// Clear the link and return the reactor it pointed at.
    pub const fn disconnect(&mut self) -> Option<ReactorId> {
        self.reactor.take()
    }

    /// Raise the contamination level by `intensity`, capped at 100.
    pub fn contaminate(&mut self, intensity: f64) {
        self.contamination_level =
            (self.contamination_level + intensity).min(MAX_CONTAMINATION_LEVEL);
    }

    /// Overwrite the contamination level, clamped into `[0, 100]`.
    ///
    /// Nothing in the tick calls this; it exists for operators and tests.
    pub fn set_contamination_level(&mut self, level: f64) {
        self.contamination_level = level.clamp(0.0, MAX_CONTAMINATION_LEVEL);
    }

    /// Advance one tick: drift population, then recompute demand.
    pub fn update(&mut self, rng: &mut impl Rng) {
        self.population = self.next_population(rng);
        self.energy_demand = demand_for(self.population);
    }

    fn next_population(&self, rng: &mut impl Rng) -> u64 {
        let next = if self.contamination_level >= SEVERE_CONTAMINATION_THRESHOLD {
            let factor = (1.0
                - self.contamination_level / MAX_CONTAMINATION_LEVEL * SEVERE_REDUCTION_WEIGHT)
                .floor();
            scale(self.population, factor)
        } else {
            let p: f64 = rng.random();
            if p >= GROWTH_PROBABILITY_FLOOR {
                let rate = rng.random::<f64>().mul_add(GROWTH_RATE_SPAN, GROWTH_RATE_BASE);
                self.population.saturating_add(scale(self.population, rate))
            } else if p <= DECLINE_PROBABILITY_CEILING {
                let rate = rng.random::<f64>().mul_add(DECLINE_RATE_SPAN, DECLINE_RATE_BASE);
                self.population.saturating_sub(scale(self.population, rate))
            } else {
                self.population
            }
        };
        next.max(self.minimum_population())
    }
}

impl Entity for Settlement {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }
}

/// Look up a settlement in an id-sorted slice.
pub(crate) fn find_settlement(settlements: &[Settlement], id: SettlementId) -> Option<&Settlement> {
    settlements
        .binary_search_by_key(&id, Settlement::id)
        .ok()
        .and_then(|index| settlements.get(index))
}

/// Mutable variant of [`find_settlement`].
pub(crate) fn find_settlement_mut(
    settlements: &mut [Settlement],
    id: SettlementId,
) -> Option<&mut Settlement> {
    settlements
        .binary_search_by_key(&id, Settlement::id)
        .ok()
        .and_then(|index| settlements.get_mut(index))
}

/// Energy demand for a population.
#[allow(clippy::cast_precision_loss)]
fn demand_for(population: u64) -> f64 {
    population as f64 * ENERGY_PER_CAPITA
}

/// `floor(population * factor)`, saturating at the `u64` range.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn scale(population: u64, factor: f64) -> u64 {
    let scaled = (population as f64 * factor).floor();
    if scaled <= 0.0 { 0 } else { scaled as u64 }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn settlement(population: u64) -> Settlement {
        Settlement::new(SettlementId(1), GridPos::ground(100, 200), population)
    }

    #[test]
    fn new_settlement_has_demand_and_no_link() {
        let s = settlement(20_000);
        assert_eq!(s.population(), 20_000);
        assert_eq!(s.original_population(), 20_000);
        assert!((s.energy_demand() - 10.0).abs() < 1e-9);
        assert!(s.contamination_level().abs() < f64::EPSILON);
        assert_eq!(s.reactor(), None);
        assert!(s.is_active());
    }

    #[test]
    fn population_never_falls_below_floor() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut s = settlement(12_345);
        let floor = 12_345 * 9 / 10;
        for _ in 0..2_000 {
            s.update(&mut rng);
            assert!(s.population() >= floor);
        }
    }

    #[test]
    fn demand_tracks_population() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut s = settlement(50_000);
        for _ in 0..50 {
            s.update(&mut rng);
            #[allow(clippy::cast_precision_loss)]
            let expected = s.population() as f64 * ENERGY_PER_CAPITA;
            assert!((s.energy_demand() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn population_grows_on_average() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut s = settlement(40_000);
        for _ in 0..200 {
            s.update(&mut rng);
        }
        assert!(s.population() > 40_000);
    }

    #[test]
    #[allow(clippy::arithmetic_side_effects)]
    fn drift_splits_into_growth_decline_and_steady() {
        let mut rng = SmallRng::seed_from_u64(2024);
        let s = settlement(1_000_000);
        let (mut grew, mut shrank, mut steady) = (0_u32, 0_u32, 0_u32);
        for _ in 0..10_000 {
            let next = s.next_population(&mut rng);
            if next > 1_000_000 {
                assert!((1_000_999..=1_031_000).contains(&next), "growth to {next}");
                grew += 1;
            } else if next < 1_000_000 {
                assert!((994_000..=999_001).contains(&next), "decline to {next}");
                shrank += 1;
            } else {
                steady += 1;
            }
        }
        // Draws >= 0.35 grow, draws <= 0.1 shrink, the rest hold.
        assert!((6_200..=6_800).contains(&grew), "grew {grew}");
        assert!((700..=1_300).contains(&shrank), "shrank {shrank}");
        assert!((2_200..=2_800).contains(&steady), "steady {steady}");
    }

    #[test]
    #[allow(clippy::arithmetic_side_effects)]
    fn each_tick_stays_within_drift_bounds() {
        let mut rng = SmallRng::seed_from_u64(77);
        let mut s = settlement(500_000);
        let (mut grew, mut shrank) = (0_u32, 0_u32);
        for tick in 0..500 {
            let before = s.population();
            s.update(&mut rng);
            let after = s.population();
            if after > before {
                let delta = after - before;
                assert!(delta + 1 >= before / 1_000, "tick {tick}: grew only {delta}");
                assert!(delta <= before * 31 / 1_000 + 1, "tick {tick}: grew {delta}");
                grew += 1;
            } else if after < before {
                let delta = before - after;
                assert!(delta <= before * 6 / 1_000 + 1, "tick {tick}: shrank {delta}");
                assert!(
                    delta + 1 >= before / 1_000 || after == s.minimum_population(),
                    "tick {tick}: shrank only {delta}"
                );
                shrank += 1;
            }
            assert!(after >= s.minimum_population());
        }
        assert!(grew > shrank);
        assert!(shrank > 0);
    }

    #[test]
    fn severe_contamination_collapses_to_floor() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut s = settlement(30_000);
        s.contaminate(20.0);
        s.update(&mut rng);
        assert_eq!(s.population(), 27_000);
    }

    #[test]
    fn mild_contamination_keeps_normal_drift() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut s = settlement(30_000);
        s.contaminate(19.9);
        for _ in 0..200 {
            s.update(&mut rng);
        }
        assert!(s.population() > 27_000);
    }

    #[test]
    fn contamination_is_capped_and_never_decays() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut s = settlement(30_000);
        s.contaminate(70.0);
        s.contaminate(70.0);
        assert!((s.contamination_level() - 100.0).abs() < f64::EPSILON);
        for _ in 0..100 {
            s.update(&mut rng);
        }
        // Intentional long-run property: once contaminated, a settlement stays
        // in the severe regime at its population floor.
        assert!((s.contamination_level() - 100.0).abs() < f64::EPSILON);
        assert_eq!(s.population(), s.minimum_population());
    }

    #[test]
    fn set_contamination_level_clamps() {
        let mut s = settlement(1_000);
        s.set_contamination_level(150.0);
        assert!((s.contamination_level() - 100.0).abs() < f64::EPSILON);
        s.set_contamination_level(-3.0);
        assert!(s.contamination_level().abs() < f64::EPSILON);
    }

    #[test]
    fn deactivation_is_permanent() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut s = settlement(1_000);
        s.deactivate();
        for _ in 0..10 {
            s.update(&mut rng);
            assert!(!s.is_active());
        }
    }

    #[test]
    fn thriving_threshold_is_forty_percent() {
        let s = settlement(1_000);
        assert!(s.is_thriving());
        let mut lookup = vec![settlement(10), Settlement::new(SettlementId(4), GridPos::ground(1, 1), 5)];
        assert_eq!(find_settlement(&lookup, SettlementId(4)).map(Settlement::population), Some(5));
        assert!(find_settlement_mut(&mut lookup, SettlementId(2)).is_none());
    }

    #[test]
    fn connect_and_disconnect() {
        let mut s = settlement(1_000);
        s.connect(ReactorId(4));
        assert_eq!(s.reactor(), Some(ReactorId(4)));
        assert_eq!(s.disconnect(), Some(ReactorId(4)));
        assert_eq!(s.reactor(), None);
    }
}
