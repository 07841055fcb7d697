//! One simulation step: periodic settlement generation, the world tick, and
//! the flat history record that summarizes it.
//!
//! Each step runs these phases:
//!
//! 1. **Generation** -- on steps that are a multiple of the settlement
//!    generation frequency, ask the world for one new settlement. Placement
//!    failures and capacity limits are logged and skipped.
//!
//! 2. **World tick** -- wind, assignment, settlement, reactor, and
//!    contamination updates, run to completion by [`World::tick`].
//!
//! 3. **Record** -- collect the aggregates into a [`StepRecord`].

use meltdown_types::StepRecord;
use meltdown_world::{TickReport, World, WorldError};
use tracing::{debug, info, warn};

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// The history record for the step.
    pub record: StepRecord,
    /// Per-tick event counts from the world.
    pub report: TickReport,
    /// Whether a settlement was generated during this step.
    pub settlement_generated: bool,
}

/// Whether `step` triggers settlement generation.
///
/// Steps are counted from 1; a zero frequency never triggers.
pub const fn is_generation_step(step: u64, frequency: u64) -> bool {
    match step.checked_rem(frequency) {
        Some(remainder) => remainder == 0,
        None => false,
    }
}

/// Run step `step` against `world`.
pub fn run_step(world: &mut World, step: u64, generation_frequency: u64) -> StepOutcome {
    let settlement_generated =
        is_generation_step(step, generation_frequency) && generate_settlement(world, step);

    let report = world.tick();
    let record = step_record(world, step, &report);

    if report.explosions > 0 || report.worn_out > 0 || report.reactors_contaminated > 0 {
        info!(
            step,
            explosions = report.explosions,
            worn_out = report.worn_out,
            reactors_contaminated = report.reactors_contaminated,
            active_reactors = record.active_reactor_count,
            "Reactors lost"
        );
    }
    debug!(
        step,
        wind = %record.wind_direction,
        wind_changed = report.wind_changed,
        settlements = record.settlement_count,
        reactors = record.reactor_count,
        population = record.total_population,
        demand = record.total_energy_demand,
        links = report.links_made,
        sited = report.reactors_sited,
        clouds_dissipated = report.clouds_dissipated,
        "Step complete"
    );

    StepOutcome {
        record,
        report,
        settlement_generated,
    }
}

/// The aggregate record of `world` after `step`.
pub fn step_record(world: &World, step: u64, report: &TickReport) -> StepRecord {
    StepRecord {
        step,
        settlement_count: world.settlement_count(),
        reactor_count: world.reactor_count(),
        wind_direction: report.wind,
        total_population: world.total_population(),
        total_energy_demand: world.total_energy_demand(),
        active_reactor_count: world.active_reactor_count(),
    }
}

fn generate_settlement(world: &mut World, step: u64) -> bool {
    match world.generate_settlement() {
        Ok(id) => {
            debug!(step, settlement = %id, "Settlement generated");
            true
        }
        Err(err @ WorldError::CapacityReached { .. }) => {
            debug!(step, %err, "Settlement generation skipped");
            false
        }
        Err(err) => {
            warn!(step, %err, "Settlement generation failed");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use meltdown_types::{GridPos, ReactorLevel};
    use meltdown_world::{StartupParams, WorldTunables};

    use super::*;

    fn params() -> StartupParams {
        StartupParams {
            map_width: 400,
            map_height: 400,
            max_settlements: 10,
            max_reactors: 5,
            initial_settlements: 0,
            initial_reactors: 0,
        }
    }

    fn quiet_world(seed: u64) -> World {
        let mut tunables = WorldTunables::default();
        tunables.reactor.malfunction_base_chance = 0.0;
        World::new(params(), &tunables, Some(seed)).unwrap()
    }

    #[test]
    fn generation_steps_are_multiples_of_frequency() {
        let steps: Vec<u64> = (1..=10).filter(|&s| is_generation_step(s, 3)).collect();
        assert_eq!(steps, vec![3, 6, 9]);
        assert!(is_generation_step(1, 1));
        assert!(!is_generation_step(5, 0));
    }

    #[test]
    fn step_generates_only_on_schedule() {
        let mut world = quiet_world(1);
        let first = run_step(&mut world, 1, 3);
        assert!(!first.settlement_generated);
        assert_eq!(first.record.settlement_count, 0);

        let third = run_step(&mut world, 3, 3);
        assert!(third.settlement_generated);
        assert_eq!(third.record.settlement_count, 1);
    }

    #[test]
    fn generation_stops_at_capacity() {
        let mut world = World::new(
            StartupParams {
                max_settlements: 1,
                ..params()
            },
            &WorldTunables::default(),
            Some(2),
        )
        .unwrap();
        assert!(run_step(&mut world, 1, 1).settlement_generated);
        assert!(!run_step(&mut world, 2, 1).settlement_generated);
        assert_eq!(world.settlement_count(), 1);
    }

    #[test]
    fn record_reflects_world_aggregates() {
        let mut world = quiet_world(4);
        let reactor = world
            .insert_reactor_with_max_power(GridPos::ground(100, 100), ReactorLevel::Two, 400.0)
            .unwrap();
        world
            .insert_settlement(GridPos::ground(110, 100), 20_000)
            .unwrap();

        let outcome = run_step(&mut world, 1, 3);
        let record = outcome.record;
        assert_eq!(record.step, 1);
        assert_eq!(record.settlement_count, 1);
        assert_eq!(record.reactor_count, 1);
        assert_eq!(record.active_reactor_count, 1);
        assert_eq!(record.wind_direction, world.wind());
        assert_eq!(record.total_population, world.total_population());
        assert_eq!(record.total_energy_demand, world.total_energy_demand());
        assert_eq!(outcome.report.links_made, 1);
        assert!(world.reactor(reactor).unwrap().current_power() > 0.0);
    }
}
