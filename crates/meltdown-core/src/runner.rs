//! Simulation driver: runs a fixed number of steps against a world.
//!
//! The driver owns no simulation state. Each iteration it:
//!
//! 1. runs one step ([`tick::run_step`]),
//! 2. appends the step's record to the [`HistorySink`], logging and counting
//!    failures without stopping,
//! 3. notifies the [`TickCallback`],
//! 4. sleeps for the configured tick interval, if any.
//!
//! There is no cancellation: the run ends after `duration_ticks` steps.

use meltdown_types::StepRecord;
use meltdown_world::World;
use tracing::{info, warn};

use crate::config::{ConfigError, SimulationConfig};
use crate::history::HistorySink;
use crate::tick::{self, StepOutcome};

/// Errors that can stop a run before it starts.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The run settings were rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Number of steps executed.
    pub total_ticks: u64,
    /// Record of the last step, if any step ran.
    pub final_record: Option<StepRecord>,
    /// Number of history records that could not be written.
    pub history_failures: u64,
    /// Reactors that exploded over the whole run.
    pub explosions: u64,
}

/// Observer notified after every step.
pub trait TickCallback: Send {
    /// Called once per step, after the history record is written.
    fn on_tick(&mut self, outcome: &StepOutcome, world: &World);
}

/// Callback that ignores every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _outcome: &StepOutcome, _world: &World) {}
}

/// Run the simulation for `config.simulation.duration_ticks` steps.
///
/// # Errors
///
/// Returns [`RunnerError::Config`] if the run settings are invalid. Nothing
/// inside a step can fail the run.
pub async fn run_simulation(
    world: &mut World,
    config: &SimulationConfig,
    sink: &mut dyn HistorySink,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    config.validate()?;
    let run = &config.simulation;

    info!(
        duration_ticks = run.duration_ticks,
        settlement_generation_frequency = run.settlement_generation_frequency,
        tick_interval_ms = run.tick_interval_ms,
        settlements = world.settlement_count(),
        reactors = world.reactor_count(),
        "Simulation starting"
    );

    let mut result = SimulationResult {
        total_ticks: 0,
        final_record: None,
        history_failures: 0,
        explosions: 0,
    };

    for step in 1..=run.duration_ticks {
        let outcome = tick::run_step(world, step, run.settlement_generation_frequency);

        if let Err(err) = sink.record(&outcome.record) {
            result.history_failures = result.history_failures.saturating_add(1);
            warn!(step, %err, "History record not written");
        }

        callback.on_tick(&outcome, world);

        result.total_ticks = step;
        result.explosions = result
            .explosions
            .saturating_add(u64::from(outcome.report.explosions));
        result.final_record = Some(outcome.record);

        if run.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(run.tick_interval_ms)).await;
        }
    }

    if let Err(err) = sink.finish() {
        result.history_failures = result.history_failures.saturating_add(1);
        warn!(%err, "History flush failed");
    }

    Ok(result)
}

/// Log the end-of-run summary.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        total_ticks = result.total_ticks,
        explosions = result.explosions,
        history_failures = result.history_failures,
        "Simulation ended"
    );

    if let Some(record) = result.final_record {
        info!(
            step = record.step,
            settlements = record.settlement_count,
            reactors = record.reactor_count,
            active_reactors = record.active_reactor_count,
            population = record.total_population,
            demand = record.total_energy_demand,
            wind = %record.wind_direction,
            "Final step record"
        );
    } else {
        warn!("Simulation ended with no steps executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use meltdown_world::WorldError;

    use super::*;
    use crate::history::{HistoryError, MemoryHistory, NullHistory};

    fn world(config: &SimulationConfig) -> World {
        let mut world = World::new(
            config.startup_params(),
            config.tunables(),
            config.simulation.seed,
        )
        .unwrap();
        world.seed_initial_entities();
        world
    }

    fn config(duration_ticks: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.simulation.duration_ticks = duration_ticks;
        config.simulation.seed = Some(17);
        config
    }

    /// Sink that fails every write.
    struct BrokenSink;

    impl HistorySink for BrokenSink {
        fn record(&mut self, _record: &StepRecord) -> Result<(), HistoryError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    /// Callback that counts invocations.
    #[derive(Default)]
    struct Counter {
        steps: Vec<u64>,
    }

    impl TickCallback for Counter {
        fn on_tick(&mut self, outcome: &StepOutcome, _world: &World) {
            self.steps.push(outcome.record.step);
        }
    }

    #[tokio::test]
    async fn runs_exactly_duration_ticks() {
        let config = config(12);
        let mut world = world(&config);
        let mut history = MemoryHistory::new();
        let mut counter = Counter::default();

        let result = run_simulation(&mut world, &config, &mut history, &mut counter)
            .await
            .unwrap();

        assert_eq!(result.total_ticks, 12);
        assert_eq!(result.history_failures, 0);
        assert_eq!(history.records().len(), 12);
        assert_eq!(counter.steps, (1..=12).collect::<Vec<u64>>());
        assert_eq!(result.final_record.map(|r| r.step), Some(12));
        assert_eq!(result.final_record.as_ref(), history.records().last());
    }

    #[tokio::test]
    async fn settlements_grow_on_schedule() {
        let mut config = config(9);
        config.map.initial_settlements = 0;
        let mut world = world(&config);
        let mut history = MemoryHistory::new();

        run_simulation(&mut world, &config, &mut history, &mut NoOpCallback)
            .await
            .unwrap();

        let counts: Vec<u32> = history.records().iter().map(|r| r.settlement_count).collect();
        assert_eq!(counts, vec![0, 0, 1, 1, 1, 2, 2, 2, 3]);
    }

    #[tokio::test]
    async fn history_failures_do_not_stop_the_run() {
        let config = config(5);
        let mut world = world(&config);

        let result = run_simulation(&mut world, &config, &mut BrokenSink, &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.history_failures, 5);
    }

    #[tokio::test]
    async fn zero_duration_runs_nothing() {
        let config = config(0);
        let mut world = world(&config);
        let mut history = MemoryHistory::new();

        let result = run_simulation(&mut world, &config, &mut history, &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.total_ticks, 0);
        assert!(result.final_record.is_none());
        assert!(history.records().is_empty());
        log_simulation_end(&result);
    }

    #[tokio::test]
    async fn invalid_frequency_is_rejected() {
        let mut config = config(3);
        config.simulation.settlement_generation_frequency = 0;
        let mut world = world(&config);

        let result = run_simulation(&mut world, &config, &mut NullHistory, &mut NoOpCallback).await;
        assert!(matches!(result, Err(RunnerError::Config { .. })));
        assert_eq!(world.settlement_count(), config.map.initial_settlements);
    }

    #[tokio::test]
    async fn paced_run_still_completes() {
        let mut config = config(2);
        config.simulation.tick_interval_ms = 1;
        let mut world = world(&config);

        let result = run_simulation(&mut world, &config, &mut NullHistory, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.total_ticks, 2);
    }

    #[test]
    fn invalid_world_parameters_surface_before_running() {
        let mut config = config(1);
        config.map.width = 100;
        let result = World::new(config.startup_params(), config.tunables(), None);
        assert!(matches!(result, Err(WorldError::InvalidConfiguration { .. })));
    }
}
