//! Simulation binary for Meltdown.
//!
//! Wires the configuration, the world, the history report, and the render
//! snapshot together and runs the driver to completion.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `meltdown-config.yaml` (or `MELTDOWN_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the world from the startup parameters and tunables
//! 4. Seed the initial reactors and settlements
//! 5. Open the timestamped history report
//! 6. Run the driver
//! 7. Write the final snapshot and log the result

mod error;
mod snapshot_callback;

use std::path::{Path, PathBuf};

use chrono::Local;
use meltdown_core::config::SimulationConfig;
use meltdown_core::history::CsvHistoryWriter;
use meltdown_core::runner;
use meltdown_world::World;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::snapshot_callback::SnapshotCallback;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "meltdown-config.yaml";

/// Environment variable naming an alternative configuration file.
const CONFIG_PATH_ENV: &str = "MELTDOWN_CONFIG";

/// File name of the render snapshot inside the history directory.
const SNAPSHOT_FILE: &str = "snapshot.json";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, world construction, or the history
/// report cannot be set up. Failures during the run are logged instead.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("meltdown-engine starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    config.validate().map_err(EngineError::from)?;

    // 3. Build the world.
    let params = config.startup_params();
    let mut world = World::new(params, config.tunables(), config.simulation.seed)
        .map_err(EngineError::from)?;
    info!(
        width = params.map_width,
        height = params.map_height,
        max_settlements = params.max_settlements,
        max_reactors = params.max_reactors,
        seed = ?config.simulation.seed,
        "World created"
    );

    // 4. Seed initial entities.
    world.seed_initial_entities();

    // 5. Open the history report.
    let history_dir = Path::new(&config.logging.history_dir);
    let (mut history, report_path) =
        CsvHistoryWriter::create_in(history_dir, &Local::now()).map_err(EngineError::from)?;
    info!(path = %report_path.display(), "History report opened");

    let mut snapshots = SnapshotCallback::new(
        history_dir.join(SNAPSHOT_FILE),
        config.logging.snapshot_interval_ticks,
    );

    // 6. Run the simulation.
    let result = runner::run_simulation(&mut world, &config, &mut history, &mut snapshots)
        .await
        .map_err(EngineError::from)?;

    // 7. Final snapshot and summary.
    let final_snapshot = world.snapshot(result.total_ticks);
    if let Err(err) = snapshot_callback::write_snapshot(snapshots.path(), &final_snapshot) {
        warn!(%err, "Final snapshot not written");
    }
    runner::log_simulation_end(&result);

    info!(
        total_ticks = result.total_ticks,
        snapshot_failures = snapshots.failures(),
        report = %report_path.display(),
        "meltdown-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// Reads the file named by `MELTDOWN_CONFIG`, or `meltdown-config.yaml` in the
/// working directory. Falls back to defaults when neither exists. Returns the
/// path that was read, if any.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = SimulationConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        let config = SimulationConfig::parse("{}")?;
        Ok((config, None))
    }
}
