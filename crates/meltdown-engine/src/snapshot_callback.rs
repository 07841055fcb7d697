//! Tick callback that publishes render snapshots.
//!
//! Every `interval` steps the callback serializes [`World::snapshot`] to a
//! JSON file that an external renderer polls. The file is written to a
//! sibling temporary path and renamed into place, so a reader never sees a
//! half-written snapshot. Write failures are logged and counted; they never
//! stop the run.

use std::fs;
use std::path::{Path, PathBuf};

use meltdown_core::runner::TickCallback;
use meltdown_core::tick::StepOutcome;
use meltdown_types::WorldSnapshot;
use meltdown_world::World;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Callback that writes a JSON snapshot every `interval` steps.
pub struct SnapshotCallback {
    path: PathBuf,
    interval: u64,
    failures: u64,
}

impl SnapshotCallback {
    /// Write snapshots to `path` every `interval` steps (0 disables them).
    pub const fn new(path: PathBuf, interval: u64) -> Self {
        Self {
            path,
            interval,
            failures: 0,
        }
    }

    /// Number of snapshots that could not be written.
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    const fn is_due(&self, step: u64) -> bool {
        match step.checked_rem(self.interval) {
            Some(remainder) => remainder == 0,
            None => false,
        }
    }
}

impl TickCallback for SnapshotCallback {
    fn on_tick(&mut self, outcome: &StepOutcome, world: &World) {
        let step = outcome.record.step;
        if !self.is_due(step) {
            return;
        }
        match write_snapshot(&self.path, &world.snapshot(step)) {
            Ok(()) => debug!(step, path = %self.path.display(), "Snapshot written"),
            Err(err) => {
                self.failures = self.failures.saturating_add(1);
                warn!(step, %err, "Snapshot not written");
            }
        }
    }
}

/// Serialize `snapshot` to `path`, replacing any previous file.
pub fn write_snapshot(path: &Path, snapshot: &WorldSnapshot) -> Result<(), EngineError> {
    let failed = |message: String| EngineError::Snapshot {
        path: path.to_path_buf(),
        message,
    };
    let json = serde_json::to_vec_pretty(snapshot).map_err(|e| failed(e.to_string()))?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).map_err(|e| failed(e.to_string()))?;
    fs::rename(&staging, path).map_err(|e| failed(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use meltdown_core::tick::step_record;
    use meltdown_world::{StartupParams, WorldTunables};

    use super::*;

    fn world() -> World {
        let params = StartupParams {
            map_width: 400,
            map_height: 400,
            max_settlements: 10,
            max_reactors: 5,
            initial_settlements: 3,
            initial_reactors: 2,
        };
        let mut world = World::new(params, &WorldTunables::default(), Some(8)).unwrap();
        world.seed_initial_entities();
        world
    }

    fn outcome(world: &mut World, step: u64) -> StepOutcome {
        let report = world.tick();
        StepOutcome {
            record: step_record(world, step, &report),
            report,
            settlement_generated: false,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("meltdown-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn writes_only_on_interval_steps() {
        let path = temp_path("interval");
        let mut world = world();
        let mut callback = SnapshotCallback::new(path.clone(), 3);

        for step in 1..=2 {
            let outcome = outcome(&mut world, step);
            callback.on_tick(&outcome, &world);
        }
        assert!(!path.exists());

        let outcome = outcome(&mut world, 3);
        callback.on_tick(&outcome, &world);
        let text = fs::read_to_string(&path).unwrap();
        let snapshot: WorldSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(snapshot.step, 3);
        assert_eq!(snapshot.settlements.len(), world.settlements().len());
        assert_eq!(callback.failures(), 0);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn zero_interval_disables_snapshots() {
        let path = temp_path("disabled");
        let mut world = world();
        let mut callback = SnapshotCallback::new(path.clone(), 0);
        let outcome = outcome(&mut world, 10);
        callback.on_tick(&outcome, &world);
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_counted_not_fatal() {
        let path = std::env::temp_dir()
            .join(format!("meltdown-missing-{}", std::process::id()))
            .join("nested")
            .join("snapshot.json");
        let mut world = world();
        let mut callback = SnapshotCallback::new(path, 1);
        let outcome = outcome(&mut world, 1);
        callback.on_tick(&outcome, &world);
        assert_eq!(callback.failures(), 1);
    }
}
