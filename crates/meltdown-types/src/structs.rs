//! Record and snapshot structs exchanged with external collaborators.
//!
//! [`StepRecord`] is the flat per-step row handed to the history sink.
//! [`WorldSnapshot`] is the read-only picture a renderer draws from.

use serde::{Deserialize, Serialize};

use crate::enums::{ReactorLevel, WindDirection};
use crate::geometry::GridPos;
use crate::ids::{ContaminationId, ReactorId, SettlementId};

/// Fraction of original population at or above which a settlement is drawn
/// as thriving.
pub const THRIVING_POPULATION_FRACTION: f64 = 0.4;

/// One row of run history, emitted once per step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step index, starting at 1.
    pub step: u64,
    /// Number of settlements in the world (active or not).
    pub settlement_count: u32,
    /// Number of reactors in the world (active or not).
    pub reactor_count: u32,
    /// Ambient wind during the step.
    pub wind_direction: WindDirection,
    /// Sum of population over all settlements.
    pub total_population: u64,
    /// Sum of energy demand over all settlements, in MW.
    pub total_energy_demand: f64,
    /// Number of reactors still active at the end of the step.
    pub active_reactor_count: u32,
}

/// Render view of a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementView {
    /// Settlement identifier.
    pub id: SettlementId,
    /// Grid position.
    pub position: GridPos,
    /// Whether the settlement is active.
    pub active: bool,
    /// Current population.
    pub population: u64,
    /// Population at creation.
    pub original_population: u64,
    /// Contamination level in `[0, 100]`.
    pub contamination_level: f64,
    /// `true` while population is at least 40% of the original.
    pub thriving: bool,
    /// The reactor currently supplying this settlement, if any.
    pub reactor: Option<ReactorId>,
}

/// Render view of a reactor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorView {
    /// Reactor identifier.
    pub id: ReactorId,
    /// Grid position.
    pub position: GridPos,
    /// Whether the reactor is active.
    pub active: bool,
    /// Technology level.
    pub level: ReactorLevel,
    /// Maximum power output in MW.
    pub max_power: f64,
    /// Current load in MW.
    pub current_power: f64,
    /// Wear metric in `[0, 1]`.
    pub durability: f64,
    /// Whether the reactor malfunctioned during the last update.
    pub malfunctioning: bool,
    /// Number of connected settlements.
    pub connected: u32,
}

/// Render view of a contamination cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationView {
    /// Cloud identifier.
    pub id: ContaminationId,
    /// Grid position (elevated level).
    pub position: GridPos,
    /// Whether the cloud is still active.
    pub active: bool,
    /// Current radius in cells.
    pub radius: f64,
    /// Ticks since spawn.
    pub age: u32,
}

/// A consistent, read-only picture of the world for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// The step this snapshot was taken after.
    pub step: u64,
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Ambient wind.
    pub wind: WindDirection,
    /// All settlements.
    pub settlements: Vec<SettlementView>,
    /// All reactors.
    pub reactors: Vec<ReactorView>,
    /// All contamination clouds.
    pub contaminations: Vec<ContaminationView>,
}
