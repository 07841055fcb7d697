//! Spatial and relational core of the Meltdown simulation.
//!
//! This crate models the territory: settlements that consume power, reactors
//! that supply it and eventually fail, and the contamination clouds that
//! failing reactors release. It owns every invariant of the simulation
//! (unique cell occupancy, capacity-bounded connections, monotone aging).
//!
//! # Modules
//!
//! - [`assignment`] -- Nearest-eligible reactor matching for settlements.
//! - [`config`] -- World tunables and validated startup parameters.
//! - [`contamination`] -- Cloud growth, wind drift, aging, and fallout.
//! - [`entity`] -- The capability set shared by all entity kinds.
//! - [`error`] -- Error types for world construction and placement.
//! - [`occupancy`] -- The one-entity-per-cell occupancy index.
//! - [`placement`] -- Bounded-retry random cell sampling.
//! - [`reactor`] -- Reactor wear, malfunction, and explosion state machine.
//! - [`settlement`] -- Population drift and energy demand.
//! - [`wind`] -- Per-tick ambient wind.
//! - [`world`] -- The [`World`] that owns everything and runs a tick.

pub mod assignment;
pub mod config;
pub mod contamination;
pub mod entity;
pub mod error;
pub mod occupancy;
pub mod placement;
pub mod reactor;
pub mod settlement;
pub mod wind;
pub mod world;

// Re-export primary types at crate root.
pub use assignment::{AssignmentEngine, AssignmentOutcome};
pub use config::{
    ContaminationConfig, EnergyConfig, MIN_MAP_DIMENSION, PlacementConfig, ReactorConfig,
    SettlementConfig, StartupParams, WorldTunables,
};
pub use contamination::{Contamination, Fallout, RADIUS_CEILING};
pub use entity::{Entity, EntityCore};
pub use error::WorldError;
pub use occupancy::OccupancyGrid;
pub use placement::PlacementSampler;
pub use reactor::{Explosion, Reactor, ReactorOutcome, WORN_OUT_DURABILITY};
pub use settlement::{ENERGY_PER_CAPITA, Settlement};
pub use wind::WindSystem;
pub use world::{TickReport, World};
