//! Shared type definitions for the Meltdown simulation.
//!
//! This crate is the single source of truth for the value types that cross
//! crate boundaries: identifiers, grid coordinates, enumerations, and the
//! records handed to external collaborators (history sink, renderer).
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for all entity identifiers
//! - [`enums`] -- Wind, reactor level, and the tagged entity handle
//! - [`geometry`] -- [`GridPos`] and the fixed height levels
//! - [`structs`] -- Per-step history record and render snapshot

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EntityKind, EntityRef, InvalidReactorLevel, ReactorLevel, WindDirection};
pub use geometry::{ELEVATED_LEVEL, GROUND_LEVEL, GridPos, HEIGHT_LEVELS};
pub use ids::{ContaminationId, ReactorId, SettlementId};
pub use structs::{
    ContaminationView, ReactorView, SettlementView, StepRecord, THRIVING_POPULATION_FRACTION,
    WorldSnapshot,
};
