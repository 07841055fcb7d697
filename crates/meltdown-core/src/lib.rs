//! Configuration, step loop, history output, and driver for the Meltdown
//! simulation.
//!
//! The world itself lives in `meltdown-world`; this crate decides how long
//! it runs, when new settlements appear, and where the per-step record goes.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `meltdown-config.yaml` into
//!   strongly-typed structs.
//! - [`history`] -- [`HistorySink`] trait, the CSV report writer, and an
//!   in-memory sink.
//! - [`runner`] -- The async driver that runs a fixed number of steps.
//! - [`tick`] -- One step: generation, world tick, and record.
//!
//! [`HistorySink`]: history::HistorySink

pub mod config;
pub mod history;
pub mod runner;
pub mod tick;
