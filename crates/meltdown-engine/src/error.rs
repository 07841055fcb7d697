//! Error types for the Meltdown engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the run.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: meltdown_core::config::ConfigError,
    },

    /// World construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: meltdown_world::WorldError,
    },

    /// The history report could not be opened.
    #[error("history error: {source}")]
    History {
        /// The underlying history error.
        #[from]
        source: meltdown_core::history::HistoryError,
    },

    /// The driver rejected the run.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: meltdown_core::runner::RunnerError,
    },

    /// A render snapshot could not be written.
    #[error("failed to write snapshot {}: {message}", path.display())]
    Snapshot {
        /// Destination of the snapshot.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },
}
