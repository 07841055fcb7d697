//! Configuration loading and typed config structures for the Meltdown simulation.
//!
//! The canonical configuration lives in `meltdown-config.yaml` at the project
//! root. Every key is optional: a missing section or field falls back to the
//! value shown in the sample file, so an empty file yields a runnable configuration.
//!
//! World tunables (`reactor`, `energy`, `placement`, `settlement`,
//! `contamination`) are the structs from `meltdown-world`, flattened into the
//! top level so the YAML stays one level deep.

use std::path::Path;

use meltdown_world::{StartupParams, WorldTunables};
use serde::Deserialize;

/// Environment variable overriding `map.width`.
pub const ENV_MAP_WIDTH: &str = "MELTDOWN_MAP_WIDTH";
/// Environment variable overriding `map.height`.
pub const ENV_MAP_HEIGHT: &str = "MELTDOWN_MAP_HEIGHT";
/// Environment variable overriding `map.initial_settlements`.
pub const ENV_INITIAL_SETTLEMENTS: &str = "MELTDOWN_INITIAL_SETTLEMENTS";
/// Environment variable overriding `map.initial_reactors`.
pub const ENV_INITIAL_REACTORS: &str = "MELTDOWN_INITIAL_REACTORS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override did not hold an unsigned integer.
    #[error("environment variable {var} is not a valid count: {value:?}: {source}")]
    InvalidOverride {
        /// Name of the offending variable.
        var: &'static str,
        /// The raw value found.
        value: String,
        /// The underlying integer parse error.
        source: std::num::ParseIntError,
    },

    /// A simulation setting is outside its accepted range.
    #[error("invalid simulation setting: {reason}")]
    Invalid {
        /// Description of the violated constraint.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `meltdown-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run length, generation cadence, seed, and pacing.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Map dimensions and initial entity counts.
    #[serde(default)]
    pub map: MapConfig,

    /// Entity caps.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Reactor, energy, placement, settlement, and contamination tunables.
    #[serde(flatten)]
    pub world: WorldTunables,

    /// Log level and output locations.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override is malformed.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.map.apply_env_overrides()?;
        Ok(config)
    }

    /// Reject run settings the driver cannot honour.
    ///
    /// Map and limit checks belong to [`StartupParams::validate`], which the
    /// world runs on construction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the settlement generation
    /// frequency is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.settlement_generation_frequency == 0 {
            return Err(ConfigError::Invalid {
                reason: "settlement_generation_frequency must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// The startup parameters handed to the world.
    pub const fn startup_params(&self) -> StartupParams {
        StartupParams {
            map_width: self.map.width,
            map_height: self.map.height,
            max_settlements: self.limits.max_settlements,
            max_reactors: self.limits.max_reactors,
            initial_settlements: self.map.initial_settlements,
            initial_reactors: self.map.initial_reactors,
        }
    }

    /// The world tunables.
    pub const fn tunables(&self) -> &WorldTunables {
        &self.world
    }
}

/// Run-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Number of ticks to run.
    #[serde(default = "default_duration_ticks")]
    pub duration_ticks: u64,

    /// A settlement is generated on every step that is a multiple of this.
    #[serde(default = "default_settlement_generation_frequency")]
    pub settlement_generation_frequency: u64,

    /// Random seed; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Real-time milliseconds to wait between ticks (0 disables pacing).
    #[serde(default)]
    pub tick_interval_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_ticks: default_duration_ticks(),
            settlement_generation_frequency: default_settlement_generation_frequency(),
            seed: None,
            tick_interval_ms: 0,
        }
    }
}

/// Map dimensions and initial population of entities.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapConfig {
    /// Map width in cells.
    #[serde(default = "default_map_dimension")]
    pub width: u32,

    /// Map height in cells.
    #[serde(default = "default_map_dimension")]
    pub height: u32,

    /// Settlements generated before the first tick.
    #[serde(default = "default_initial_settlements")]
    pub initial_settlements: u32,

    /// Reactors generated before the first tick.
    #[serde(default = "default_initial_reactors")]
    pub initial_reactors: u32,
}

impl MapConfig {
    /// Override map settings with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if a variable is set but is
    /// not an unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] on the first malformed value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&'static str, &mut u32); 4] = [
            (ENV_MAP_WIDTH, &mut self.width),
            (ENV_MAP_HEIGHT, &mut self.height),
            (ENV_INITIAL_SETTLEMENTS, &mut self.initial_settlements),
            (ENV_INITIAL_REACTORS, &mut self.initial_reactors),
        ];
        for (var, slot) in targets {
            let Some(value) = lookup(var) else {
                continue;
            };
            *slot = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidOverride { var, value, source })?;
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_dimension(),
            height: default_map_dimension(),
            initial_settlements: default_initial_settlements(),
            initial_reactors: default_initial_reactors(),
        }
    }
}

/// Entity caps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    /// Maximum settlements ever created.
    #[serde(default = "default_max_settlements")]
    pub max_settlements: u32,

    /// Maximum simultaneously active reactors.
    #[serde(default = "default_max_reactors")]
    pub max_reactors: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_settlements: default_max_settlements(),
            max_reactors: default_max_reactors(),
        }
    }
}

/// Logging and output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory receiving the per-run history CSV.
    #[serde(default = "default_history_dir")]
    pub history_dir: String,

    /// Write a render snapshot every N ticks (0 disables snapshots).
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            history_dir: default_history_dir(),
            snapshot_interval_ticks: default_snapshot_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (used by serde)
// ---------------------------------------------------------------------------

const fn default_duration_ticks() -> u64 {
    100
}

const fn default_settlement_generation_frequency() -> u64 {
    3
}

const fn default_map_dimension() -> u32 {
    400
}

const fn default_initial_settlements() -> u32 {
    5
}

const fn default_initial_reactors() -> u32 {
    3
}

const fn default_max_settlements() -> u32 {
    10
}

const fn default_max_reactors() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_history_dir() -> String {
    "docs".to_owned()
}

const fn default_snapshot_interval_ticks() -> u64 {
    10
}
