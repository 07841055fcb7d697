//! Tunable parameters and startup parameters for the world.
//!
//! Every tunable has a documented default, so an empty
//! YAML section deserializes to a fully usable value. The loader in
//! `meltdown-core` embeds these structs directly in its top-level config and
//! passes them by reference into [`World`](crate::World) construction.

use serde::Deserialize;

use crate::error::WorldError;

/// Smallest accepted map width or height, in cells.
pub const MIN_MAP_DIMENSION: u32 = 400;

/// Bundle of every tunable the world reads during a tick.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorldTunables {
    /// Reactor failure parameters.
    #[serde(default)]
    pub reactor: ReactorConfig,
    /// Settlement-to-reactor connection parameters.
    #[serde(default)]
    pub energy: EnergyConfig,
    /// Random placement parameters.
    #[serde(default)]
    pub placement: PlacementConfig,
    /// Settlement generation parameters.
    #[serde(default)]
    pub settlement: SettlementConfig,
    /// Contamination cloud parameters.
    #[serde(default)]
    pub contamination: ContaminationConfig,
}

impl WorldTunables {
    /// Reject tunables the world cannot draw from.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfiguration`] if the initial population
    /// range is empty or a reactor probability factor is outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), WorldError> {
        let population = &self.settlement;
        if population.min_initial_population > population.max_initial_population {
            return Err(WorldError::InvalidConfiguration {
                reason: format!(
                    "initial population range {}..={} is empty",
                    population.min_initial_population, population.max_initial_population
                ),
            });
        }
        let decays = [
            self.reactor.durability_decay_normal,
            self.reactor.durability_decay_malfunction,
        ];
        if decays.iter().any(|decay| !(0.0..=1.0).contains(decay)) {
            return Err(WorldError::InvalidConfiguration {
                reason: format!("durability decay factors must lie in [0, 1], got {decays:?}"),
            });
        }
        Ok(())
    }
}

/// Reactor malfunction, wear, and explosion parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReactorConfig {
    /// Base per-tick malfunction probability before level and wear modifiers.
    #[serde(default = "default_malfunction_base_chance")]
    pub malfunction_base_chance: f64,

    /// Durability multiplier applied on a normal tick.
    #[serde(default = "default_durability_decay_normal")]
    pub durability_decay_normal: f64,

    /// Durability multiplier applied on a malfunctioning tick.
    #[serde(default = "default_durability_decay_malfunction")]
    pub durability_decay_malfunction: f64,

    /// Durability below which a malfunctioning, loaded reactor explodes.
    #[serde(default = "default_explosion_durability_threshold")]
    pub explosion_durability_threshold: f64,

    /// Fraction of max power above which a malfunctioning, worn reactor explodes.
    #[serde(default = "default_explosion_power_threshold")]
    pub explosion_power_threshold: f64,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            malfunction_base_chance: default_malfunction_base_chance(),
            durability_decay_normal: default_durability_decay_normal(),
            durability_decay_malfunction: default_durability_decay_malfunction(),
            explosion_durability_threshold: default_explosion_durability_threshold(),
            explosion_power_threshold: default_explosion_power_threshold(),
        }
    }
}

/// Settlement-to-reactor connection parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnergyConfig {
    /// Spare capacity a reactor needs, as a multiple of the settlement's demand.
    #[serde(default = "default_connection_power_buffer")]
    pub connection_power_buffer: f64,

    /// Maximum connection distance as a fraction of the smaller map dimension.
    #[serde(default = "default_connection_range_fraction")]
    pub connection_range_fraction: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            connection_power_buffer: default_connection_power_buffer(),
            connection_range_fraction: default_connection_range_fraction(),
        }
    }
}

/// Bounded-retry random placement parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlacementConfig {
    /// Candidate cells drawn before a placement is abandoned.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Half-width of the square searched when siting a reactor near a settlement.
    #[serde(default = "default_siting_radius")]
    pub siting_radius: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            siting_radius: default_siting_radius(),
        }
    }
}

/// Population range for newly generated settlements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettlementConfig {
    /// Smallest initial population (inclusive).
    #[serde(default = "default_min_initial_population")]
    pub min_initial_population: u64,

    /// Largest initial population (inclusive).
    #[serde(default = "default_max_initial_population")]
    pub max_initial_population: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            min_initial_population: default_min_initial_population(),
            max_initial_population: default_max_initial_population(),
        }
    }
}

/// Contamination cloud parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContaminationConfig {
    /// Copy the ambient wind into every active cloud before it drifts.
    ///
    /// When `false`, clouds keep the wind they spawned with until it is set
    /// explicitly.
    #[serde(default = "default_true")]
    pub follow_ambient_wind: bool,
}

impl Default for ContaminationConfig {
    fn default() -> Self {
        Self {
            follow_ambient_wind: true,
        }
    }
}

/// Startup parameters supplied once before the world is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupParams {
    /// Map width in cells (at least [`MIN_MAP_DIMENSION`]).
    pub map_width: u32,
    /// Map height in cells (at least [`MIN_MAP_DIMENSION`]).
    pub map_height: u32,
    /// Maximum number of settlements.
    pub max_settlements: u32,
    /// Maximum number of active reactors.
    pub max_reactors: u32,
    /// Settlements generated at startup.
    pub initial_settlements: u32,
    /// Reactors generated at startup.
    pub initial_reactors: u32,
}

impl StartupParams {
    /// Reject dimensions below the minimum, zero limits, and initial counts
    /// above their limits.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfiguration`] describing the first
    /// violated constraint.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.map_width < MIN_MAP_DIMENSION || self.map_height < MIN_MAP_DIMENSION {
            return Err(WorldError::InvalidConfiguration {
                reason: format!(
                    "map must be at least {MIN_MAP_DIMENSION}x{MIN_MAP_DIMENSION}, got {}x{}",
                    self.map_width, self.map_height
                ),
            });
        }
        if self.max_settlements < 1 || self.max_reactors < 1 {
            return Err(WorldError::InvalidConfiguration {
                reason: format!(
                    "settlement and reactor limits must be at least 1, got {} and {}",
                    self.max_settlements, self.max_reactors
                ),
            });
        }
        if self.initial_settlements > self.max_settlements {
            return Err(WorldError::InvalidConfiguration {
                reason: format!(
                    "initial settlements ({}) exceed the limit ({})",
                    self.initial_settlements, self.max_settlements
                ),
            });
        }
        if self.initial_reactors > self.max_reactors {
            return Err(WorldError::InvalidConfiguration {
                reason: format!(
                    "initial reactors ({}) exceed the limit ({})",
                    self.initial_reactors, self.max_reactors
                ),
            });
        }
        Ok(())
    }

    /// The maximum assignment distance for these dimensions.
    pub fn connection_range(&self, energy: &EnergyConfig) -> f64 {
        f64::from(self.map_width.min(self.map_height)) * energy.connection_range_fraction
    }
}

// ---------------------------------------------------------------------------
// Default value functions (used by serde)
// ---------------------------------------------------------------------------

const fn default_malfunction_base_chance() -> f64 {
    0.12
}

const fn default_durability_decay_normal() -> f64 {
    0.985
}

const fn default_durability_decay_malfunction() -> f64 {
    0.94
}

const fn default_explosion_durability_threshold() -> f64 {
    0.3
}

const fn default_explosion_power_threshold() -> f64 {
    0.85
}

const fn default_connection_power_buffer() -> f64 {
    1.05
}

const fn default_connection_range_fraction() -> f64 {
    0.3
}

const fn default_max_attempts() -> u32 {
    50
}

const fn default_siting_radius() -> u32 {
    40
}

const fn default_min_initial_population() -> u64 {
    10_000
}

const fn default_max_initial_population() -> u64 {
    100_000
}

const fn default_true() -> bool {
    true
}
