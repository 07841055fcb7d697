//! Reactors: power sources with wear, malfunctions, and explosions.
//!
//! A reactor is in one of three states: active and normal, active and
//! malfunctioning (re-rolled every tick), or inactive. Inactive is terminal.
//!
//! Each tick, in order:
//!
//! 1. Recompute `current_power` from the connected settlements' demand.
//! 2. Roll a malfunction with probability
//!    `base * (1 / level) * (1 + (1 - durability))`.
//! 3. Decay durability by the malfunction or normal factor, clamped at 0.
//! 4. Explode if malfunctioning, worn below the durability threshold, and
//!    loaded above the power threshold. The caller spawns the cloud.
//! 5. Deactivate if durability fell below [`WORN_OUT_DURABILITY`].

use meltdown_types::{EntityRef, GridPos, ReactorId, ReactorLevel, SettlementId};
use rand::Rng;

use crate::config::ReactorConfig;
use crate::entity::{Entity, EntityCore};
use crate::settlement::{Settlement, find_settlement};

/// Durability below which a reactor shuts down for good.
pub const WORN_OUT_DURABILITY: f64 = 0.01;

/// What happened to a reactor during its update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReactorOutcome {
    /// The reactor was already inactive and did nothing.
    Dormant,
    /// The reactor is still running.
    Running,
    /// The reactor exploded and must seed a contamination cloud.
    Exploded(Explosion),
    /// Durability collapsed and the reactor shut down.
    WornOut,
}

/// Details needed to seed a contamination cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    /// The reactor that exploded.
    pub reactor: ReactorId,
    /// Where it stood.
    pub position: GridPos,
    /// Its maximum power, which sizes the cloud.
    pub max_power: f64,
}

/// A power-generating reactor.
#[derive(Debug, Clone)]
pub struct Reactor {
    core: EntityCore,
    id: ReactorId,
    level: ReactorLevel,
    max_power: f64,
    current_power: f64,
    durability: f64,
    malfunctioning: bool,
    /// Owning list of connected settlements. Order is not significant.
    connected: Vec<SettlementId>,
}

impl Reactor {
    /// Build a reactor, drawing its maximum power uniformly from the level's range.
    pub fn new(id: ReactorId, position: GridPos, level: ReactorLevel, rng: &mut impl Rng) -> Self {
        let (min, max) = level.power_range();
        Self::with_max_power(id, position, level, rng.random_range(min..max))
    }

    /// Build a reactor with a fixed maximum power.
    pub fn with_max_power(
        id: ReactorId,
        position: GridPos,
        level: ReactorLevel,
        max_power: f64,
    ) -> Self {
        Self {
            core: EntityCore::new(EntityRef::Reactor(id), position),
            id,
            level,
            max_power,
            current_power: 0.0,
            durability: 1.0,
            malfunctioning: false,
            connected: Vec::new(),
        }
    }

    /// Reactor identifier.
    pub const fn id(&self) -> ReactorId {
        self.id
    }

    /// Technology level.
    pub const fn level(&self) -> ReactorLevel {
        self.level
    }

    /// Maximum output in MW, fixed at construction.
    pub const fn max_power(&self) -> f64 {
        self.max_power
    }

    /// Current load in MW.
    pub const fn current_power(&self) -> f64 {
        self.current_power
    }

    /// Unused capacity in MW.
    pub fn spare_capacity(&self) -> f64 {
        self.max_power - self.current_power
    }

    /// Wear metric in `[0, 1]`.
    pub const fn durability(&self) -> f64 {
        self.durability
    }

    /// Whether the last update rolled a malfunction.
    pub const fn is_malfunctioning(&self) -> bool {
        self.malfunctioning
    }

    /// Connected settlements.
    pub fn connected_settlements(&self) -> &[SettlementId] {
        &self.connected
    }

    /// Whether `settlement` is connected.
    pub fn is_connected(&self, settlement: SettlementId) -> bool {
        self.connected.contains(&settlement)
    }

    /// Connect a settlement and reserve its demand against spare capacity.
    ///
    /// Connecting an already connected settlement is a no-op.
    pub fn add_settlement(&mut self, settlement: SettlementId, demand: f64) {
        if self.is_connected(settlement) {
            return;
        }
        self.connected.push(settlement);
        self.current_power += demand;
    }

    /// Disconnect a settlement. Returns `false` if it was not connected.
    pub fn remove_settlement(&mut self, settlement: SettlementId) -> bool {
        match self.connected.iter().position(|&id| id == settlement) {
            Some(index) => {
                self.connected.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Set `current_power` to the summed demand of the connected settlements.
    ///
    /// `settlements` must be sorted by id, as the world keeps them.
    pub fn recompute_power(&mut self, settlements: &[Settlement]) {
        self.current_power = self
            .connected
            .iter()
            .filter_map(|&id| find_settlement(settlements, id))
            .map(Settlement::energy_demand)
            .sum();
    }

    /// Per-tick malfunction probability at the current durability.
    pub fn malfunction_chance(&self, config: &ReactorConfig) -> f64 {
        let level_modifier = 1.0 / f64::from(self.level.number());
        let wear_modifier = 1.0 + (1.0 - self.durability);
        config.malfunction_base_chance * level_modifier * wear_modifier
    }

    /// Advance one tick. Inactive reactors do nothing.
    pub fn update(
        &mut self,
        settlements: &[Settlement],
        config: &ReactorConfig,
        rng: &mut impl Rng,
    ) -> ReactorOutcome {
        if !self.is_active() {
            return ReactorOutcome::Dormant;
        }

        self.recompute_power(settlements);

        let chance = self.malfunction_chance(config);
        self.malfunctioning = rng.random::<f64>() < chance;

        let decay = if self.malfunctioning {
            config.durability_decay_malfunction
        } else {
            config.durability_decay_normal
        };
        self.durability = (self.durability * decay).clamp(0.0, 1.0);

        if self.malfunctioning
            && self.durability < config.explosion_durability_threshold
            && self.current_power > self.max_power * config.explosion_power_threshold
        {
            self.deactivate();
            return ReactorOutcome::Exploded(Explosion {
                reactor: self.id,
                position: self.position(),
                max_power: self.max_power,
            });
        }

        if self.durability < WORN_OUT_DURABILITY {
            self.deactivate();
            return ReactorOutcome::WornOut;
        }

        ReactorOutcome::Running
    }
}

impl Entity for Reactor {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    /// Deactivation zeroes durability so an inactive reactor always reads 0.
    fn deactivate(&mut self) {
        self.durability = 0.0;
        self.core.deactivate();
    }
}

/// Look up a reactor in an id-sorted slice.
pub(crate) fn find_reactor(reactors: &[Reactor], id: ReactorId) -> Option<&Reactor> {
    reactors
        .binary_search_by_key(&id, Reactor::id)
        .ok()
        .and_then(|index| reactors.get(index))
}

/// Mutable variant of [`find_reactor`].
pub(crate) fn find_reactor_mut(reactors: &mut [Reactor], id: ReactorId) -> Option<&mut Reactor> {
    reactors
        .binary_search_by_key(&id, Reactor::id)
        .ok()
        .and_then(|index| reactors.get_mut(index))
}
