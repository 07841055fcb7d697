//! The world: owner of every entity collection, the occupancy index, and the
//! wind, and the orchestrator of one simulation tick.
//!
//! # Tick order
//!
//! 1. Refresh the ambient wind.
//! 2. Run assignment for every settlement, siting new reactors for
//!    settlements no existing reactor can serve.
//! 3. Update every active settlement.
//! 4. Update every active reactor; explosions seed contamination clouds.
//! 5. Update every active cloud and apply its fallout.
//!
//! Entities are never removed. Each per-kind collection is a `Vec` kept in
//! ascending id order (ids are allocated sequentially and only appended), so
//! lookups are binary searches and iteration order is creation order.

use meltdown_types::{
    ContaminationId, ContaminationView, ELEVATED_LEVEL, EntityKind, EntityRef, GROUND_LEVEL,
    GridPos, ReactorId, ReactorLevel, ReactorView, SettlementId, SettlementView, WindDirection,
    WorldSnapshot,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::assignment::{self, AssignmentEngine, AssignmentOutcome};
use crate::config::{StartupParams, WorldTunables};
use crate::contamination::{Contamination, Fallout};
use crate::entity::Entity;
use crate::error::WorldError;
use crate::occupancy::OccupancyGrid;
use crate::placement::PlacementSampler;
use crate::reactor::{Explosion, Reactor, ReactorOutcome, find_reactor, find_reactor_mut};
use crate::settlement::{Settlement, find_settlement, find_settlement_mut};
use crate::wind::WindSystem;

/// What happened during one tick, for logging and run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Ambient wind during the tick.
    pub wind: WindDirection,
    /// Whether the wind differs from the previous tick's reading.
    pub wind_changed: bool,
    /// Settlements newly linked to a reactor.
    pub links_made: u32,
    /// Reactors sited near unserved settlements.
    pub reactors_sited: u32,
    /// Reactors that exploded.
    pub explosions: u32,
    /// Reactors shut down by wear.
    pub worn_out: u32,
    /// Reactors disabled by contamination.
    pub reactors_contaminated: u32,
    /// Clouds that reached their maximum age.
    pub clouds_dissipated: u32,
}

impl TickReport {
    const fn new(wind: WindDirection, wind_changed: bool) -> Self {
        Self {
            wind,
            wind_changed,
            links_made: 0,
            reactors_sited: 0,
            explosions: 0,
            worn_out: 0,
            reactors_contaminated: 0,
            clouds_dissipated: 0,
        }
    }
}

/// The simulated territory.
#[derive(Debug, Clone)]
pub struct World {
    params: StartupParams,
    tunables: WorldTunables,
    grid: OccupancyGrid,
    settlements: Vec<Settlement>,
    reactors: Vec<Reactor>,
    contaminations: Vec<Contamination>,
    wind: WindSystem,
    rng: StdRng,
    next_settlement_id: SettlementId,
    next_reactor_id: ReactorId,
    next_contamination_id: ContaminationId,
}

impl World {
    /// Build an empty world.
    ///
    /// With a `seed` every random draw is reproducible; without one the
    /// generator is seeded from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfiguration`] if the startup parameters
    /// or tunables are rejected. No world is created in that case.
    pub fn new(
        params: StartupParams,
        tunables: &WorldTunables,
        seed: Option<u64>,
    ) -> Result<Self, WorldError> {
        params.validate()?;
        tunables.validate()?;
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Ok(Self {
            params,
            tunables: tunables.clone(),
            grid: OccupancyGrid::new(params.map_width, params.map_height),
            settlements: Vec::new(),
            reactors: Vec::new(),
            contaminations: Vec::new(),
            wind: WindSystem::new(),
            rng,
            next_settlement_id: SettlementId::FIRST,
            next_reactor_id: ReactorId::FIRST,
            next_contamination_id: ContaminationId::FIRST,
        })
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// Startup parameters.
    pub const fn params(&self) -> &StartupParams {
        &self.params
    }

    /// Tunables.
    pub const fn tunables(&self) -> &WorldTunables {
        &self.tunables
    }

    /// Occupancy index.
    pub const fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Map width in cells.
    pub const fn width(&self) -> u32 {
        self.params.map_width
    }

    /// Map height in cells.
    pub const fn height(&self) -> u32 {
        self.params.map_height
    }

    /// Current ambient wind.
    pub const fn wind(&self) -> WindDirection {
        self.wind.current()
    }

    /// All settlements in id order.
    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    /// All reactors in id order.
    pub fn reactors(&self) -> &[Reactor] {
        &self.reactors
    }

    /// All contamination clouds in id order.
    pub fn contaminations(&self) -> &[Contamination] {
        &self.contaminations
    }

    /// Look up a settlement.
    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        find_settlement(&self.settlements, id)
    }

    /// Look up a reactor.
    pub fn reactor(&self, id: ReactorId) -> Option<&Reactor> {
        find_reactor(&self.reactors, id)
    }

    /// Look up a contamination cloud.
    pub fn contamination(&self, id: ContaminationId) -> Option<&Contamination> {
        self.contaminations
            .binary_search_by_key(&id, Contamination::id)
            .ok()
            .and_then(|index| self.contaminations.get(index))
    }

    /// Number of settlements ever created.
    pub fn settlement_count(&self) -> u32 {
        count_u32(self.settlements.len())
    }

    /// Number of reactors ever created.
    pub fn reactor_count(&self) -> u32 {
        count_u32(self.reactors.len())
    }

    /// Number of reactors still active.
    pub fn active_reactor_count(&self) -> u32 {
        count_u32(self.reactors.iter().filter(|r| r.is_active()).count())
    }

    /// Summed population over all settlements.
    pub fn total_population(&self) -> u64 {
        self.settlements
            .iter()
            .fold(0_u64, |total, s| total.saturating_add(s.population()))
    }

    /// Summed energy demand over all settlements, in MW.
    pub fn total_energy_demand(&self) -> f64 {
        self.settlements.iter().map(Settlement::energy_demand).sum()
    }

    /// The assignment rules for this world's dimensions and tunables.
    pub fn assignment_engine(&self) -> AssignmentEngine {
        AssignmentEngine::from_config(&self.params, &self.tunables.energy)
    }

    const fn sampler(&self) -> PlacementSampler {
        PlacementSampler::new(self.tunables.placement.max_attempts)
    }

    // -------------------------------------------------------------------
    // Generation and insertion
    // -------------------------------------------------------------------

    /// Site the configured initial reactors, then the initial settlements.
    ///
    /// Placement failures are logged and skipped.
    pub fn seed_initial_entities(&mut self) {
        for _ in 0..self.params.initial_reactors {
            if let Err(err) = self.generate_reactor() {
                warn!(%err, "Initial reactor not placed");
            }
        }
        for _ in 0..self.params.initial_settlements {
            if let Err(err) = self.generate_settlement() {
                warn!(%err, "Initial settlement not placed");
            }
        }
        info!(
            settlements = self.settlements.len(),
            reactors = self.reactors.len(),
            width = self.width(),
            height = self.height(),
            "World seeded"
        );
    }

    /// Create one settlement with a random population at a random free cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CapacityReached`] at the settlement limit and
    /// [`WorldError::PlacementFailed`] when no free cell was found.
    pub fn generate_settlement(&mut self) -> Result<SettlementId, WorldError> {
        self.ensure_settlement_capacity()?;
        let sampler = self.sampler();
        let position = sampler
            .sample_anywhere(&self.grid, GROUND_LEVEL, &mut self.rng)
            .ok_or(WorldError::PlacementFailed {
                kind: EntityKind::Settlement,
                attempts: sampler.max_attempts(),
            })?;
        let range = &self.tunables.settlement;
        let population = self
            .rng
            .random_range(range.min_initial_population..=range.max_initial_population);
        self.insert_settlement(position, population)
    }

    /// Create one reactor of a random level at a random free cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CapacityReached`] when the active-reactor limit
    /// is reached and [`WorldError::PlacementFailed`] when no free cell was
    /// found.
    pub fn generate_reactor(&mut self) -> Result<ReactorId, WorldError> {
        self.ensure_reactor_capacity()?;
        let sampler = self.sampler();
        let position = sampler
            .sample_anywhere(&self.grid, GROUND_LEVEL, &mut self.rng)
            .ok_or(WorldError::PlacementFailed {
                kind: EntityKind::Reactor,
                attempts: sampler.max_attempts(),
            })?;
        let index = self.rng.random_range(0..ReactorLevel::ALL.len());
        let level = ReactorLevel::ALL
            .get(index)
            .copied()
            .unwrap_or(ReactorLevel::One);
        self.insert_reactor(position, level)
    }

    /// Place a settlement at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellUnavailable`] if the cell is off the ground
    /// level, out of bounds, or occupied, and [`WorldError::CapacityReached`]
    /// at the settlement limit. Nothing changes on error.
    pub fn insert_settlement(
        &mut self,
        position: GridPos,
        population: u64,
    ) -> Result<SettlementId, WorldError> {
        self.ensure_settlement_capacity()?;
        ensure_ground_cell(position)?;
        let id = self.next_settlement_id;
        let following = id
            .next()
            .ok_or(WorldError::IdOverflow(EntityKind::Settlement))?;
        let settlement = Settlement::new(id, position, population);
        if !self.grid.place(&settlement) {
            return Err(WorldError::CellUnavailable(position));
        }
        self.next_settlement_id = following;
        self.settlements.push(settlement);
        debug!(settlement = %id, %position, population, "Settlement created");
        Ok(id)
    }

    /// Place a reactor of `level` at `position`, drawing its maximum power.
    ///
    /// # Errors
    ///
    /// Same as [`insert_reactor_with_max_power`](Self::insert_reactor_with_max_power).
    pub fn insert_reactor(
        &mut self,
        position: GridPos,
        level: ReactorLevel,
    ) -> Result<ReactorId, WorldError> {
        self.place_reactor(position, |id, rng| Reactor::new(id, position, level, rng))
    }

    /// Place a reactor with a fixed maximum power at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellUnavailable`] if the cell is off the ground
    /// level, out of bounds, or occupied, and [`WorldError::CapacityReached`]
    /// when the active-reactor limit is reached. Nothing changes on error.
    pub fn insert_reactor_with_max_power(
        &mut self,
        position: GridPos,
        level: ReactorLevel,
        max_power: f64,
    ) -> Result<ReactorId, WorldError> {
        self.place_reactor(position, |id, _| {
            Reactor::with_max_power(id, position, level, max_power)
        })
    }

    fn place_reactor<F>(&mut self, position: GridPos, build: F) -> Result<ReactorId, WorldError>
    where
        F: FnOnce(ReactorId, &mut StdRng) -> Reactor,
    {
        self.ensure_reactor_capacity()?;
        ensure_ground_cell(position)?;
        let id = self.next_reactor_id;
        let following = id.next().ok_or(WorldError::IdOverflow(EntityKind::Reactor))?;
        let reactor = build(id, &mut self.rng);
        if !self.grid.place(&reactor) {
            return Err(WorldError::CellUnavailable(position));
        }
        self.next_reactor_id = following;
        debug!(
            reactor = %id,
            %position,
            level = reactor.level().number(),
            max_power = reactor.max_power(),
            "Reactor created"
        );
        self.reactors.push(reactor);
        Ok(id)
    }

    /// Site a new reactor near `settlement`, sized for its buffered demand.
    ///
    /// The reactor is not linked here; assignment links it when eligible.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SettlementNotFound`] for an unknown id,
    /// [`WorldError::CapacityReached`] at the active-reactor limit, and
    /// [`WorldError::PlacementFailed`] when no free nearby cell was found.
    pub fn site_reactor_near(&mut self, settlement: SettlementId) -> Result<ReactorId, WorldError> {
        let engine = self.assignment_engine();
        let (center, required) = self
            .settlement(settlement)
            .map(|s| (s.position(), engine.required_capacity(s)))
            .ok_or(WorldError::SettlementNotFound(settlement))?;
        self.ensure_reactor_capacity()?;

        let level = ReactorLevel::minimum_for(required);
        let sampler = self.sampler();
        let position = sampler
            .sample_near(&self.grid, center, self.tunables.placement.siting_radius, &mut self.rng)
            .ok_or(WorldError::PlacementFailed {
                kind: EntityKind::Reactor,
                attempts: sampler.max_attempts(),
            })?;
        let id = self.insert_reactor(position, level)?;
        info!(
            %settlement,
            reactor = %id,
            level = level.number(),
            %position,
            "Reactor sited near settlement"
        );
        Ok(id)
    }

    // -------------------------------------------------------------------
    // Operator controls
    // -------------------------------------------------------------------

    /// Permanently deactivate the entity behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns the matching not-found error for an unknown handle.
    pub fn deactivate(&mut self, handle: EntityRef) -> Result<(), WorldError> {
        match handle {
            EntityRef::Settlement(id) => self.deactivate_settlement(id)?,
            EntityRef::Reactor(id) => find_reactor_mut(&mut self.reactors, id)
                .ok_or(WorldError::ReactorNotFound(id))?
                .deactivate(),
            EntityRef::Contamination(id) => self
                .contamination_mut(id)
                .ok_or(WorldError::ContaminationNotFound(id))?
                .deactivate(),
        }
        info!(entity = %handle, "Entity deactivated");
        Ok(())
    }

    /// Deactivate a settlement and release its reactor link so the frozen
    /// demand stops counting against that reactor.
    fn deactivate_settlement(&mut self, id: SettlementId) -> Result<(), WorldError> {
        let settlement = find_settlement_mut(&mut self.settlements, id)
            .ok_or(WorldError::SettlementNotFound(id))?;
        settlement.deactivate();
        let Some(reactor_id) = settlement.disconnect() else {
            return Ok(());
        };
        if let Some(reactor) = find_reactor_mut(&mut self.reactors, reactor_id) {
            reactor.remove_settlement(id);
            reactor.recompute_power(&self.settlements);
            debug!(settlement = %id, reactor = %reactor_id, "Link released");
        }
        Ok(())
    }

    /// Overwrite a settlement's contamination level (clamped into `[0, 100]`).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SettlementNotFound`] for an unknown id.
    pub fn set_contamination_level(
        &mut self,
        settlement: SettlementId,
        level: f64,
    ) -> Result<(), WorldError> {
        find_settlement_mut(&mut self.settlements, settlement)
            .ok_or(WorldError::SettlementNotFound(settlement))?
            .set_contamination_level(level);
        Ok(())
    }

    /// Set the wind a single cloud drifts with, independent of the ambient wind.
    ///
    /// With `follow_ambient_wind` enabled the next tick overwrites it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ContaminationNotFound`] for an unknown id.
    pub fn set_contamination_wind(
        &mut self,
        id: ContaminationId,
        wind: WindDirection,
    ) -> Result<(), WorldError> {
        self.contamination_mut(id)
            .ok_or(WorldError::ContaminationNotFound(id))?
            .set_wind(wind);
        Ok(())
    }

    fn contamination_mut(&mut self, id: ContaminationId) -> Option<&mut Contamination> {
        self.contaminations
            .binary_search_by_key(&id, Contamination::id)
            .ok()
            .and_then(|index| self.contaminations.get_mut(index))
    }

    // -------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------

    /// Advance the world by one tick.
    pub fn tick(&mut self) -> TickReport {
        let wind = self.wind.refresh(&mut self.rng);
        let mut report = TickReport::new(wind, self.wind.changed());
        if report.wind_changed {
            debug!(from = %self.wind.previous(), to = %wind, "Wind shifted");
        }

        self.run_assignment(&mut report);
        self.update_settlements();
        self.update_reactors(&mut report);
        self.update_contaminations(&mut report);

        report
    }

    fn run_assignment(&mut self, report: &mut TickReport) {
        let engine = self.assignment_engine();
        for index in 0..self.settlements.len() {
            let Some(settlement) = self.settlements.get_mut(index) else {
                continue;
            };
            match engine.assign(settlement, &mut self.reactors) {
                AssignmentOutcome::Linked(reactor) => {
                    debug!(settlement = %settlement.id(), %reactor, "Settlement linked");
                    report.links_made = report.links_made.saturating_add(1);
                }
                AssignmentOutcome::Unserved => {
                    let id = settlement.id();
                    self.serve_with_new_reactor(id, &engine, report);
                }
                AssignmentOutcome::Skipped | AssignmentOutcome::AlreadyLinked(_) => {}
            }
        }
    }

    fn serve_with_new_reactor(
        &mut self,
        settlement: SettlementId,
        engine: &AssignmentEngine,
        report: &mut TickReport,
    ) {
        match self.site_reactor_near(settlement) {
            Ok(reactor) => {
                report.reactors_sited = report.reactors_sited.saturating_add(1);
                if self.link_if_eligible(settlement, reactor, engine) {
                    report.links_made = report.links_made.saturating_add(1);
                }
            }
            Err(err @ WorldError::CapacityReached { .. }) => {
                debug!(%settlement, %err, "Settlement left unserved");
            }
            Err(err) => {
                warn!(%settlement, %err, "Reactor siting failed");
            }
        }
    }

    fn link_if_eligible(
        &mut self,
        settlement: SettlementId,
        reactor: ReactorId,
        engine: &AssignmentEngine,
    ) -> bool {
        let Some(settlement) = find_settlement_mut(&mut self.settlements, settlement) else {
            return false;
        };
        let Some(reactor) = find_reactor_mut(&mut self.reactors, reactor) else {
            return false;
        };
        if !engine.is_eligible(settlement, reactor) {
            return false;
        }
        assignment::link(settlement, reactor);
        true
    }

    fn update_settlements(&mut self) {
        for settlement in self.settlements.iter_mut().filter(|s| s.is_active()) {
            settlement.update(&mut self.rng);
        }
    }

    fn update_reactors(&mut self, report: &mut TickReport) {
        let mut explosions = Vec::new();
        for reactor in &mut self.reactors {
            match reactor.update(&self.settlements, &self.tunables.reactor, &mut self.rng) {
                ReactorOutcome::Exploded(explosion) => {
                    warn!(
                        reactor = %explosion.reactor,
                        position = %explosion.position,
                        max_power = explosion.max_power,
                        connected = reactor.connected_settlements().len(),
                        "Reactor exploded"
                    );
                    explosions.push(explosion);
                }
                ReactorOutcome::WornOut => {
                    info!(reactor = %reactor.id(), "Reactor worn out");
                    report.worn_out = report.worn_out.saturating_add(1);
                }
                ReactorOutcome::Running | ReactorOutcome::Dormant => {}
            }
        }
        for explosion in &explosions {
            report.explosions = report.explosions.saturating_add(1);
            if let Err(err) = self.spawn_contamination(explosion) {
                warn!(reactor = %explosion.reactor, %err, "Contamination not spawned");
            }
        }
    }

    fn spawn_contamination(&mut self, explosion: &Explosion) -> Result<ContaminationId, WorldError> {
        let id = self.next_contamination_id;
        let following = id
            .next()
            .ok_or(WorldError::IdOverflow(EntityKind::Contamination))?;
        let cloud = Contamination::new(id, explosion, self.wind.current());
        if !self.grid.place(&cloud) {
            return Err(WorldError::CellUnavailable(
                explosion.position.with_level(ELEVATED_LEVEL),
            ));
        }
        self.next_contamination_id = following;
        info!(
            contamination = %id,
            source = %explosion.reactor,
            radius = cloud.radius(),
            max_age = cloud.max_age(),
            wind = %cloud.wind(),
            "Contamination spawned"
        );
        self.contaminations.push(cloud);
        Ok(id)
    }

    fn update_contaminations(&mut self, report: &mut TickReport) {
        let follow = self.tunables.contamination.follow_ambient_wind;
        let ambient = self.wind.current();
        let (width, height) = (self.width(), self.height());

        for cloud in self.contaminations.iter_mut().filter(|c| c.is_active()) {
            if follow {
                cloud.set_wind(ambient);
            }
            let Some(fallout) = cloud.update(width, height) else {
                continue;
            };
            let disabled = apply_fallout(&fallout, &mut self.settlements, &mut self.reactors);
            report.reactors_contaminated = report.reactors_contaminated.saturating_add(disabled);
            if !cloud.is_active() {
                info!(contamination = %cloud.id(), age = cloud.age(), "Contamination dissipated");
                report.clouds_dissipated = report.clouds_dissipated.saturating_add(1);
            }
        }
    }

    // -------------------------------------------------------------------
    // Snapshot
    // -------------------------------------------------------------------

    /// A read-only picture of the world after `step`.
    pub fn snapshot(&self, step: u64) -> WorldSnapshot {
        WorldSnapshot {
            step,
            width: self.width(),
            height: self.height(),
            wind: self.wind(),
            settlements: self.settlements.iter().map(settlement_view).collect(),
            reactors: self.reactors.iter().map(reactor_view).collect(),
            contaminations: self.contaminations.iter().map(contamination_view).collect(),
        }
    }

    // -------------------------------------------------------------------
    // Guards
    // -------------------------------------------------------------------

    fn ensure_settlement_capacity(&self) -> Result<(), WorldError> {
        if self.settlement_count() >= self.params.max_settlements {
            return Err(WorldError::CapacityReached {
                kind: EntityKind::Settlement,
                max: self.params.max_settlements,
            });
        }
        Ok(())
    }

    fn ensure_reactor_capacity(&self) -> Result<(), WorldError> {
        if self.active_reactor_count() >= self.params.max_reactors {
            return Err(WorldError::CapacityReached {
                kind: EntityKind::Reactor,
                max: self.params.max_reactors,
            });
        }
        Ok(())
    }
}

/// Settlements and reactors live on the ground level only.
fn ensure_ground_cell(position: GridPos) -> Result<(), WorldError> {
    if position.z != GROUND_LEVEL {
        return Err(WorldError::CellUnavailable(position));
    }
    Ok(())
}

/// Contaminate settlements and disable reactors in reach of `fallout`.
///
/// Returns the number of reactors disabled.
fn apply_fallout(fallout: &Fallout, settlements: &mut [Settlement], reactors: &mut [Reactor]) -> u32 {
    for settlement in settlements
        .iter_mut()
        .filter(|s| s.is_active() && fallout.reaches(s.position()))
    {
        settlement.contaminate(fallout.intensity);
    }

    let mut disabled = 0_u32;
    for reactor in reactors
        .iter_mut()
        .filter(|r| r.is_active() && fallout.reaches(r.position()))
    {
        reactor.deactivate();
        warn!(
            reactor = %reactor.id(),
            contamination = %fallout.source,
            "Reactor disabled by contamination"
        );
        disabled = disabled.saturating_add(1);
    }
    disabled
}

fn settlement_view(settlement: &Settlement) -> SettlementView {
    SettlementView {
        id: settlement.id(),
        position: settlement.position(),
        active: settlement.is_active(),
        population: settlement.population(),
        original_population: settlement.original_population(),
        contamination_level: settlement.contamination_level(),
        thriving: settlement.is_thriving(),
        reactor: settlement.reactor(),
    }
}

fn reactor_view(reactor: &Reactor) -> ReactorView {
    ReactorView {
        id: reactor.id(),
        position: reactor.position(),
        active: reactor.is_active(),
        level: reactor.level(),
        max_power: reactor.max_power(),
        current_power: reactor.current_power(),
        durability: reactor.durability(),
        malfunctioning: reactor.is_malfunctioning(),
        connected: count_u32(reactor.connected_settlements().len()),
    }
}

fn contamination_view(cloud: &Contamination) -> ContaminationView {
    ContaminationView {
        id: cloud.id(),
        position: cloud.position(),
        active: cloud.is_active(),
        radius: cloud.radius(),
        age: cloud.age(),
    }
}

fn count_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
