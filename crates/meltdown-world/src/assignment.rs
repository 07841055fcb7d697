//! Settlement-to-reactor matching.
//!
//! Runs once per tick before any entity updates. A settlement needs a
//! reactor when it has no link or its linked reactor is inactive. Orphans are
//! detached first, then matched to the nearest active reactor that is both
//! within range and has enough spare capacity for the buffered demand.
//!
//! Reactors are evaluated in the order of the slice handed in, which the
//! world keeps in ascending id order. Only a strictly smaller distance
//! replaces the current best, so among exact ties the lowest id wins.

use meltdown_types::ReactorId;

use crate::config::{EnergyConfig, StartupParams};
use crate::entity::Entity;
use crate::reactor::{Reactor, find_reactor_mut};
use crate::settlement::Settlement;

/// Result of running assignment for one settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// The settlement is inactive and was not considered.
    Skipped,
    /// The settlement is already linked to an active reactor.
    AlreadyLinked(ReactorId),
    /// The settlement was linked to this reactor.
    Linked(ReactorId),
    /// No eligible reactor exists; the world should site one nearby.
    Unserved,
}

/// Distance and capacity rules for linking settlements to reactors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentEngine {
    /// Maximum planar link distance in cells.
    range: f64,
    /// Spare capacity required, as a multiple of demand.
    power_buffer: f64,
}

impl AssignmentEngine {
    /// Create an engine with an explicit range and power buffer.
    pub const fn new(range: f64, power_buffer: f64) -> Self {
        Self {
            range,
            power_buffer,
        }
    }

    /// Create an engine from the map dimensions and energy tunables.
    pub fn from_config(params: &StartupParams, energy: &EnergyConfig) -> Self {
        Self::new(params.connection_range(energy), energy.connection_power_buffer)
    }

    /// Spare capacity a reactor needs to accept `settlement`.
    pub fn required_capacity(&self, settlement: &Settlement) -> f64 {
        settlement.energy_demand() * self.power_buffer
    }

    /// Whether `reactor` may accept `settlement` right now.
    pub fn is_eligible(&self, settlement: &Settlement, reactor: &Reactor) -> bool {
        reactor.is_active()
            && settlement.position().planar_distance(reactor.position()) <= self.range
            && reactor.spare_capacity() >= self.required_capacity(settlement)
    }

    /// The nearest eligible reactor, if any.
    pub fn nearest_eligible(&self, settlement: &Settlement, reactors: &[Reactor]) -> Option<ReactorId> {
        let mut best: Option<(f64, ReactorId)> = None;
        for reactor in reactors {
            if !self.is_eligible(settlement, reactor) {
                continue;
            }
            let distance = settlement.position().planar_distance(reactor.position());
            if best.is_none_or(|(closest, _)| distance < closest) {
                best = Some((distance, reactor.id()));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Run assignment for one settlement.
    pub fn assign(&self, settlement: &mut Settlement, reactors: &mut [Reactor]) -> AssignmentOutcome {
        if !settlement.is_active() {
            return AssignmentOutcome::Skipped;
        }
        release_orphan(settlement, reactors);
        if let Some(current) = settlement.reactor() {
            return AssignmentOutcome::AlreadyLinked(current);
        }

        let Some(id) = self.nearest_eligible(settlement, reactors) else {
            return AssignmentOutcome::Unserved;
        };
        match find_reactor_mut(reactors, id) {
            Some(reactor) => {
                link(settlement, reactor);
                AssignmentOutcome::Linked(id)
            }
            None => AssignmentOutcome::Unserved,
        }
    }
}

/// Detach `settlement` from its reactor if that reactor is gone or inactive.
///
/// Returns the reactor it was detached from.
pub fn release_orphan(settlement: &mut Settlement, reactors: &mut [Reactor]) -> Option<ReactorId> {
    let linked = settlement.reactor()?;
    match find_reactor_mut(reactors, linked) {
        Some(reactor) if reactor.is_active() => None,
        Some(reactor) => {
            reactor.remove_settlement(settlement.id());
            settlement.disconnect()
        }
        None => settlement.disconnect(),
    }
}

/// Link both sides and reserve the settlement's demand on the reactor.
pub fn link(settlement: &mut Settlement, reactor: &mut Reactor) {
    reactor.add_settlement(settlement.id(), settlement.energy_demand());
    settlement.connect(reactor.id());
}
