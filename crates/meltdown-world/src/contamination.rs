//! Contamination clouds spawned by reactor explosions.
//!
//! A cloud is sized by its source reactor's maximum power:
//!
//! ```text
//! base_radius    = 0.8 * (max_power / 100)^0.6
//! initial_radius = max(1.0, base_radius * 0.3)
//! max_radius     = base_radius * 9.8        (intensity multiplier only)
//! max_age        = 40 + floor(max_power / 100)
//! ```
//!
//! Each tick it ages by one, grows (fast for the first nine ticks, slow
//! after, never beyond [`RADIUS_CEILING`]), drifts with its wind, and emits a
//! [`Fallout`] the world applies to nearby settlements and reactors. It
//! deactivates on the tick its age reaches `max_age`.

use meltdown_types::{
    ContaminationId, ELEVATED_LEVEL, EntityRef, GridPos, ReactorId, WindDirection,
};

use crate::entity::{Entity, EntityCore};
use crate::reactor::Explosion;

/// Hard cap on cloud radius, in cells.
pub const RADIUS_CEILING: f64 = 15.0;

/// Last age (inclusive) at which the cloud grows at the fast rate.
const FAST_GROWTH_MAX_AGE: u32 = 9;
const FAST_GROWTH_PER_TICK: f64 = 4.1;
const SLOW_GROWTH_PER_TICK: f64 = 0.82;

/// Drift is `unit_vector * DRIFT_STRENGTH * DRIFT_SCALE` cells per tick.
const DRIFT_STRENGTH: f64 = 2.0;
const DRIFT_SCALE: f64 = 30.0;

/// Contamination added to a settlement per unit of `max_radius`.
const INTENSITY_PER_MAX_RADIUS: f64 = 2.0;

const BASE_MAX_AGE: u32 = 40;

/// The area a cloud covers this tick and how hard it hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fallout {
    /// The cloud producing the fallout.
    pub source: ContaminationId,
    /// Cloud center (its `z` is ignored for reach checks).
    pub center: GridPos,
    /// Current radius in cells.
    pub radius: f64,
    /// Contamination added to each settlement in reach.
    pub intensity: f64,
}

impl Fallout {
    /// Whether `pos` is within the radius in the plane.
    pub fn reaches(&self, pos: GridPos) -> bool {
        self.center.planar_distance(pos) <= self.radius
    }
}

/// A drifting, aging contamination cloud.
#[derive(Debug, Clone)]
pub struct Contamination {
    core: EntityCore,
    id: ContaminationId,
    source_reactor: ReactorId,
    radius: f64,
    max_radius: f64,
    age: u32,
    max_age: u32,
    wind: WindDirection,
}

impl Contamination {
    /// Seed a cloud over an exploded reactor, at the elevated level.
    pub fn new(id: ContaminationId, explosion: &Explosion, wind: WindDirection) -> Self {
        let base_radius = 0.8 * (explosion.max_power / 100.0).powf(0.6);
        Self {
            core: EntityCore::new(
                EntityRef::Contamination(id),
                explosion.position.with_level(ELEVATED_LEVEL),
            ),
            id,
            source_reactor: explosion.reactor,
            radius: (base_radius * 0.3).clamp(1.0, RADIUS_CEILING),
            max_radius: base_radius * 9.8,
            age: 0,
            max_age: BASE_MAX_AGE.saturating_add(whole_hundreds(explosion.max_power)),
            wind,
        }
    }

    /// Cloud identifier.
    pub const fn id(&self) -> ContaminationId {
        self.id
    }

    /// The reactor whose explosion produced this cloud.
    pub const fn source_reactor(&self) -> ReactorId {
        self.source_reactor
    }

    /// Current radius in cells.
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Intensity multiplier derived from the source reactor.
    pub const fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Ticks since spawn.
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Age at which the cloud deactivates.
    pub const fn max_age(&self) -> u32 {
        self.max_age
    }

    /// The wind this cloud drifts with.
    pub const fn wind(&self) -> WindDirection {
        self.wind
    }

    /// Replace the wind this cloud drifts with.
    pub const fn set_wind(&mut self, wind: WindDirection) {
        self.wind = wind;
    }

    /// Contamination added per tick to settlements in reach.
    pub fn intensity(&self) -> f64 {
        self.max_radius * INTENSITY_PER_MAX_RADIUS
    }

    /// Advance one tick inside a `width` x `height` map.
    ///
    /// Returns the fallout to apply, or `None` if the cloud was already
    /// inactive. The final tick still produces fallout.
    pub fn update(&mut self, width: u32, height: u32) -> Option<Fallout> {
        if !self.is_active() {
            return None;
        }

        self.age = self.age.saturating_add(1);

        self.radius = grown_radius(self.radius, self.age);

        let (dx, dy) = self.drift();
        let moved = self.position().translated_clamped(dx, dy, width, height);
        self.core.set_position(moved);

        let fallout = Fallout {
            source: self.id,
            center: moved,
            radius: self.radius,
            intensity: self.intensity(),
        };

        if self.age >= self.max_age {
            self.deactivate();
        }

        Some(fallout)
    }

    /// Planar displacement for one tick, rounded to whole cells.
    #[allow(clippy::cast_possible_truncation)]
    fn drift(&self) -> (i64, i64) {
        let (ux, uy) = self.wind.unit_vector();
        let scale = DRIFT_STRENGTH * DRIFT_SCALE;
        ((ux * scale).round() as i64, (uy * scale).round() as i64)
    }
}

impl Entity for Contamination {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }
}

/// Radius after one tick of growth at `age`.
fn grown_radius(radius: f64, age: u32) -> f64 {
    let growth = if age <= FAST_GROWTH_MAX_AGE {
        FAST_GROWTH_PER_TICK
    } else {
        SLOW_GROWTH_PER_TICK
    };
    (radius + growth).min(RADIUS_CEILING)
}

/// `floor(power / 100)` as a whole number, saturating at the `u32` range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_hundreds(power: f64) -> u32 {
    let hundreds = (power / 100.0).floor();
    if hundreds <= 0.0 {
        0
    } else if hundreds >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        hundreds as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explosion(max_power: f64) -> Explosion {
        Explosion {
            reactor: ReactorId(3),
            position: GridPos::ground(200, 200),
            max_power,
        }
    }

    fn cloud(max_power: f64, wind: WindDirection) -> Contamination {
        Contamination::new(ContaminationId(1), &explosion(max_power), wind)
    }

    #[test]
    fn spawns_elevated_over_reactor() {
        let c = cloud(1400.0, WindDirection::Calm);
        assert_eq!(c.position(), GridPos::new(200, 200, ELEVATED_LEVEL));
        assert_eq!(c.source_reactor(), ReactorId(3));
        assert_eq!(c.age(), 0);
        assert!(c.is_active());
    }

    #[test]
    fn sizing_follows_max_power() {
        let c = cloud(1400.0, WindDirection::Calm);
        let base = 0.8 * 14.0_f64.powf(0.6);
        assert!((c.radius() - (base * 0.3).max(1.0)).abs() < 1e-9);
        assert!((c.max_radius() - base * 9.8).abs() < 1e-9);
        assert!((c.intensity() - base * 9.8 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn small_reactor_gets_minimum_radius() {
        let c = cloud(60.0, WindDirection::Calm);
        assert!((c.radius() - 1.0).abs() < f64::EPSILON);
        assert_eq!(c.max_age(), 40);
    }

    #[test]
    fn level_four_cloud_lives_exactly_54_ticks() {
        let mut c = cloud(1400.0, WindDirection::Calm);
        assert_eq!(c.max_age(), 54);
        for tick in 1..=53_u32 {
            assert!(c.update(400, 400).is_some());
            assert_eq!(c.age(), tick);
            assert!(c.is_active(), "deactivated early at tick {tick}");
        }
        assert!(c.update(400, 400).is_some());
        assert_eq!(c.age(), 54);
        assert!(!c.is_active());
        assert!(c.update(400, 400).is_none());
        assert_eq!(c.age(), 54);
    }

    #[test]
    fn radius_grows_monotonically_to_ceiling() {
        let mut c = cloud(600.0, WindDirection::Calm);
        let mut previous = c.radius();
        while c.is_active() {
            let _ = c.update(400, 400);
            assert!(c.radius() >= previous);
            assert!(c.radius() <= RADIUS_CEILING);
            previous = c.radius();
        }
        assert!((c.radius() - RADIUS_CEILING).abs() < f64::EPSILON);
    }

    #[test]
    fn growth_is_fast_then_slow() {
        assert!((grown_radius(1.0, 1) - 5.1).abs() < 1e-9);
        assert!((grown_radius(3.0, 9) - 7.1).abs() < 1e-9);
        assert!((grown_radius(3.0, 10) - 3.82).abs() < 1e-9);
        assert!((grown_radius(14.5, 10) - RADIUS_CEILING).abs() < f64::EPSILON);
    }

    #[test]
    fn first_tick_uses_fast_growth() {
        // Initial radius is the 1.0 floor for a 50 MW reactor.
        let mut c = cloud(50.0, WindDirection::Calm);
        let _ = c.update(400, 400);
        assert!((c.radius() - 5.1).abs() < 1e-9);
    }

    #[test]
    fn east_wind_drifts_sixty_cells() {
        let mut c = cloud(200.0, WindDirection::East);
        let fallout = c.update(400, 400);
        assert_eq!(c.position(), GridPos::new(260, 200, ELEVATED_LEVEL));
        assert_eq!(fallout.map(|f| f.center), Some(c.position()));
    }

    #[test]
    fn diagonal_drift_is_normalized() {
        let mut c = cloud(200.0, WindDirection::NorthWest);
        let _ = c.update(400, 400);
        // 60 / sqrt(2) = 42.43, rounded to 42.
        assert_eq!(c.position(), GridPos::new(158, 158, ELEVATED_LEVEL));
    }

    #[test]
    fn drift_is_clamped_to_map() {
        let mut c = cloud(200.0, WindDirection::South);
        for _ in 0..10 {
            let _ = c.update(400, 400);
        }
        assert_eq!(c.position(), GridPos::new(200, 399, ELEVATED_LEVEL));
    }

    #[test]
    fn calm_cloud_stays_put_and_wind_can_be_reset() {
        let mut c = cloud(200.0, WindDirection::Calm);
        let _ = c.update(400, 400);
        assert_eq!(c.position(), GridPos::new(200, 200, ELEVATED_LEVEL));
        c.set_wind(WindDirection::West);
        assert_eq!(c.wind(), WindDirection::West);
        let _ = c.update(400, 400);
        assert_eq!(c.position(), GridPos::new(140, 200, ELEVATED_LEVEL));
    }

    #[test]
    fn fallout_reach_is_planar() {
        let fallout = Fallout {
            source: ContaminationId(1),
            center: GridPos::new(100, 100, ELEVATED_LEVEL),
            radius: 5.0,
            intensity: 10.0,
        };
        assert!(fallout.reaches(GridPos::ground(103, 104)));
        assert!(!fallout.reaches(GridPos::ground(104, 104)));
    }
}
