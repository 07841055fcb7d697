//! Enumeration types for the Meltdown simulation.

use serde::{Deserialize, Serialize};

use crate::ids::{ContaminationId, ReactorId, SettlementId};

// ---------------------------------------------------------------------------
// Wind
// ---------------------------------------------------------------------------

/// Ambient wind reading: one of eight compass points or calm.
///
/// Directions use screen coordinates, so north points toward decreasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WindDirection {
    /// Toward decreasing `y`.
    #[serde(rename = "N")]
    North,
    /// Toward increasing `x`, decreasing `y`.
    #[serde(rename = "NE")]
    NorthEast,
    /// Toward increasing `x`.
    #[serde(rename = "E")]
    East,
    /// Toward increasing `x`, increasing `y`.
    #[serde(rename = "SE")]
    SouthEast,
    /// Toward increasing `y`.
    #[serde(rename = "S")]
    South,
    /// Toward decreasing `x`, increasing `y`.
    #[serde(rename = "SW")]
    SouthWest,
    /// Toward decreasing `x`.
    #[serde(rename = "W")]
    West,
    /// Toward decreasing `x`, decreasing `y`.
    #[serde(rename = "NW")]
    NorthWest,
    /// No wind; clouds do not drift.
    #[serde(rename = "C")]
    Calm,
}

/// `1 / sqrt(2)`, the component length of a normalized diagonal.
const DIAGONAL: f64 = core::f64::consts::FRAC_1_SQRT_2;

impl WindDirection {
    /// Every wind reading, in compass order with calm last.
    pub const ALL: [Self; 9] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
        Self::Calm,
    ];

    /// Short text label used in history records (`"N"`, `"NE"`, ..., `"C"`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::East => "E",
            Self::SouthEast => "SE",
            Self::South => "S",
            Self::SouthWest => "SW",
            Self::West => "W",
            Self::NorthWest => "NW",
            Self::Calm => "C",
        }
    }

    /// Unit drift vector `(dx, dy)` for this reading. Calm is `(0, 0)`.
    pub const fn unit_vector(self) -> (f64, f64) {
        match self {
            Self::North => (0.0, -1.0),
            Self::NorthEast => (DIAGONAL, -DIAGONAL),
            Self::East => (1.0, 0.0),
            Self::SouthEast => (DIAGONAL, DIAGONAL),
            Self::South => (0.0, 1.0),
            Self::SouthWest => (-DIAGONAL, DIAGONAL),
            Self::West => (-1.0, 0.0),
            Self::NorthWest => (-DIAGONAL, -DIAGONAL),
            Self::Calm => (0.0, 0.0),
        }
    }
}

impl core::fmt::Display for WindDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Reactor level
// ---------------------------------------------------------------------------

/// Technology level of a reactor. Fixes the range its maximum power is
/// drawn from and scales down its malfunction risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ReactorLevel {
    /// 50-200 MW.
    One,
    /// 200-600 MW.
    Two,
    /// 600-1200 MW.
    Three,
    /// 1200-1600 MW.
    Four,
}

impl ReactorLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    /// Numeric level, 1 through 4.
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Half-open `[min, max)` range the maximum power is drawn from.
    pub const fn power_range(self) -> (f64, f64) {
        match self {
            Self::One => (50.0, 200.0),
            Self::Two => (200.0, 600.0),
            Self::Three => (600.0, 1200.0),
            Self::Four => (1200.0, 1600.0),
        }
    }

    /// The lowest level whose minimum power covers `required` MW.
    ///
    /// Falls back to [`ReactorLevel::Four`] when no level is guaranteed to.
    pub fn minimum_for(required: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|level| level.power_range().0 >= required)
            .unwrap_or(Self::Four)
    }
}

impl TryFrom<u8> for ReactorLevel {
    type Error = InvalidReactorLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            other => Err(InvalidReactorLevel(other)),
        }
    }
}

impl From<ReactorLevel> for u8 {
    fn from(level: ReactorLevel) -> Self {
        level.number()
    }
}

/// A reactor level outside `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidReactorLevel(pub u8);

impl core::fmt::Display for InvalidReactorLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "reactor level must be 1-4, got {}", self.0)
    }
}

impl std::error::Error for InvalidReactorLevel {}

// ---------------------------------------------------------------------------
// Entity kinds
// ---------------------------------------------------------------------------

/// The three kinds of simulated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// An energy-consuming population center.
    Settlement,
    /// A power-generating reactor.
    Reactor,
    /// A drifting contamination cloud.
    Contamination,
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Settlement => f.write_str("settlement"),
            Self::Reactor => f.write_str("reactor"),
            Self::Contamination => f.write_str("contamination"),
        }
    }
}

/// A non-owning handle to any entity, tagged by kind.
///
/// This is what the occupancy index stores: a lookup key into the world's
/// per-kind collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// A settlement handle.
    Settlement(SettlementId),
    /// A reactor handle.
    Reactor(ReactorId),
    /// A contamination cloud handle.
    Contamination(ContaminationId),
}

impl EntityRef {
    /// The kind of entity this handle points at.
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Settlement(_) => EntityKind::Settlement,
            Self::Reactor(_) => EntityKind::Reactor,
            Self::Contamination(_) => EntityKind::Contamination,
        }
    }
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Settlement(id) => write!(f, "settlement#{id}"),
            Self::Reactor(id) => write!(f, "reactor#{id}"),
            Self::Contamination(id) => write!(f, "contamination#{id}"),
        }
    }
}
