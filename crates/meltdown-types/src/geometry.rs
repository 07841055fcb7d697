//! Grid coordinates.

use serde::{Deserialize, Serialize};

/// Height level used by settlements and reactors.
pub const GROUND_LEVEL: u32 = 0;

/// Height level used by contamination clouds.
pub const ELEVATED_LEVEL: u32 = 1;

/// Number of height levels in every world.
pub const HEIGHT_LEVELS: u32 = 2;

/// A cell in the 3D world grid: planar `(x, y)` plus a height level `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// Column, `0..width`.
    pub x: u32,
    /// Row, `0..height`.
    pub y: u32,
    /// Height level, `0..HEIGHT_LEVELS`.
    pub z: u32,
}

impl GridPos {
    /// Create a position from its three components.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Create a ground-level position.
    pub const fn ground(x: u32, y: u32) -> Self {
        Self::new(x, y, GROUND_LEVEL)
    }

    /// The same planar cell at another height level.
    pub const fn with_level(self, z: u32) -> Self {
        Self { z, ..self }
    }

    /// Euclidean distance in the `(x, y)` plane. Height is ignored.
    pub fn planar_distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// Translate in the plane by `(dx, dy)` cells, clamping each axis into
    /// `[0, width)` and `[0, height)`. Height is unchanged.
    pub fn translated_clamped(self, dx: i64, dy: i64, width: u32, height: u32) -> Self {
        Self {
            x: clamp_axis(self.x, dx, width),
            y: clamp_axis(self.y, dy, height),
            z: self.z,
        }
    }
}

/// Move `value` by `delta` and clamp the result into `[0, extent)`.
fn clamp_axis(value: u32, delta: i64, extent: u32) -> u32 {
    let max = i64::from(extent.saturating_sub(1));
    let moved = i64::from(value).saturating_add(delta).clamp(0, max);
    u32::try_from(moved).unwrap_or(0)
}

impl core::fmt::Display for GridPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_distance_ignores_height() {
        let a = GridPos::new(0, 0, 0);
        let b = GridPos::new(3, 4, 1);
        assert!((a.planar_distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn translation_clamps_to_bounds() {
        let p = GridPos::new(10, 390, ELEVATED_LEVEL);
        let moved = p.translated_clamped(-60, 60, 400, 400);
        assert_eq!(moved, GridPos::new(0, 399, ELEVATED_LEVEL));
    }

    #[test]
    fn translation_inside_bounds() {
        let p = GridPos::ground(100, 100);
        assert_eq!(p.translated_clamped(42, -42, 400, 400), GridPos::ground(142, 58));
    }
}
