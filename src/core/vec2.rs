//! Fixed-Point 2D Vector
//!
//! Positions, velocities and contact normals. World axes are y-up; one
//! tile is `FIXED_ONE` along either axis.

use std::fmt;
use std::ops::Add;
use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_ONE, fixed_div, fixed_mul, fixed_sqrt, from_int, to_float};

/// 2D vector with Q16.16 components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedVec2 {
    pub const ZERO: Self = Self::new(0, 0);

    /// Contact normals of axis-aligned faces
    pub const UP: Self = Self::new(0, FIXED_ONE);
    pub const DOWN: Self = Self::new(0, -FIXED_ONE);
    pub const LEFT: Self = Self::new(-FIXED_ONE, 0);
    pub const RIGHT: Self = Self::new(FIXED_ONE, 0);

    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Vector to the corner of cell `(x, y)`.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self::new(from_int(x), from_int(y))
    }

    /// Both components multiplied by `factor` (e.g. velocity × tick length).
    #[inline]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(fixed_mul(self.x, factor), fixed_mul(self.y, factor))
    }

    /// Unit vector in the same direction; `ZERO` stays `ZERO`.
    pub fn normalize(self) -> Self {
        let squared = fixed_mul(self.x, self.x).wrapping_add(fixed_mul(self.y, self.y));
        match fixed_sqrt(squared) {
            0 => Self::ZERO,
            length => Self::new(fixed_div(self.x, length), fixed_div(self.y, length)),
        }
    }

    /// Components in tiles, for logs.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (to_float(self.x), to_float(self.y))
    }
}

impl Add for FixedVec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.to_floats();
        write!(f, "Vec2({x:.3}, {y:.3})")
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.to_floats();
        write!(f, "({x:.3}, {y:.3})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    #[test]
    fn test_cell_corners() {
        assert_eq!(FixedVec2::from_ints(2, -1), FixedVec2::new(2 * FIXED_ONE, -FIXED_ONE));
        assert_eq!(FixedVec2::from_ints(0, 1), FixedVec2::UP);
    }

    #[test]
    fn test_velocity_plus_bias() {
        let own = FixedVec2::new(to_fixed(1.5), to_fixed(-3.0));
        let bias = FixedVec2::new(to_fixed(2.0), 0);
        assert_eq!(own + bias, FixedVec2::new(to_fixed(3.5), to_fixed(-3.0)));
    }

    #[test]
    fn test_scale_by_tick() {
        let velocity = FixedVec2::from_ints(60, -30);
        let step = velocity.scale(FIXED_ONE / 2);
        assert_eq!(step, FixedVec2::from_ints(30, -15));
    }

    #[test]
    fn test_normalize() {
        let n = FixedVec2::new(to_fixed(3.0), to_fixed(4.0)).normalize();
        assert!((n.x - to_fixed(0.6)).abs() < 200);
        assert!((n.y - to_fixed(0.8)).abs() < 200);
        assert_eq!(FixedVec2::ZERO.normalize(), FixedVec2::ZERO);
    }

    #[test]
    fn test_slope_normal_is_diagonal() {
        let n = FixedVec2::new(-FIXED_ONE, FIXED_ONE).normalize();
        assert!(n.x < 0 && n.y > 0);
        assert!((n.x + n.y).abs() < 4, "45 degree normal has equal magnitudes");
    }
}
