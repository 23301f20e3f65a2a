//! Shape Geometry
//!
//! Converts a [`TileShape`] into collision geometry in tile-local
//! coordinates: `x, y ∈ [0, 1]` from the cell's bottom-left, y up.
//!
//! ```text
//!   slope        steep1 + steep2       shallow1 + shallow2
//!  ┌────┐          ┌────┐
//!  │   /│          │  / │ steep2       ┌────┬────┐
//!  │  / │          │ /  │              │    │  _/│
//!  │ /  │          ├────┤              │  _/│_/  │
//!  │/███│          │/███│ steep1       │_/██│████│
//!  └────┘          └────┘              └────┴────┘
//! ```
//!
//! Every floor ramp is the line `h(x) = h0 + (h1 - h0)·x` clamped to the
//! cell. Mirroring is applied uniformly to the unmirrored geometry: `-h`
//! reflects `x → 1 - x`, `-v` reflects `y → 1 - y`.

use serde::{Serialize, Deserialize};

use crate::config::{CatalogConfig, WallSide};
use crate::core::fixed::{Fixed, FIXED_HALF, FIXED_ONE, fixed_clamp, fixed_mul};
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::tile::shape::{ShapeKind, TileShape};

/// Direction a one-way face points (the side it is solid against).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub const fn mirror_h(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
            other => other,
        }
    }

    pub const fn mirror_v(self) -> Self {
        match self {
            Facing::Up => Facing::Down,
            Facing::Down => Facing::Up,
            other => other,
        }
    }

    /// Outward unit normal of the face.
    pub const fn normal(self) -> FixedVec2 {
        match self {
            Facing::Up => FixedVec2::UP,
            Facing::Down => FixedVec2::DOWN,
            Facing::Left => FixedVec2::LEFT,
            Facing::Right => FixedVec2::RIGHT,
        }
    }
}

impl From<WallSide> for Facing {
    fn from(side: WallSide) -> Self {
        match side {
            WallSide::Left => Facing::Left,
            WallSide::Right => Facing::Right,
        }
    }
}

/// Linear sloped surface.
///
/// `h0` and `h1` are the unclamped line heights at the left and right cell
/// edges. A floor ramp is solid below `h(x)`; a ceiling ramp is solid above
/// `1 - h(x)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ramp {
    pub h0: Fixed,
    pub h1: Fixed,
    pub ceiling: bool,
}

impl Ramp {
    pub const fn floor(h0: Fixed, h1: Fixed) -> Self {
        Self { h0, h1, ceiling: false }
    }

    /// Rise across one tile width.
    #[inline]
    pub fn rise(&self) -> Fixed {
        self.h1 - self.h0
    }

    /// Unclamped line height at local `x`.
    #[inline]
    pub fn line_at(&self, x: Fixed) -> Fixed {
        self.h0 + fixed_mul(self.rise(), x)
    }

    /// Surface height at local `x`, clamped to one cell.
    #[inline]
    pub fn height_at(&self, x: Fixed) -> Fixed {
        self.height_within(x, FIXED_ONE)
    }

    /// Surface height at `x`, clamped to `[0, limit]`.
    ///
    /// Compound slopes evaluate the same line over two cells with
    /// `limit = 2`.
    #[inline]
    pub fn height_within(&self, x: Fixed, limit: Fixed) -> Fixed {
        fixed_clamp(self.line_at(x), 0, limit)
    }

    pub fn occupies(&self, local: FixedVec2) -> bool {
        if self.ceiling {
            local.y >= FIXED_ONE - self.height_at(local.x)
        } else {
            local.y < self.height_at(local.x)
        }
    }

    /// Outward unit normal of the sloped face.
    pub fn normal(&self) -> FixedVec2 {
        let ny = if self.ceiling { -FIXED_ONE } else { FIXED_ONE };
        FixedVec2::new(-self.rise(), ny).normalize()
    }

    pub fn mirror_h(self) -> Self {
        Self { h0: self.h1, h1: self.h0, ceiling: self.ceiling }
    }

    pub fn mirror_v(self) -> Self {
        Self { ceiling: !self.ceiling, ..self }
    }
}

/// Collision geometry of one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileGeometry {
    /// Never collides
    Empty,
    /// Axis-aligned solid box in local coordinates (solid, half, halfvert)
    Block(FixedRect),
    /// Sloped surface
    Ramp(Ramp),
    /// Face on the cell edge in the facing direction, solid only against
    /// motion coming from that side
    OneWay(Facing),
}

impl TileGeometry {
    /// Full solid cell.
    pub fn solid() -> Self {
        TileGeometry::Block(FixedRect::cell(0, 0))
    }

    /// Resolve a parsed shape.
    pub fn from_shape(shape: TileShape, config: &CatalogConfig) -> Self {
        let mut geometry = Self::base(shape.kind, config);
        if shape.flip_h {
            geometry = geometry.mirror_h();
        }
        if shape.flip_v {
            geometry = geometry.mirror_v();
        }
        geometry
    }

    /// Unmirrored geometry of a shape class.
    fn base(kind: ShapeKind, config: &CatalogConfig) -> Self {
        let one = FIXED_ONE;
        let half = FIXED_HALF;
        let block = |w: Fixed, h: Fixed| {
            TileGeometry::Block(FixedRect::from_size(FixedVec2::ZERO, w, h))
        };

        match kind {
            ShapeKind::Empty => TileGeometry::Empty,
            ShapeKind::Solid => block(one, one),
            ShapeKind::Half => block(one, half),
            ShapeKind::HalfVert => block(half, one),
            ShapeKind::Slope => TileGeometry::Ramp(Ramp::floor(0, one)),
            ShapeKind::Steep1 => TileGeometry::Ramp(Ramp::floor(0, 2 * one)),
            ShapeKind::Steep2 => TileGeometry::Ramp(Ramp::floor(-one, one)),
            ShapeKind::Shallow1 => TileGeometry::Ramp(Ramp::floor(0, half)),
            ShapeKind::Shallow2 => TileGeometry::Ramp(Ramp::floor(half, one)),
            ShapeKind::Oneway => TileGeometry::OneWay(Facing::Up),
            ShapeKind::OnewayVert => TileGeometry::OneWay(Facing::Right),
            ShapeKind::OnewayWall => TileGeometry::OneWay(config.oneway_wall_side.into()),
        }
    }

    /// Reflect `x → 1 - x`.
    pub fn mirror_h(self) -> Self {
        match self {
            TileGeometry::Block(r) => TileGeometry::Block(FixedRect::new(
                FixedVec2::new(FIXED_ONE - r.max.x, r.min.y),
                FixedVec2::new(FIXED_ONE - r.min.x, r.max.y),
            )),
            TileGeometry::Ramp(ramp) => TileGeometry::Ramp(ramp.mirror_h()),
            TileGeometry::OneWay(facing) => TileGeometry::OneWay(facing.mirror_h()),
            TileGeometry::Empty => TileGeometry::Empty,
        }
    }

    /// Reflect `y → 1 - y`.
    pub fn mirror_v(self) -> Self {
        match self {
            TileGeometry::Block(r) => TileGeometry::Block(FixedRect::new(
                FixedVec2::new(r.min.x, FIXED_ONE - r.max.y),
                FixedVec2::new(r.max.x, FIXED_ONE - r.min.y),
            )),
            TileGeometry::Ramp(ramp) => TileGeometry::Ramp(ramp.mirror_v()),
            TileGeometry::OneWay(facing) => TileGeometry::OneWay(facing.mirror_v()),
            TileGeometry::Empty => TileGeometry::Empty,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, TileGeometry::Empty)
    }

    /// Whether `local` lies inside the solid volume.
    ///
    /// One-way faces have no volume and never report occupancy.
    pub fn occupies(&self, local: FixedVec2) -> bool {
        match self {
            TileGeometry::Block(r) => {
                local.x >= r.min.x && local.x < r.max.x && local.y >= r.min.y && local.y < r.max.y
            }
            TileGeometry::Ramp(ramp) => {
                (0..FIXED_ONE).contains(&local.x)
                    && (0..FIXED_ONE).contains(&local.y)
                    && ramp.occupies(local)
            }
            TileGeometry::Empty | TileGeometry::OneWay(_) => false,
        }
    }

    /// Top of the solid material in column `x`, if any.
    pub fn floor_height(&self, x: Fixed) -> Option<Fixed> {
        match self {
            TileGeometry::Block(r) => (x >= r.min.x && x <= r.max.x).then_some(r.max.y),
            TileGeometry::Ramp(ramp) if ramp.ceiling => {
                (ramp.height_at(x) > 0).then_some(FIXED_ONE)
            }
            TileGeometry::Ramp(ramp) => Some(ramp.height_at(x)),
            TileGeometry::OneWay(Facing::Up) => Some(FIXED_ONE),
            TileGeometry::OneWay(_) | TileGeometry::Empty => None,
        }
    }

    /// Bottom of the solid material in column `x`, if any.
    pub fn ceiling_height(&self, x: Fixed) -> Option<Fixed> {
        match self {
            TileGeometry::Block(r) => (x >= r.min.x && x <= r.max.x).then_some(r.min.y),
            TileGeometry::Ramp(ramp) if ramp.ceiling => Some(FIXED_ONE - ramp.height_at(x)),
            TileGeometry::Ramp(ramp) => (ramp.height_at(x) > 0).then_some(0),
            TileGeometry::OneWay(Facing::Down) => Some(0),
            TileGeometry::OneWay(_) | TileGeometry::Empty => None,
        }
    }

    /// Contact normal of the tile's characteristic surface.
    ///
    /// Boxes have no single normal; the resolver derives one from the
    /// blocked axis.
    pub fn normal(&self) -> Option<FixedVec2> {
        match self {
            TileGeometry::Ramp(ramp) => Some(ramp.normal()),
            TileGeometry::OneWay(facing) => Some(facing.normal()),
            TileGeometry::Block(_) | TileGeometry::Empty => None,
        }
    }

    pub fn as_ramp(&self) -> Option<&Ramp> {
        match self {
            TileGeometry::Ramp(ramp) => Some(ramp),
            _ => None,
        }
    }
}
