//! Tile Shapes
//!
//! The closed set of collision shape classes plus the axis-mirroring
//! suffixes (`-h`, `-v`, `-hv`). Both tileset schema generations are parsed
//! through [`TileShape::parse`], so the rest of the engine never looks at
//! raw shape strings.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::tile::error::UnknownShapeError;

/// Collision geometry class of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum ShapeKind {
    /// No collision
    #[default]
    Empty = 0,
    /// Full block
    Solid = 1,
    /// Flat half-height block
    Half = 2,
    /// Full-height half-width block
    HalfVert = 3,
    /// One-tile diagonal
    Slope = 4,
    /// Lower half of a one-wide, two-tall ramp
    Steep1 = 5,
    /// Upper half of a one-wide, two-tall ramp
    Steep2 = 6,
    /// Left half of a two-wide, one-tall ramp
    Shallow1 = 7,
    /// Right half of a two-wide, one-tall ramp
    Shallow2 = 8,
    /// Platform solid only from above
    Oneway = 9,
    /// Wall solid only against motion from one horizontal side
    OnewayVert = 10,
    /// One-way barrier whose solid side is configured separately
    OnewayWall = 11,
}

impl ShapeKind {
    /// All shape kinds in tag order.
    pub const ALL: [ShapeKind; 12] = [
        ShapeKind::Empty,
        ShapeKind::Solid,
        ShapeKind::Half,
        ShapeKind::HalfVert,
        ShapeKind::Slope,
        ShapeKind::Steep1,
        ShapeKind::Steep2,
        ShapeKind::Shallow1,
        ShapeKind::Shallow2,
        ShapeKind::Oneway,
        ShapeKind::OnewayVert,
        ShapeKind::OnewayWall,
    ];

    /// Lower-case tag used by the current tileset schema.
    pub const fn label(self) -> &'static str {
        match self {
            ShapeKind::Empty => "empty",
            ShapeKind::Solid => "solid",
            ShapeKind::Half => "half",
            ShapeKind::HalfVert => "halfvert",
            ShapeKind::Slope => "slope",
            ShapeKind::Steep1 => "steep1",
            ShapeKind::Steep2 => "steep2",
            ShapeKind::Shallow1 => "shallow1",
            ShapeKind::Shallow2 => "shallow2",
            ShapeKind::Oneway => "oneway",
            ShapeKind::OnewayVert => "onewayvert",
            ShapeKind::OnewayWall => "oneway_wall",
        }
    }

    /// Look up a kind by its lower-case tag.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.label() == label)
    }
}

/// A shape kind plus its mirroring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileShape {
    pub kind: ShapeKind,
    /// Mirrored left-to-right (`-h`)
    pub flip_h: bool,
    /// Mirrored top-to-bottom (`-v`)
    pub flip_v: bool,
}

impl TileShape {
    /// Tile with no collision.
    pub const EMPTY: Self = Self::new(ShapeKind::Empty);

    /// Full block.
    pub const SOLID: Self = Self::new(ShapeKind::Solid);

    /// Unmirrored shape of the given kind.
    pub const fn new(kind: ShapeKind) -> Self {
        Self { kind, flip_h: false, flip_v: false }
    }

    /// Shape with explicit mirroring.
    pub const fn mirrored(kind: ShapeKind, flip_h: bool, flip_v: bool) -> Self {
        Self { kind, flip_h, flip_v }
    }

    /// Parse a shape tag from either schema generation.
    ///
    /// Case-insensitive: `SLOPE-HV`, `slope-hv` and `Slope-vh` all parse to
    /// the same shape.
    pub fn parse(tag: &str) -> Result<Self, UnknownShapeError> {
        let unknown = || UnknownShapeError { value: tag.to_string() };

        let lowered = tag.trim().to_ascii_lowercase();
        let (base, flips) = match lowered.split_once('-') {
            Some((base, flips)) => (base, Some(flips)),
            None => (lowered.as_str(), None),
        };

        let kind = ShapeKind::from_label(base).ok_or_else(unknown)?;

        let mut shape = TileShape::new(kind);
        if let Some(flips) = flips {
            if flips.is_empty() {
                return Err(unknown());
            }
            for c in flips.chars() {
                match c {
                    'h' => shape.flip_h = true,
                    'v' => shape.flip_v = true,
                    _ => return Err(unknown()),
                }
            }
        }

        Ok(shape)
    }

    /// True when the tile takes part in collision at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kind == ShapeKind::Empty
    }
}

impl FromStr for TileShape {
    type Err = UnknownShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileShape::parse(s)
    }
}

impl fmt::Display for TileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.label())?;
        if self.flip_h || self.flip_v {
            f.write_str("-")?;
            if self.flip_h {
                f.write_str("h")?;
            }
            if self.flip_v {
                f.write_str("v")?;
            }
        }
        Ok(())
    }
}
