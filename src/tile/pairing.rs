//! Slope Pairing
//!
//! `steep1`/`steep2` and `shallow1`/`shallow2` are halves of one ramp. The
//! halves are found next to each other in the tileset image:
//!
//! ```text
//!   steep (vertical pair)        shallow (horizontal pair)
//!   ┌────────┐
//!   │ steep2 │ row - 1           ┌──────────┬──────────┐
//!   ├────────┤                   │ shallow1 │ shallow2 │
//!   │ steep1 │ row               └──────────┴──────────┘
//!   └────────┘                      col        col + 1
//! ```
//!
//! `-v` flips the vertical search direction and `-h` the horizontal one.
//! Each pair is verified once at build time and stored as a
//! [`CompoundSlope`] so the resolver never re-derives adjacency per tick.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, FIXED_ONE};
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::tile::definition::{TileId, TilesetLayout};
use crate::tile::error::SlopePairingError;
use crate::tile::geometry::{Ramp, TileGeometry};
use crate::tile::shape::{ShapeKind, TileShape};

/// Axis along which two halves join.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairAxis {
    /// steep halves, stacked
    Vertical,
    /// shallow halves, side by side
    Horizontal,
}

/// A verified two-tile ramp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundSlope {
    /// The `*1` half
    pub near: TileId,
    /// The `*2` half
    pub far: TileId,
    pub axis: PairAxis,
    /// World cell offset of the far half from the near half (y up)
    pub far_offset: (i32, i32),
    /// Near half's ramp; its line continues across the far cell
    pub ramp: Ramp,
}

impl CompoundSlope {
    /// Clamp limit of the combined height function.
    #[inline]
    pub fn height_limit(&self) -> Fixed {
        match self.axis {
            PairAxis::Vertical => 2 * FIXED_ONE,
            PairAxis::Horizontal => FIXED_ONE,
        }
    }

    /// Combined height at `x`, in near-cell local units.
    #[inline]
    pub fn height_at(&self, x: Fixed) -> Fixed {
        self.ramp.height_within(x, self.height_limit())
    }

    /// Both cells, in near-cell local units.
    pub fn region(&self) -> FixedRect {
        let (dx, dy) = self.far_offset;
        FixedRect::new(
            FixedVec2::from_ints(dx.min(0), dy.min(0)),
            FixedVec2::from_ints(dx.max(0) + 1, dy.max(0) + 1),
        )
    }
}

/// Result of pairing a whole tileset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairingOutcome {
    pub compounds: Vec<CompoundSlope>,
    pub errors: Vec<SlopePairingError>,
}

impl PairingOutcome {
    /// Tiles that must degrade to solid.
    pub fn broken_tiles(&self) -> BTreeSet<TileId> {
        self.errors.iter().flat_map(|e| [e.near, e.far]).collect()
    }
}

/// Where a slope half expects its partner, as a tileset grid step.
fn partner_step(shape: TileShape) -> Option<(PairAxis, i64, i64)> {
    let vertical = if shape.flip_v { 1 } else { -1 };
    let horizontal = if shape.flip_h { -1 } else { 1 };
    match shape.kind {
        ShapeKind::Steep1 => Some((PairAxis::Vertical, 0, vertical)),
        ShapeKind::Steep2 => Some((PairAxis::Vertical, 0, -vertical)),
        ShapeKind::Shallow1 => Some((PairAxis::Horizontal, horizontal, 0)),
        ShapeKind::Shallow2 => Some((PairAxis::Horizontal, -horizontal, 0)),
        _ => None,
    }
}

fn same_family(a: ShapeKind, b: ShapeKind) -> bool {
    let steep = |k| matches!(k, ShapeKind::Steep1 | ShapeKind::Steep2);
    let shallow = |k| matches!(k, ShapeKind::Shallow1 | ShapeKind::Shallow2);
    (steep(a) && steep(b)) || (shallow(a) && shallow(b))
}

fn is_near_half(kind: ShapeKind) -> bool {
    matches!(kind, ShapeKind::Steep1 | ShapeKind::Shallow1)
}

/// Largest height difference at the seam, or `None` when orientations
/// differ.
fn seam_mismatch(axis: PairAxis, near: &Ramp, far: &Ramp, far_offset: (i32, i32)) -> Option<Fixed> {
    if near.ceiling != far.ceiling {
        return None;
    }
    let mismatch = match axis {
        PairAxis::Vertical => {
            let a = (near.h0 - FIXED_ONE - far.h0).abs();
            let b = (near.h1 - FIXED_ONE - far.h1).abs();
            a.max(b)
        }
        PairAxis::Horizontal => {
            let (left, right) = if far_offset.0 > 0 { (near, far) } else { (far, near) };
            (left.h1 - right.h0).abs()
        }
    };
    Some(mismatch)
}

/// Find and verify every slope pair of a tileset.
///
/// `shapes` and `geometry` are dense tables indexed by tile id.
pub fn pair_slopes(
    layout: &TilesetLayout,
    shapes: &[TileShape],
    geometry: &[TileGeometry],
    tolerance: Fixed,
) -> PairingOutcome {
    let mut seen: BTreeSet<(TileId, TileId)> = BTreeSet::new();
    let mut outcome = PairingOutcome::default();

    for (index, shape) in shapes.iter().enumerate() {
        let id = index as TileId;
        let Some((axis, dcol, drow)) = partner_step(*shape) else {
            continue;
        };
        let (col, row) = layout.position(id);
        let Some(other) = layout.id_at(col + dcol, row + drow) else {
            continue;
        };
        let other_shape = shapes[other as usize];
        if !same_family(shape.kind, other_shape.kind) {
            continue;
        }

        // Tileset rows run top-down, world rows bottom-up.
        let step = (dcol as i32, -(drow as i32));
        let (near, far, far_offset) = if is_near_half(shape.kind) || !is_near_half(other_shape.kind) {
            (id, other, step)
        } else {
            (other, id, (-step.0, -step.1))
        };
        if !seen.insert((near, far)) {
            continue;
        }

        let (Some(near_ramp), Some(far_ramp)) =
            (geometry[near as usize].as_ramp(), geometry[far as usize].as_ramp())
        else {
            continue;
        };

        match seam_mismatch(axis, near_ramp, far_ramp, far_offset) {
            Some(mismatch) if mismatch <= tolerance && shape.kind != other_shape.kind => {
                outcome.compounds.push(CompoundSlope {
                    near,
                    far,
                    axis,
                    far_offset,
                    ramp: *near_ramp,
                });
            }
            mismatch => outcome.errors.push(SlopePairingError {
                near,
                far,
                mismatch: mismatch.unwrap_or(FIXED_ONE).max(1),
            }),
        }
    }

    outcome
}
