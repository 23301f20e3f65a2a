//! Axis-aligned bounds in fixed-point world units.

use std::fmt;
use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, cell_floor, cell_last, from_int};
use super::vec2::FixedVec2;

/// Half-open axis-aligned rectangle `[min, max)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedRect {
    /// Bottom-left corner
    pub min: FixedVec2,
    /// Top-right corner
    pub max: FixedVec2,
}

/// Inclusive range of grid cells covered by a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSpan {
    pub x0: i32,
    pub x1: i32,
    pub y0: i32,
    pub y1: i32,
}

impl CellSpan {
    /// Iterate cells row by row, bottom row first.
    pub fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        (self.y0..=self.y1).flat_map(move |y| (self.x0..=self.x1).map(move |x| (x, y)))
    }
}

impl FixedRect {
    #[inline]
    pub const fn new(min: FixedVec2, max: FixedVec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from its bottom-left corner and size.
    #[inline]
    pub fn from_size(min: FixedVec2, width: Fixed, height: Fixed) -> Self {
        Self {
            min,
            max: FixedVec2::new(min.x + width, min.y + height),
        }
    }

    /// Bounds of grid cell `(cx, cy)`.
    #[inline]
    pub fn cell(cx: i32, cy: i32) -> Self {
        Self {
            min: FixedVec2::new(from_int(cx), from_int(cy)),
            max: FixedVec2::new(from_int(cx + 1), from_int(cy + 1)),
        }
    }

    #[inline]
    pub fn width(&self) -> Fixed {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> Fixed {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> FixedVec2 {
        FixedVec2::new(
            self.min.x + (self.width() >> 1),
            self.min.y + (self.height() >> 1),
        )
    }

    /// Move by `delta`.
    #[inline]
    pub fn translate(self, delta: FixedVec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Strict overlap test. Touching edges do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Strict overlap on the horizontal axis only.
    #[inline]
    pub fn overlaps_x(&self, other: &Self) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x
    }

    /// Strict overlap on the vertical axis only.
    #[inline]
    pub fn overlaps_y(&self, other: &Self) -> bool {
        self.min.y < other.max.y && other.min.y < self.max.y
    }

    /// Cells this rectangle touches. Edges lying exactly on a grid line
    /// do not pull in the neighbouring cell.
    #[inline]
    pub fn cell_span(&self) -> CellSpan {
        CellSpan {
            x0: cell_floor(self.min.x),
            x1: cell_last(self.max.x),
            y0: cell_floor(self.min.y),
            y1: cell_last(self.max.y),
        }
    }
}

impl fmt::Debug for FixedRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect[{} .. {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{to_fixed, FIXED_ONE};

    #[test]
    fn test_cell_span_on_grid_lines() {
        let r = FixedRect::from_size(FixedVec2::from_ints(1, 2), FIXED_ONE, FIXED_ONE);
        let span = r.cell_span();
        assert_eq!(span, CellSpan { x0: 1, x1: 1, y0: 2, y1: 2 });
        assert_eq!(span.cells().count(), 1);
    }

    #[test]
    fn test_cell_span_straddles() {
        let r = FixedRect::from_size(
            FixedVec2::new(to_fixed(0.5), to_fixed(0.5)),
            FIXED_ONE,
            to_fixed(0.25),
        );
        let cells: Vec<_> = r.cell_span().cells().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let a = FixedRect::cell(0, 0);
        let b = FixedRect::cell(1, 0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps_y(&b));
        let c = a.translate(FixedVec2::new(1, 0));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_center() {
        let r = FixedRect::from_size(FixedVec2::ZERO, FIXED_ONE, 2 * FIXED_ONE);
        assert_eq!(r.center(), FixedVec2::new(to_fixed(0.5), FIXED_ONE));
    }
}
