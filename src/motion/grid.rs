//! Level Tile Grid
//!
//! Level cells hold base tile ids; animation is applied on lookup by the
//! resolver. Cells are addressed y-up to match world coordinates, so row 0
//! is the bottom of the level.

use serde::{Serialize, Deserialize};

use crate::tile::definition::TileId;

/// Fixed-size level grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<TileId>>,
}

impl TileGrid {
    /// Empty grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Build from rows as they appear in a level file (top row first).
    /// Short rows are padded with empty cells.
    pub fn from_rows_top_down(rows: &[Vec<Option<TileId>>]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut grid = Self::new(width, height);

        for (row_index, row) in rows.iter().enumerate() {
            let cy = (height as usize - 1 - row_index) as i32;
            for (cx, tile) in row.iter().enumerate() {
                grid.set(cx as i32, cy, *tile);
            }
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx as u32 >= self.width || cy as u32 >= self.height {
            return None;
        }
        Some(cy as usize * self.width as usize + cx as usize)
    }

    /// Base tile at a cell. Cells outside the grid are empty.
    #[inline]
    pub fn get(&self, cx: i32, cy: i32) -> Option<TileId> {
        self.index(cx, cy).and_then(|i| self.cells[i])
    }

    /// Place (or clear) a tile. Returns false if the cell is outside the grid.
    pub fn set(&mut self, cx: i32, cy: i32, tile: Option<TileId>) -> bool {
        match self.index(cx, cy) {
            Some(i) => {
                self.cells[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Fill an inclusive horizontal run of cells.
    pub fn fill_row(&mut self, cy: i32, x0: i32, x1: i32, tile: TileId) {
        for cx in x0..=x1 {
            self.set(cx, cy, Some(tile));
        }
    }
}
