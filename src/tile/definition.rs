//! Tile Definitions
//!
//! Normalized, immutable per-tile records and the tileset grid layout they
//! live in. Everything downstream of schema normalization works on these.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::tile::material::{LogicKind, MaterialFacing, MaterialKind};
use crate::tile::shape::TileShape;

/// Tile id within one tileset (`row * columns + column`).
pub type TileId = u32;

/// How an animated tile advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationSpec {
    /// Explicitly linked frames, each held for `hold_ms` milliseconds
    Chain { next_x: i32, next_y: i32, hold_ms: u32 },
    /// `framecount` consecutive ids, each held for `framedelay` ticks
    FrameRun { framecount: u32, framedelay: u32 },
}

/// One tile after normalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: TileId,
    pub shape: TileShape,
    pub material: Option<MaterialKind>,
    /// Surface the material acts on
    #[serde(default)]
    pub material_facing: MaterialFacing,
    pub logic: Option<LogicKind>,
    /// Frame hold in milliseconds for chain animation
    pub logic_arg: u32,
    /// Column delta to the next frame (0 = no chain)
    pub next_x: i32,
    /// Row delta to the next frame (0 = no chain)
    pub next_y: i32,
    pub framecount: u32,
    pub framedelay: u32,
}

impl TileDefinition {
    /// Plain static tile of the given shape.
    pub fn new(id: TileId, shape: TileShape) -> Self {
        Self {
            id,
            shape,
            material: None,
            material_facing: MaterialFacing::North,
            logic: None,
            logic_arg: 0,
            next_x: 0,
            next_y: 0,
            framecount: 0,
            framedelay: 0,
        }
    }

    pub fn with_material(mut self, material: MaterialKind) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_material_facing(mut self, facing: MaterialFacing) -> Self {
        self.material_facing = facing;
        self
    }

    /// Chain animation step to the tile `(next_x, next_y)` away.
    pub fn with_chain(mut self, next_x: i32, next_y: i32, hold_ms: u32) -> Self {
        self.logic = Some(LogicKind::Anim);
        self.next_x = next_x;
        self.next_y = next_y;
        self.logic_arg = hold_ms;
        self
    }

    pub fn with_frame_run(mut self, framecount: u32, framedelay: u32) -> Self {
        self.logic = Some(LogicKind::Anim);
        self.framecount = framecount;
        self.framedelay = framedelay;
        self
    }

    /// Animation encoding carried by this tile, if any.
    ///
    /// An explicit chain wins over a frame run when both are present.
    pub fn animation(&self) -> Option<AnimationSpec> {
        let chained = self.next_x != 0 || self.next_y != 0;
        if self.logic == Some(LogicKind::Anim) && chained {
            return Some(AnimationSpec::Chain {
                next_x: self.next_x,
                next_y: self.next_y,
                hold_ms: self.logic_arg,
            });
        }
        if self.framecount > 0 {
            return Some(AnimationSpec::FrameRun {
                framecount: self.framecount,
                framedelay: self.framedelay,
            });
        }
        None
    }

    /// Drop all animation data, leaving the tile static.
    pub fn make_static(&mut self) {
        self.logic = None;
        self.logic_arg = 0;
        self.next_x = 0;
        self.next_y = 0;
        self.framecount = 0;
        self.framedelay = 0;
    }

    /// Feed every normalized field into a catalog hasher.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id);
        hasher.update_u8(self.shape.kind as u8);
        hasher.update_bool(self.shape.flip_h);
        hasher.update_bool(self.shape.flip_v);
        hasher.update_u8(self.material.map_or(0, |m| m as u8 + 1));
        hasher.update_u8(self.material_facing as u8);
        hasher.update_u8(self.logic.map_or(0, |l| l as u8 + 1));
        hasher.update_u32(self.logic_arg);
        hasher.update_i32(self.next_x);
        hasher.update_i32(self.next_y);
        hasher.update_u32(self.framecount);
        hasher.update_u32(self.framedelay);
    }
}

/// Grid arrangement of a tileset image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetLayout {
    pub name: String,
    pub columns: u32,
    pub tile_count: u32,
}

impl TilesetLayout {
    pub fn new(name: impl Into<String>, columns: u32, tile_count: u32) -> Self {
        Self { name: name.into(), columns, tile_count }
    }

    #[inline]
    pub fn contains(&self, id: TileId) -> bool {
        id < self.tile_count
    }

    /// `(column, row)` of a tile, rows counted from the top.
    pub fn position(&self, id: TileId) -> (i64, i64) {
        let columns = self.columns.max(1) as i64;
        let id = id as i64;
        (id % columns, id / columns)
    }

    /// Id of the tile at `(column, row)`, if that cell exists.
    pub fn id_at(&self, column: i64, row: i64) -> Option<TileId> {
        if column < 0 || row < 0 || column >= self.columns as i64 {
            return None;
        }
        let id = row * self.columns as i64 + column;
        if id < self.tile_count as i64 {
            Some(id as TileId)
        } else {
            None
        }
    }

    /// Tile `(dx, dy)` cells away from `id` (dy positive = down the image).
    ///
    /// Returns the raw target id on failure so callers can report it.
    pub fn offset(&self, id: TileId, dx: i32, dy: i32) -> Result<TileId, i64> {
        let (column, row) = self.position(id);
        let column = column + dx as i64;
        let row = row + dy as i64;
        self.id_at(column, row)
            .ok_or(row * self.columns as i64 + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::shape::ShapeKind;

    #[test]
    fn test_layout_positions() {
        let layout = TilesetLayout::new("tiles", 8, 128);
        assert_eq!(layout.position(13), (5, 1));
        assert_eq!(layout.id_at(5, 1), Some(13));
        assert_eq!(layout.id_at(8, 0), None);
        assert_eq!(layout.id_at(0, 16), None);
    }

    #[test]
    fn test_layout_offset() {
        let layout = TilesetLayout::new("tiles", 16, 256);
        assert_eq!(layout.offset(66, 1, 0), Ok(67));
        assert_eq!(layout.offset(70, -4, 0), Ok(66));
        assert_eq!(layout.offset(66, 0, -1), Ok(50));
        // Leaving the left edge is out of range, not a wrap to the previous row.
        assert!(layout.offset(64, -1, 0).is_err());
        assert_eq!(layout.offset(255, 0, 1), Err(271));
    }

    #[test]
    fn test_animation_encoding() {
        let chain = TileDefinition::new(66, TileShape::SOLID).with_chain(1, 0, 50);
        assert_eq!(
            chain.animation(),
            Some(AnimationSpec::Chain { next_x: 1, next_y: 0, hold_ms: 50 })
        );

        let run = TileDefinition::new(8, TileShape::EMPTY).with_frame_run(4, 2);
        assert_eq!(
            run.animation(),
            Some(AnimationSpec::FrameRun { framecount: 4, framedelay: 2 })
        );

        let mut still = chain.clone();
        still.make_static();
        assert_eq!(still.animation(), None);
        assert_eq!(still.shape.kind, ShapeKind::Solid);
    }

    #[test]
    fn test_anim_logic_without_step_is_static() {
        let mut tile = TileDefinition::new(3, TileShape::SOLID);
        tile.logic = Some(LogicKind::Anim);
        tile.logic_arg = 100;
        assert_eq!(tile.animation(), None);
    }

    #[test]
    fn test_hash_sensitive_to_fields() {
        let hash = |tile: &TileDefinition| {
            let mut hasher = StateHasher::for_catalog();
            tile.hash_into(&mut hasher);
            hasher.finalize()
        };

        let base = TileDefinition::new(1, TileShape::SOLID);
        let conveyor = base.clone().with_material(MaterialKind::ConveyorSlow);
        assert_eq!(hash(&base), hash(&base.clone()));
        assert_ne!(hash(&base), hash(&conveyor));
    }
}
