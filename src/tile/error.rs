//! Tile Error Types
//!
//! Per-tile errors are recovered at load time (the tile degrades and a
//! diagnostic is recorded). Only `LoadError` aborts a catalog build.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::tile::definition::TileId;

/// Shape tag that does not name a known shape.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("unknown tile shape `{value}`")]
pub struct UnknownShapeError {
    /// The raw tag as found in the tileset
    pub value: String,
}

/// Animation that cannot be resolved to a finite cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AnimationCycleError {
    #[error("chain step from tile {from} leaves the tileset (next id {to})")]
    OutOfRange { from: TileId, to: i64 },

    #[error("chain reaches tile {at}, which is not animated")]
    OpenChain { at: TileId },

    #[error("chain does not return to its start within {steps} steps")]
    NonTerminating { steps: u32 },

    #[error("animation cycle has zero total duration")]
    ZeroDuration,
}

/// Two halves of a multi-tile slope that do not meet.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("slope halves {near} and {far} do not meet (seam mismatch {mismatch} units)")]
pub struct SlopePairingError {
    /// Half adjacent to the solid base of the ramp
    pub near: TileId,
    /// Half forming the ramp's far end
    pub far: TileId,
    /// Largest height difference at the seam (raw Q16.16 units)
    pub mismatch: i32,
}

/// Malformed or unsupported tile property.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PropertyError {
    #[error("unknown tile property: {name} = {value}")]
    UnknownProperty { name: String, value: String },

    #[error("property `{name}` expects an integer, got `{value}`")]
    InvalidInteger { name: String, value: String },

    #[error("unknown material `{0}`")]
    UnknownMaterial(String),

    #[error("unknown material facing `{0}`")]
    UnknownFacing(String),

    #[error("unknown tile logic `{0}`")]
    UnknownLogic(String),

    #[error("malformed animation markup: {0}")]
    MalformedAnimMarkup(String),

    #[error("animation chain into tileset `{0}` is not supported")]
    CrossTilesetChain(String),
}

/// Structural failure that aborts a catalog load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("tileset has zero columns")]
    ZeroColumns,

    #[error("duplicate tile id {0}")]
    DuplicateTileId(TileId),

    #[error("tile id {id} outside tileset of {tile_count} tiles")]
    TileIdOutOfRange { id: TileId, tile_count: u32 },

    #[error("invalid tileset document: {0}")]
    Json(#[from] serde_json::Error),
}
