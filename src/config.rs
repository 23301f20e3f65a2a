//! Engine Configuration
//!
//! Build-time (catalog) and per-tick (motion) tunables. Every field has a
//! default; a JSON document only needs to name the fields it overrides.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{
    Fixed, FIXED_ONE, QUARTER_TILE, DEFAULT_TICK_RATE, fixed_div, from_int,
};

/// Horizontal side of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    Left,
    Right,
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Catalog build settings
    pub catalog: CatalogConfig,
    /// Collision and material settings
    pub motion: MotionConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Configuration for catalog construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Longest animation chain walked before it is declared non-terminating
    pub max_chain_steps: u32,
    /// Id distance between consecutive frames of a frame-run animation
    pub frame_stride: u32,
    /// Solid face of an unmirrored `oneway_wall` (the `-h` variant uses the
    /// opposite side)
    pub oneway_wall_side: WallSide,
    /// Largest height mismatch accepted at a slope pair seam (raw Q16.16 units)
    pub seam_tolerance: Fixed,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_chain_steps: 64,
            frame_stride: 1,
            oneway_wall_side: WallSide::Left,
            seam_tolerance: 0,
        }
    }
}

/// Configuration for per-tick collision resolution and material effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Simulation rate (Hz)
    pub tick_rate: u32,
    /// Conveyor surface speed in tiles per second
    pub conveyor_speed: Fixed,
    /// How far past a one-way face a body may start and still be caught
    pub oneway_grace: Fixed,
    /// Tallest ledge a body walks up instead of being blocked
    pub step_height: Fixed,
    /// Gap under a non-rising body still counted as standing on ground
    pub ground_reach: Fixed,
}

impl MotionConfig {
    /// Length of one tick in seconds.
    #[inline]
    pub fn tick_dt(&self) -> Fixed {
        fixed_div(FIXED_ONE, from_int(self.tick_rate.max(1) as i32))
    }

    /// Milliseconds elapsed after `tick` ticks.
    #[inline]
    pub fn millis_at(&self, tick: u64) -> u64 {
        tick * 1000 / self.tick_rate.max(1) as u64
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            conveyor_speed: 2 * FIXED_ONE, // 2 tiles per second
            oneway_grace: FIXED_ONE >> 4,  // 1/16 tile
            step_height: QUARTER_TILE,
            ground_reach: FIXED_ONE >> 6,  // 1/64 tile
        }
    }
}
