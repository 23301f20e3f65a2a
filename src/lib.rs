//! # Tileshape
//!
//! Runtime interpretation of tileset metadata for 2D platformers: collision
//! shapes, conveyor materials and tile animation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TILESHAPE                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Deterministic primitives                │
//! │  ├── fixed.rs      - Q16.16 fixed-point arithmetic           │
//! │  ├── vec2.rs       - 2D vector with fixed-point              │
//! │  ├── rect.rs       - Axis-aligned bounds, cell spans         │
//! │  └── hash.rs       - SHA-256 fingerprints                    │
//! │                                                              │
//! │  tile/             - Built once per tileset (load time)      │
//! │  ├── schema.rs     - Legacy + current property normalizing   │
//! │  ├── markup.rs     - Legacy <anim/> attribute adapter        │
//! │  ├── shape.rs      - Shape tags and mirror suffixes          │
//! │  ├── geometry.rs   - Occupancy, heights, normals             │
//! │  ├── pairing.rs    - steep/shallow compound slopes           │
//! │  ├── animation.rs  - Pre-computed animation cycles           │
//! │  └── catalog.rs    - Immutable TilesetCatalog                │
//! │                                                              │
//! │  motion/           - Per-tick queries (read-only catalog)    │
//! │  ├── grid.rs       - Level cells                             │
//! │  ├── collision.rs  - Swept AABB resolution                   │
//! │  ├── material.rs   - Conveyor velocity bias                  │
//! │  └── tick.rs       - Body update + replay                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! Everything below `tile/` and `motion/` runs on fixed-point integers and
//! ordered collections, so a catalog fingerprint and a replayed body
//! trajectory are identical on every platform.
//!
//! Per-tile data problems never fail a load: the tile degrades (to empty,
//! static or solid) and a diagnostic is recorded. Only structural problems
//! such as duplicate ids return a [`LoadError`].

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod tile;
pub mod motion;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec2::FixedVec2;
pub use core::rect::FixedRect;
pub use config::{CatalogConfig, EngineConfig, MotionConfig, WallSide};
pub use tile::{load_catalog, LoadError, SimTime, TileDefinition, TileId, TilesetCatalog, TilesetSource};
pub use motion::{Body, BodyState, CollisionResolver, MaterialEffect, ResolvedMotion, TileGrid};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
