//! Tile interpretation: schema normalization, shape geometry, slope
//! pairing, animation cycles and the catalog that holds them.

pub mod shape;
pub mod material;
pub mod definition;
pub mod markup;
pub mod schema;
pub mod geometry;
pub mod pairing;
pub mod animation;
pub mod diagnostics;
pub mod catalog;
pub mod error;

pub use shape::{ShapeKind, TileShape};
pub use material::{LogicKind, MaterialFacing, MaterialKind};
pub use definition::{AnimationSpec, TileDefinition, TileId, TilesetLayout};
pub use schema::{RawProperty, RawTile, TilesetSource};
pub use geometry::{Facing, Ramp, TileGeometry};
pub use pairing::{CompoundSlope, PairAxis};
pub use animation::{AnimationCycle, CycleClock, SimTime};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Fallback};
pub use catalog::{load_catalog, TilesetCatalog};
pub use error::{AnimationCycleError, LoadError, PropertyError, SlopePairingError, UnknownShapeError};
