//! Core deterministic primitives.
//!
//! Fixed-point scalars, vectors and rectangles shared by geometry and
//! collision, plus the hashing used to fingerprint catalogs.

pub mod fixed;
pub mod vec2;
pub mod rect;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use rect::{FixedRect, CellSpan};
pub use hash::{StateHash, StateHasher};
