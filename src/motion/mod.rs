//! Per-tick motion: level grid, collision resolution, material effects
//! and the body update that ties them together.

pub mod grid;
pub mod collision;
pub mod material;
pub mod tick;

pub use grid::TileGrid;
pub use collision::{Axis, Body, CollisionResolver, Contact, GroundContact, ResolvedMotion};
pub use material::MaterialEffect;
pub use tick::{simulate, step_body, BodyState};
