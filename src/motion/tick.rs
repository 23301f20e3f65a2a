//! Body Tick
//!
//! One fixed-timestep update of a body: resolve collisions with the body's
//! own velocity plus the surface bias, then take a fresh bias from whatever
//! the body now stands on.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, fixed_mul};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::motion::collision::{Body, CollisionResolver, GroundContact, ResolvedMotion};
use crate::motion::material::MaterialEffect;
use crate::tile::animation::SimTime;

/// Persistent per-body state carried between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyState {
    pub bounds: FixedRect,
    /// Own velocity (tiles per second)
    pub velocity: FixedVec2,
    /// Bias from the supporting material. Replaced every tick, never summed.
    pub surface_velocity: FixedVec2,
    pub ground: Option<GroundContact>,
}

impl BodyState {
    pub fn new(bounds: FixedRect, velocity: FixedVec2) -> Self {
        Self {
            bounds,
            velocity,
            surface_velocity: FixedVec2::ZERO,
            ground: None,
        }
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.ground.is_some()
    }

    /// Hash of everything that feeds the next tick.
    pub fn state_hash(&self) -> StateHash {
        let mut hasher = StateHasher::new(b"TILESHAPE_BODY_V1");
        for value in [
            self.bounds.min.x,
            self.bounds.min.y,
            self.bounds.max.x,
            self.bounds.max.y,
            self.velocity.x,
            self.velocity.y,
            self.surface_velocity.x,
            self.surface_velocity.y,
        ] {
            hasher.update_fixed(value);
        }
        hasher.update_opt_u32(self.ground.map(|g| g.tile));
        hasher.finalize()
    }
}

/// Advance `state` by one tick.
pub fn step_body(resolver: &CollisionResolver<'_>, state: &mut BodyState, time: SimTime) -> ResolvedMotion {
    let body = Body::new(state.bounds, state.velocity + state.surface_velocity);
    let resolved = resolver.resolve(&body, time);

    state.bounds = resolved.bounds;
    if resolved.blocked_x {
        state.velocity.x = 0;
    }
    if resolved.blocked_y {
        state.velocity.y = 0;
    }
    state.ground = resolved.ground;

    let support = resolved.ground.and_then(|g| resolver.catalog().get(g.tile));
    state.surface_velocity = MaterialEffect::for_tile(support, resolver.config()).surface_velocity;

    resolved
}

/// Run `ticks` ticks under constant downward `gravity` (tiles/s²).
///
/// Returns the final state and every tick's resolution.
pub fn simulate(
    resolver: &CollisionResolver<'_>,
    initial: BodyState,
    ticks: u64,
    gravity: Fixed,
) -> (BodyState, Vec<ResolvedMotion>) {
    let config = resolver.config();
    let fall = fixed_mul(gravity, config.tick_dt());

    let mut state = initial;
    let mut history = Vec::with_capacity(ticks as usize);

    for tick in 0..ticks {
        state.velocity.y -= fall;
        let resolved = step_body(resolver, &mut state, SimTime::at_tick(tick, config));
        history.push(resolved);
    }

    (state, history)
}
