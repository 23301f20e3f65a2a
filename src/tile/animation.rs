//! Animation Sequencer
//!
//! Every animated tile's cycle is walked once when the catalog is built.
//! Queries then map elapsed time onto the stored cycle without touching
//! the chain again.
//!
//! Two encodings exist:
//! - **Chain**: each tile names the next one by a grid delta and holds for
//!   its own `logic_arg` milliseconds, until the walk returns to the start.
//! - **Frame run**: `framecount` ids at a fixed stride from the base id,
//!   each held `framedelay` ticks.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::config::{CatalogConfig, MotionConfig};
use crate::tile::definition::{AnimationSpec, TileDefinition, TileId, TilesetLayout};
use crate::tile::error::AnimationCycleError;

/// Simulation time, in both clocks animations may run on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    pub tick: u64,
    pub millis: u64,
}

impl SimTime {
    pub const ZERO: Self = Self { tick: 0, millis: 0 };

    pub const fn new(tick: u64, millis: u64) -> Self {
        Self { tick, millis }
    }

    /// Time at the start of `tick` under the configured tick rate.
    pub fn at_tick(tick: u64, config: &MotionConfig) -> Self {
        Self { tick, millis: config.millis_at(tick) }
    }
}

/// Clock a cycle advances on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleClock {
    Millis,
    Ticks,
}

/// Pre-computed animation cycle of one tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationCycle {
    frames: Vec<TileId>,
    durations: Vec<u32>,
    /// Offset of each frame from the cycle start
    starts: Vec<u64>,
    total: u64,
    clock: CycleClock,
    /// Shared frame duration when all frames hold equally long
    uniform: Option<u32>,
}

impl AnimationCycle {
    fn new(frames: Vec<TileId>, durations: Vec<u32>, clock: CycleClock) -> Result<Self, AnimationCycleError> {
        let mut starts = Vec::with_capacity(durations.len());
        let mut total: u64 = 0;
        for duration in &durations {
            starts.push(total);
            total += *duration as u64;
        }
        if total == 0 {
            return Err(AnimationCycleError::ZeroDuration);
        }

        let uniform = durations
            .first()
            .copied()
            .filter(|first| durations.iter().all(|d| d == first));

        Ok(Self { frames, durations, starts, total, clock, uniform })
    }

    /// Tile ids in display order, starting with the animated tile itself.
    pub fn frames(&self) -> &[TileId] {
        &self.frames
    }

    pub fn durations(&self) -> &[u32] {
        &self.durations
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Cycle length in the cycle's own clock units.
    pub fn total_duration(&self) -> u64 {
        self.total
    }

    pub fn clock(&self) -> CycleClock {
        self.clock
    }

    /// Frame index showing at `time`.
    pub fn frame_index_at(&self, time: SimTime) -> usize {
        let elapsed = match self.clock {
            CycleClock::Millis => time.millis,
            CycleClock::Ticks => time.tick,
        };
        let phase = elapsed % self.total;

        match self.uniform {
            Some(duration) => (phase / duration as u64) as usize,
            None => self.starts.partition_point(|start| *start <= phase) - 1,
        }
    }

    /// Effective tile id at `time`.
    pub fn frame_at(&self, time: SimTime) -> TileId {
        self.frames[self.frame_index_at(time)]
    }
}

/// Walk a linked chain starting at `start`.
pub fn build_chain(
    start: TileId,
    layout: &TilesetLayout,
    definitions: &[TileDefinition],
    max_steps: u32,
) -> Result<AnimationCycle, AnimationCycleError> {
    let chain_step = |id: TileId| match definitions.get(id as usize).and_then(TileDefinition::animation) {
        Some(AnimationSpec::Chain { next_x, next_y, hold_ms }) => Some((next_x, next_y, hold_ms)),
        _ => None,
    };

    let mut frames = Vec::new();
    let mut durations = Vec::new();
    let mut visited = BTreeSet::new();
    let mut current = start;

    loop {
        let (next_x, next_y, hold_ms) =
            chain_step(current).ok_or(AnimationCycleError::OpenChain { at: current })?;
        frames.push(current);
        durations.push(hold_ms);
        visited.insert(current);

        let next = layout
            .offset(current, next_x, next_y)
            .map_err(|to| AnimationCycleError::OutOfRange { from: current, to })?;

        if next == start {
            break;
        }
        if visited.contains(&next) || frames.len() as u32 >= max_steps {
            return Err(AnimationCycleError::NonTerminating { steps: frames.len() as u32 });
        }
        current = next;
    }

    AnimationCycle::new(frames, durations, CycleClock::Millis)
}

/// Expand a frame run starting at `base`.
pub fn build_frame_run(
    base: TileId,
    framecount: u32,
    framedelay: u32,
    stride: u32,
    layout: &TilesetLayout,
) -> Result<AnimationCycle, AnimationCycleError> {
    let stride = stride.max(1);
    // The last frame bounds the whole run; checked before anything is allocated
    let last = i64::from(framecount.saturating_sub(1))
        .checked_mul(i64::from(stride))
        .and_then(|span| span.checked_add(i64::from(base)))
        .unwrap_or(i64::MAX);
    if last >= i64::from(layout.tile_count) {
        return Err(AnimationCycleError::OutOfRange { from: base, to: last });
    }

    let frames: Vec<TileId> = (0..framecount).map(|i| base + i * stride).collect();
    let durations = vec![framedelay; frames.len()];
    AnimationCycle::new(frames, durations, CycleClock::Ticks)
}

/// Cycles for a whole tileset, indexed by tile id.
///
/// Failures are returned alongside; the failing tiles have no cycle.
pub fn build_cycles(
    layout: &TilesetLayout,
    definitions: &[TileDefinition],
    config: &CatalogConfig,
) -> (Vec<Option<AnimationCycle>>, Vec<(TileId, AnimationCycleError)>) {
    let mut cycles = Vec::with_capacity(definitions.len());
    let mut failures = Vec::new();

    for definition in definitions {
        let built = match definition.animation() {
            None => None,
            Some(AnimationSpec::Chain { .. }) => {
                Some(build_chain(definition.id, layout, definitions, config.max_chain_steps))
            }
            Some(AnimationSpec::FrameRun { framecount, framedelay }) => Some(build_frame_run(
                definition.id,
                framecount,
                framedelay,
                config.frame_stride,
                layout,
            )),
        };

        match built {
            Some(Ok(cycle)) => cycles.push(Some(cycle)),
            Some(Err(error)) => {
                failures.push((definition.id, error));
                cycles.push(None);
            }
            None => cycles.push(None),
        }
    }

    (cycles, failures)
}
