//! Collision Resolution
//!
//! Moves an axis-aligned body through the level grid for one tick.
//!
//! Tiles are looked up at their animation-resolved id. A slope half whose
//! verified partner sits in the expected neighbouring cell is swept as one
//! ramp spanning both cells. Each axis is swept on its own; the axis that
//! would penetrate further when moved alone is resolved first, then the
//! other axis is swept from the corrected position.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::config::MotionConfig;
use crate::core::fixed::{Fixed, FIXED_ONE, cell_floor, fixed_div};
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::motion::grid::TileGrid;
use crate::tile::animation::SimTime;
use crate::tile::catalog::TilesetCatalog;
use crate::tile::definition::TileId;
use crate::tile::geometry::{Facing, Ramp, TileGeometry};
use crate::tile::pairing::CompoundSlope;

/// Grid cell coordinates (y up).
pub type Cell = (i32, i32);

/// A moving axis-aligned body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub bounds: FixedRect,
    /// Tiles per second
    pub velocity: FixedVec2,
}

impl Body {
    pub fn new(bounds: FixedRect, velocity: FixedVec2) -> Self {
        Self { bounds, velocity }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A tile that stopped the body this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub cell: Cell,
    /// Effective (animation-resolved) tile id
    pub tile: TileId,
    /// Surface normal pointing out of the tile
    pub normal: FixedVec2,
    pub axis: Axis,
}

/// The tile a body is resting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundContact {
    pub cell: Cell,
    /// Effective (animation-resolved) tile id
    pub tile: TileId,
    /// World y of the supporting surface under the body
    pub surface_y: Fixed,
    pub normal: FixedVec2,
}

/// Outcome of one tick of collision resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMotion {
    /// Corrected bounds at the end of the tick
    pub bounds: FixedRect,
    /// Input velocity with blocked axes zeroed
    pub velocity: FixedVec2,
    /// Tiles that stopped the body, first resolved axis first
    pub contacts: Vec<Contact>,
    /// Supporting tile, if the body is grounded
    pub ground: Option<GroundContact>,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

impl ResolvedMotion {
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.ground.is_some()
    }
}

/// World-space collision volume gathered for one tick.
#[derive(Clone, Copy, Debug)]
enum SolidShape {
    Block(FixedRect),
    /// `region` is the world area the ramp may occupy; heights are measured
    /// from the owning solid's origin.
    Ramp { ramp: Ramp, limit: Fixed, region: FixedRect },
    OneWay { facing: Facing, cell: FixedRect },
}

#[derive(Clone, Copy, Debug)]
struct Solid {
    /// Bottom-left corner of the anchoring cell
    origin: FixedVec2,
    shape: SolidShape,
    near: (Cell, TileId),
    /// Second half of a compound slope
    far: Option<(Cell, TileId)>,
}

impl Solid {
    fn single(cell: Cell, tile: TileId, geometry: &TileGeometry) -> Option<Self> {
        let origin = FixedVec2::from_ints(cell.0, cell.1);
        let bounds = FixedRect::cell(cell.0, cell.1);
        let shape = match *geometry {
            TileGeometry::Empty => return None,
            TileGeometry::Block(local) => SolidShape::Block(local.translate(origin)),
            TileGeometry::Ramp(ramp) => SolidShape::Ramp { ramp, limit: FIXED_ONE, region: bounds },
            TileGeometry::OneWay(facing) => SolidShape::OneWay { facing, cell: bounds },
        };
        Some(Self { origin, shape, near: (cell, tile), far: None })
    }

    fn compound(near: Cell, far: Cell, compound: &CompoundSlope) -> Self {
        let origin = FixedVec2::from_ints(near.0, near.1);
        Self {
            origin,
            shape: SolidShape::Ramp {
                ramp: compound.ramp,
                limit: compound.height_limit(),
                region: compound.region().translate(origin),
            },
            near: (near, compound.near),
            far: Some((far, compound.far)),
        }
    }

    /// Half of the solid that contains `point`.
    fn half_at(&self, point: FixedVec2) -> (Cell, TileId) {
        match self.far {
            Some((cell, tile)) if cell == (cell_floor(point.x), cell_floor(point.y)) => (cell, tile),
            _ => self.near,
        }
    }
}

/// Highest ramp height over the part of `span` inside `region`, with the
/// world x where it is reached.
fn ramp_peak(
    ramp: &Ramp,
    limit: Fixed,
    origin: FixedVec2,
    region: &FixedRect,
    span: &FixedRect,
) -> Option<(Fixed, Fixed)> {
    let x0 = span.min.x.max(region.min.x);
    let x1 = span.max.x.min(region.max.x);
    if x0 >= x1 {
        return None;
    }

    let h0 = ramp.height_within(x0 - origin.x, limit);
    let h1 = ramp.height_within(x1 - origin.x, limit);
    let peak = h0.max(h1);
    if peak <= 0 {
        return None;
    }

    let x = match h0.cmp(&h1) {
        Ordering::Greater => x0,
        Ordering::Less => x1 - 1,
        Ordering::Equal => span.center().x.clamp(x0, x1 - 1),
    };
    Some((peak, x))
}

struct Hit {
    /// Distance the body may still travel (negative pushes it back out)
    travel: Fixed,
    normal: FixedVec2,
    /// Point just inside the solid where contact happens
    point: FixedVec2,
}

#[inline]
fn hit(travel: Fixed, min_travel: Fixed, normal: FixedVec2, point: FixedVec2) -> Option<Hit> {
    (travel >= min_travel).then_some(Hit { travel, normal, point })
}

/// Result of sweeping one axis.
struct Sweep {
    /// Signed displacement actually applied
    travel: Fixed,
    blocked: bool,
    contacts: Vec<Contact>,
}

impl Sweep {
    fn free(delta: Fixed) -> Self {
        Self { travel: delta, blocked: false, contacts: Vec::new() }
    }

    /// How far short of the requested displacement the sweep stopped.
    fn penetration(&self, delta: Fixed) -> Fixed {
        (delta - self.travel).abs()
    }
}

/// Keeps the nearest hits of a sweep. Equal distances all become contacts.
struct Nearest {
    axis: Axis,
    distance: Fixed,
    travel: Option<Fixed>,
    contacts: Vec<Contact>,
}

impl Nearest {
    fn new(axis: Axis, distance: Fixed) -> Self {
        Self { axis, distance, travel: None, contacts: Vec::new() }
    }

    fn offer(&mut self, solid: &Solid, hit: Hit) {
        if hit.travel > self.distance {
            return;
        }
        match self.travel {
            Some(best) if hit.travel > best => return,
            Some(best) if hit.travel < best => self.contacts.clear(),
            _ => {}
        }

        self.travel = Some(hit.travel);
        let (cell, tile) = solid.half_at(hit.point);
        self.contacts.push(Contact { cell, tile, normal: hit.normal, axis: self.axis });
    }

    fn finish(self, delta: Fixed) -> Sweep {
        match self.travel {
            Some(travel) => Sweep {
                travel: travel * delta.signum(),
                blocked: true,
                contacts: self.contacts,
            },
            None => Sweep::free(delta),
        }
    }
}

/// Per-tick collision queries against one level.
///
/// Holds only shared references; any number of bodies can be resolved
/// against the same resolver.
#[derive(Clone, Copy, Debug)]
pub struct CollisionResolver<'a> {
    catalog: &'a TilesetCatalog,
    grid: &'a TileGrid,
    config: &'a MotionConfig,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(catalog: &'a TilesetCatalog, grid: &'a TileGrid, config: &'a MotionConfig) -> Self {
        Self { catalog, grid, config }
    }

    pub fn catalog(&self) -> &'a TilesetCatalog {
        self.catalog
    }

    pub fn grid(&self) -> &'a TileGrid {
        self.grid
    }

    pub fn config(&self) -> &'a MotionConfig {
        self.config
    }

    /// Move `body` by one tick of its velocity.
    pub fn resolve(&self, body: &Body, time: SimTime) -> ResolvedMotion {
        let start = body.bounds;
        let delta = body.velocity.scale(self.config.tick_dt());
        let solids = self.gather(&start, delta, time);

        // Larger penetration first; ties go vertical
        let step = self.step_room(&solids, &start, delta.x);
        let trial_x = self.sweep_x(&solids, &start, &start, delta.x, step);
        let trial_y = self.sweep_y(&solids, &start, &start, delta.y);
        let x_first = trial_x.penetration(delta.x) > trial_y.penetration(delta.y);

        let (bounds, first, second) = if x_first {
            let bounds = self.move_x(&solids, start, trial_x.travel, step);
            let sweep_y = self.sweep_y(&solids, &start, &bounds, delta.y);
            let bounds = bounds.translate(FixedVec2::new(0, sweep_y.travel));
            (bounds, trial_x, sweep_y)
        } else {
            let bounds = start.translate(FixedVec2::new(0, trial_y.travel));
            let step = self.step_room(&solids, &bounds, delta.x);
            let sweep_x = self.sweep_x(&solids, &start, &bounds, delta.x, step);
            let bounds = self.move_x(&solids, bounds, sweep_x.travel, step);
            (bounds, trial_y, sweep_x)
        };
        let (sweep_x, sweep_y) = if x_first { (&first, &second) } else { (&second, &first) };

        let mut velocity = body.velocity;
        if sweep_x.blocked {
            velocity.x = 0;
        }
        if sweep_y.blocked {
            velocity.y = 0;
        }

        let ground = if velocity.y <= 0 { self.find_ground(&bounds, time) } else { None };

        #[cfg(feature = "debug-tracing")]
        trace!(
            ?bounds,
            blocked_x = sweep_x.blocked,
            blocked_y = sweep_y.blocked,
            ground = ?ground.map(|g| g.tile),
            "body resolved"
        );

        let blocked_x = sweep_x.blocked;
        let blocked_y = sweep_y.blocked;
        let mut contacts = first.contacts;
        contacts.extend(second.contacts);

        ResolvedMotion { bounds, velocity, contacts, ground, blocked_x, blocked_y }
    }

    /// Collect every solid that can touch the body this tick.
    fn gather(&self, start: &FixedRect, delta: FixedVec2, time: SimTime) -> Vec<Solid> {
        let moved = start.translate(delta);
        let area = FixedRect::new(
            FixedVec2::new(
                start.min.x.min(moved.min.x),
                start.min.y.min(moved.min.y) - self.config.ground_reach,
            ),
            FixedVec2::new(
                start.max.x.max(moved.max.x),
                start.max.y.max(moved.max.y) + self.config.step_height,
            ),
        );

        let mut solids = Vec::new();
        let mut anchors = BTreeSet::new();

        for (cx, cy) in area.cell_span().cells() {
            let Some(base) = self.grid.get(cx, cy) else { continue };
            let tile = self.catalog.effective_tile(base, time);
            let geometry = self.catalog.geometry(tile);
            if geometry.is_empty() {
                continue;
            }

            if let Some(solid) = self.compound_at((cx, cy), tile, time) {
                // Both halves may be in range; keep the pair once
                if anchors.insert(solid.near.0) {
                    solids.push(solid);
                }
                continue;
            }

            if let Some(solid) = Solid::single((cx, cy), tile, geometry) {
                solids.push(solid);
            }
        }

        solids
    }

    /// Compound ramp for a slope half whose partner occupies the expected cell.
    fn compound_at(&self, cell: Cell, tile: TileId, time: SimTime) -> Option<Solid> {
        let compound = self.catalog.compound_slope(tile)?;
        let (dx, dy) = compound.far_offset;

        let (near, far, partner_cell, expected) = if tile == compound.near {
            let far = (cell.0 + dx, cell.1 + dy);
            (cell, far, far, compound.far)
        } else {
            let near = (cell.0 - dx, cell.1 - dy);
            (near, cell, near, compound.near)
        };

        let partner = self.grid.get(partner_cell.0, partner_cell.1)?;
        (self.catalog.effective_tile(partner, time) == expected)
            .then(|| Solid::compound(near, far, compound))
    }

    /// Step height usable while moving `bounds` by `dx`: the configured
    /// step, cut down to the free space above the body along its path.
    fn step_room(&self, solids: &[Solid], bounds: &FixedRect, dx: Fixed) -> Fixed {
        let step = self.config.step_height;
        if dx == 0 || step <= 0 {
            return step.max(0);
        }
        let path = FixedRect::new(
            FixedVec2::new(bounds.min.x.min(bounds.min.x + dx), bounds.min.y),
            FixedVec2::new(bounds.max.x.max(bounds.max.x + dx), bounds.max.y),
        );
        self.sweep_y(solids, &path, &path, step).travel.clamp(0, step)
    }

    /// Sweep `bounds` vertically by `dy`. One-way tests use `start`.
    fn sweep_y(&self, solids: &[Solid], start: &FixedRect, bounds: &FixedRect, dy: Fixed) -> Sweep {
        if dy == 0 {
            return Sweep::free(0);
        }

        let down = dy < 0;
        let mut nearest = Nearest::new(Axis::Vertical, dy.abs());
        for solid in solids {
            if let Some(hit) = self.vertical_hit(solid, start, bounds, down) {
                nearest.offer(solid, hit);
            }
        }
        nearest.finish(dy)
    }

    fn vertical_hit(&self, solid: &Solid, start: &FixedRect, bounds: &FixedRect, down: bool) -> Option<Hit> {
        let step = self.config.step_height;
        let grace = self.config.oneway_grace;
        let bottom = bounds.min.y;
        let top = bounds.max.y;
        let x_in = |rect: &FixedRect| {
            bounds.center().x.clamp(bounds.min.x.max(rect.min.x), bounds.max.x.min(rect.max.x) - 1)
        };

        match solid.shape {
            SolidShape::Block(rect) => {
                if !bounds.overlaps_x(&rect) {
                    return None;
                }
                let x = x_in(&rect);
                if down {
                    hit(bottom - rect.max.y, 0, FixedVec2::UP, FixedVec2::new(x, rect.max.y - 1))
                } else {
                    hit(rect.min.y - top, 0, FixedVec2::DOWN, FixedVec2::new(x, rect.min.y))
                }
            }
            SolidShape::Ramp { ramp, limit, region } => {
                let (peak, x) = ramp_peak(&ramp, limit, solid.origin, &region, bounds)?;
                match (ramp.ceiling, down) {
                    (false, true) => {
                        // Bodies sunk into the surface by up to one step are pushed back out
                        let surface = solid.origin.y + peak;
                        hit(bottom - surface, -step, ramp.normal(), FixedVec2::new(x, surface - 1))
                    }
                    (false, false) => hit(
                        region.min.y - top,
                        0,
                        FixedVec2::DOWN,
                        FixedVec2::new(x, region.min.y),
                    ),
                    (true, false) => {
                        let surface = solid.origin.y + FIXED_ONE - peak;
                        hit(surface - top, 0, ramp.normal(), FixedVec2::new(x, surface))
                    }
                    (true, true) => hit(
                        bottom - region.max.y,
                        0,
                        FixedVec2::UP,
                        FixedVec2::new(x, region.max.y - 1),
                    ),
                }
            }
            SolidShape::OneWay { facing, cell } => {
                if !bounds.overlaps_x(&cell) {
                    return None;
                }
                let x = x_in(&cell);
                match (facing, down) {
                    (Facing::Up, true) if start.min.y >= cell.max.y - grace => hit(
                        bottom - cell.max.y,
                        -grace,
                        FixedVec2::UP,
                        FixedVec2::new(x, cell.max.y - 1),
                    ),
                    (Facing::Down, false) if start.max.y <= cell.min.y + grace => hit(
                        cell.min.y - top,
                        -grace,
                        FixedVec2::DOWN,
                        FixedVec2::new(x, cell.min.y),
                    ),
                    _ => None,
                }
            }
        }
    }

    /// Sweep `bounds` horizontally by `dx`, stepping over rises up to `step`.
    /// One-way tests use `start`.
    fn sweep_x(&self, solids: &[Solid], start: &FixedRect, bounds: &FixedRect, dx: Fixed, step: Fixed) -> Sweep {
        if dx == 0 {
            return Sweep::free(0);
        }

        let right = dx > 0;
        let mut nearest = Nearest::new(Axis::Horizontal, dx.abs());
        for solid in solids {
            if let Some(hit) = self.horizontal_hit(solid, start, bounds, right, step) {
                nearest.offer(solid, hit);
            }
        }
        nearest.finish(dx)
    }

    fn horizontal_hit(
        &self,
        solid: &Solid,
        start: &FixedRect,
        bounds: &FixedRect,
        right: bool,
        step: Fixed,
    ) -> Option<Hit> {
        let grace = self.config.oneway_grace;
        let lead = if right { bounds.max.x } else { bounds.min.x };
        let ahead = |x: Fixed| if right { x - lead } else { lead - x };
        let inside = |x: Fixed| if right { x } else { x - 1 };
        let face = if right { FixedVec2::LEFT } else { FixedVec2::RIGHT };
        let y_in = |rect: &FixedRect| {
            bounds.center().y.clamp(bounds.min.y.max(rect.min.y), bounds.max.y.min(rect.max.y) - 1)
        };

        match solid.shape {
            SolidShape::Block(rect) => {
                if !bounds.overlaps_y(&rect) {
                    return None;
                }
                // Low ledges are stepped onto after the move
                let climb = rect.max.y - bounds.min.y;
                if climb > 0 && climb <= step {
                    return None;
                }
                let entry = if right { rect.min.x } else { rect.max.x };
                hit(ahead(entry), 0, face, FixedVec2::new(inside(entry), y_in(&rect)))
            }
            SolidShape::Ramp { ramp, limit, region } => {
                if !bounds.overlaps_y(&region) {
                    return None;
                }
                if (right && bounds.min.x >= region.max.x) || (!right && bounds.max.x <= region.min.x) {
                    return None;
                }

                // The body passes wherever the surface stays at or below this height
                let origin = solid.origin;
                let threshold = if ramp.ceiling {
                    origin.y + FIXED_ONE - bounds.max.y
                } else {
                    bounds.min.y + step - origin.y
                }
                .max(0);
                if threshold >= limit {
                    return None;
                }

                let (lo, hi) = (region.min.x - origin.x, region.max.x - origin.x);
                let entry = if right { lo } else { hi };
                let rising = (ramp.rise() > 0) == right;

                let block_x = if rising {
                    let x = fixed_div(threshold - ramp.h0, ramp.rise());
                    if right {
                        if x >= hi {
                            return None;
                        }
                        x.max(lo)
                    } else {
                        if x <= lo {
                            return None;
                        }
                        x.min(hi)
                    }
                } else {
                    if ahead(origin.x + entry) < 0 || ramp.height_within(entry, limit) <= threshold {
                        return None;
                    }
                    entry
                };

                let normal = if block_x == entry { face } else { ramp.normal() };
                let x = origin.x + block_x;
                hit(ahead(x).max(0), 0, normal, FixedVec2::new(inside(x), y_in(&region)))
            }
            SolidShape::OneWay { facing, cell } => {
                if !bounds.overlaps_y(&cell) {
                    return None;
                }
                match (facing, right) {
                    (Facing::Left, true) if start.max.x <= cell.min.x + grace => hit(
                        cell.min.x - bounds.max.x,
                        -grace,
                        FixedVec2::LEFT,
                        FixedVec2::new(cell.min.x, y_in(&cell)),
                    ),
                    (Facing::Right, false) if start.min.x >= cell.max.x - grace => hit(
                        bounds.min.x - cell.max.x,
                        -grace,
                        FixedVec2::RIGHT,
                        FixedVec2::new(cell.max.x - 1, y_in(&cell)),
                    ),
                    _ => None,
                }
            }
        }
    }

    /// Apply a horizontal move, then lift the body onto any ledge or ramp
    /// surface it walked into that is no taller than `step`.
    fn move_x(&self, solids: &[Solid], bounds: FixedRect, travel: Fixed, step: Fixed) -> FixedRect {
        let moved = bounds.translate(FixedVec2::new(travel, 0));
        if travel == 0 {
            return moved;
        }

        let lift = solids
            .iter()
            .filter_map(|solid| {
                let top = match solid.shape {
                    SolidShape::Block(rect) if moved.overlaps(&rect) => rect.max.y,
                    SolidShape::Ramp { ramp, limit, region }
                        if !ramp.ceiling && moved.overlaps_y(&region) =>
                    {
                        solid.origin.y + ramp_peak(&ramp, limit, solid.origin, &region, &moved)?.0
                    }
                    _ => return None,
                };
                let climb = top - moved.min.y;
                (climb > 0 && climb <= step).then_some(climb)
            })
            .max()
            .unwrap_or(0);

        moved.translate(FixedVec2::new(0, lift))
    }

    /// Supporting surface within the ground reach of the body's
    /// bottom edge.
    ///
    /// Ties prefer the cell under the body's centre, then the highest
    /// surface, then the lowest cell x.
    fn find_ground(&self, bounds: &FixedRect, time: SimTime) -> Option<GroundContact> {
        let reach = self.config.ground_reach;
        let bottom = bounds.min.y;
        let area = FixedRect::new(
            FixedVec2::new(bounds.min.x, bottom - reach),
            FixedVec2::new(bounds.max.x, bottom + reach + 1),
        );
        let centre_cell = cell_floor(bounds.center().x);

        area.cell_span()
            .cells()
            .filter_map(|(cx, cy)| {
                let base = self.grid.get(cx, cy)?;
                let tile = self.catalog.effective_tile(base, time);
                let cell = FixedRect::cell(cx, cy);
                let x0 = bounds.min.x.max(cell.min.x) - cell.min.x;
                let x1 = bounds.max.x.min(cell.max.x) - cell.min.x;

                let (surface_y, normal) = match *self.catalog.geometry(tile) {
                    TileGeometry::Block(local) => {
                        if x0 >= local.max.x || local.min.x >= x1 {
                            return None;
                        }
                        (cell.min.y + local.max.y, FixedVec2::UP)
                    }
                    TileGeometry::Ramp(ramp) => {
                        let peak = ramp.height_at(x0).max(ramp.height_at(x1));
                        if peak <= 0 {
                            return None;
                        }
                        if ramp.ceiling {
                            (cell.max.y, FixedVec2::UP)
                        } else {
                            (cell.min.y + peak, ramp.normal())
                        }
                    }
                    TileGeometry::OneWay(Facing::Up) => (cell.max.y, FixedVec2::UP),
                    TileGeometry::OneWay(_) | TileGeometry::Empty => return None,
                };

                let in_reach = surface_y >= bottom - reach && surface_y <= bottom + reach;
                in_reach.then_some(GroundContact { cell: (cx, cy), tile, surface_y, normal })
            })
            .min_by_key(|g| (g.cell.0 != centre_cell, Reverse(g.surface_y), g.cell.0))
    }
}
