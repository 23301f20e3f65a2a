//! Per-tick cost of collision resolution and catalog construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tileshape::{
    config::{CatalogConfig, MotionConfig},
    core::fixed::{from_int, to_fixed},
    core::rect::FixedRect,
    core::vec2::FixedVec2,
    motion::{simulate, Body, BodyState, CollisionResolver, TileGrid},
    tile::{load_catalog, RawTile, SimTime, TilesetCatalog, TilesetSource},
};

fn source() -> TilesetSource {
    let mut source = TilesetSource::new("bench", 16, 256)
        .with_tile(RawTile::new(1).prop("shape", "solid"))
        .with_tile(RawTile::new(2).prop("shape", "oneway"))
        .with_tile(RawTile::new(3).prop("shape", "slope"))
        .with_tile(RawTile::new(4).prop("shape", "solid").prop("material", "conveyor_slow"))
        .with_tile(RawTile::new(5).prop("shape", "shallow1"))
        .with_tile(RawTile::new(6).prop("shape", "shallow2"));
    // A row of chained animations
    for id in 64..72 {
        let next = if id == 71 { -7 } else { 1 };
        source = source.with_tile(
            RawTile::new(id)
                .prop("shape", "solid")
                .prop("logic", "anim")
                .int_prop("logic_arg", 100)
                .int_prop("next_x", next),
        );
    }
    source
}

fn level() -> TileGrid {
    let mut grid = TileGrid::new(64, 16);
    grid.fill_row(0, 0, 63, 1);
    grid.fill_row(0, 20, 40, 4);
    for x in (4..60).step_by(8) {
        grid.set(x, 1, Some(3));
        grid.set(x + 2, 1, Some(5));
        grid.set(x + 3, 1, Some(6));
        grid.set(x + 5, 3, Some(2));
        grid.set(x + 6, 2, Some(64));
    }
    grid
}

fn catalog() -> TilesetCatalog {
    load_catalog(&source(), &CatalogConfig::default()).unwrap()
}

fn bench_load(c: &mut Criterion) {
    let source = source();
    let config = CatalogConfig::default();
    c.bench_function("load_catalog", |b| {
        b.iter(|| load_catalog(black_box(&source), &config).unwrap())
    });
}

fn bench_resolve(c: &mut Criterion) {
    let catalog = catalog();
    let grid = level();
    let config = MotionConfig::default();
    let resolver = CollisionResolver::new(&catalog, &grid, &config);
    let body = Body::new(
        FixedRect::from_size(FixedVec2::new(to_fixed(10.25), from_int(1)), to_fixed(0.75), to_fixed(1.5)),
        FixedVec2::new(from_int(4), -from_int(3)),
    );

    c.bench_function("resolve_single_tick", |b| {
        b.iter(|| resolver.resolve(black_box(&body), SimTime::new(30, 500)))
    });
}

fn bench_simulate(c: &mut Criterion) {
    let catalog = catalog();
    let grid = level();
    let config = MotionConfig::default();
    let resolver = CollisionResolver::new(&catalog, &grid, &config);
    let start = BodyState::new(
        FixedRect::from_size(FixedVec2::new(from_int(2), from_int(6)), to_fixed(0.75), to_fixed(1.5)),
        FixedVec2::new(from_int(3), 0),
    );

    c.bench_function("simulate_600_ticks", |b| {
        b.iter(|| simulate(&resolver, black_box(start), 600, from_int(20)))
    });
}

criterion_group!(benches, bench_load, bench_resolve, bench_simulate);
criterion_main!(benches);
