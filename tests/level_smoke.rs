//! End-to-end checks through the public API: load a tileset document,
//! build a level and run bodies through it.

use tileshape::{
    config::{CatalogConfig, MotionConfig},
    core::fixed::{fixed_mul, from_int, to_fixed, FIXED_ONE},
    core::rect::FixedRect,
    core::vec2::FixedVec2,
    motion::{simulate, step_body, BodyState, CollisionResolver, TileGrid},
    tile::{
        load_catalog, DiagnosticKind, Fallback, RawTile, ShapeKind, SimTime, TileGeometry, TileShape,
        TilesetSource,
    },
};

const LEGACY_JSON: &str = r#"{
    "name": "tile_test",
    "columns": 16,
    "tilecount": 128,
    "tiles": [
        { "id": 1, "properties": [ { "name": "SHAPE", "value": "SOLID" } ] },
        { "id": 2, "properties": [ { "name": "SHAPE", "value": "ONEWAY" } ] },
        { "id": 3, "properties": [ { "name": "SHAPE", "value": "ONEWAY_WALL-H" } ] },
        { "id": 4, "properties": [
            { "name": "SHAPE", "value": "SOLID" },
            { "name": "MATERIAL", "value": "CONVEYOR_SLOW" }
        ] },
        { "id": 66, "properties": [
            { "name": "SHAPE", "value": "SOLID" },
            { "name": "ANIM", "value": "&lt;anim ms=&quot;50&quot; nextx=&quot;1&quot; nexty=&quot;0&quot; tileset=&quot;&quot;/&gt;" }
        ] }
    ]
}"#;

const CURRENT_JSON: &str = r#"{
    "name": "tile_test",
    "columns": 16,
    "tilecount": 128,
    "tiles": [
        { "id": 1, "properties": [ { "name": "shape", "value": "solid" } ] },
        { "id": 2, "properties": [ { "name": "shape", "value": "oneway" } ] },
        { "id": 3, "properties": [ { "name": "shape", "value": "oneway_wall-h" } ] },
        { "id": 4, "properties": [
            { "name": "shape", "value": "solid" },
            { "name": "material", "value": "conveyor_slow" }
        ] },
        { "id": 66, "properties": [
            { "name": "shape", "value": "solid" },
            { "name": "logic", "value": "anim" },
            { "name": "logic_arg", "value": "50" },
            { "name": "next_x", "type": "int", "value": 1 },
            { "name": "next_y", "type": "int", "value": 0 }
        ] }
    ]
}"#;

fn chain_tileset() -> TilesetSource {
    let mut source = TilesetSource::new("tile_test", 16, 128);
    for id in 66..=70 {
        let next_x = if id == 70 { -4 } else { 1 };
        source = source.with_tile(
            RawTile::new(id)
                .prop("shape", "solid")
                .prop("logic", "anim")
                .prop("logic_arg", "50")
                .int_prop("next_x", next_x)
                .int_prop("next_y", 0),
        );
    }
    source
}

#[test]
fn test_schema_generations_share_fingerprint() {
    let config = CatalogConfig::default();
    let legacy = load_catalog(&TilesetSource::from_json_str(LEGACY_JSON).unwrap(), &config).unwrap();
    let current = load_catalog(&TilesetSource::from_json_str(CURRENT_JSON).unwrap(), &config).unwrap();

    assert_eq!(legacy.fingerprint(), current.fingerprint());
    assert_eq!(
        legacy.get(3).unwrap().shape,
        TileShape::mirrored(ShapeKind::OnewayWall, true, false)
    );
}

#[test]
fn test_unknown_shape_loads_with_one_diagnostic() {
    let source = TilesetSource::new("t", 4, 16)
        .with_tile(RawTile::new(1).prop("shape", "solid"))
        .with_tile(RawTile::new(5).prop("shape", "trapezoid"));
    let catalog = load_catalog(&source, &CatalogConfig::default()).unwrap();

    assert_eq!(catalog.diagnostics().len(), 1);
    let diagnostic = catalog.diagnostics().iter().next().unwrap();
    assert_eq!(diagnostic.tile, 5);
    assert_eq!(diagnostic.fallback, Fallback::Empty);
    assert!(matches!(diagnostic.kind, DiagnosticKind::UnknownShape(_)));
    assert_eq!(*catalog.geometry(5), TileGeometry::Empty);
}

#[test]
fn test_duplicate_id_fails_load() {
    let source = TilesetSource::new("t", 4, 16)
        .with_tile(RawTile::new(1).prop("shape", "solid"))
        .with_tile(RawTile::new(1).prop("shape", "half"));
    assert!(load_catalog(&source, &CatalogConfig::default()).is_err());
}

#[test]
fn test_chain_cycle_wraps() {
    let catalog = load_catalog(&chain_tileset(), &CatalogConfig::default()).unwrap();
    let cycle = catalog.cycle(66).unwrap();

    assert_eq!(cycle.frames(), &[66, 67, 68, 69, 70]);
    assert_eq!(cycle.total_duration(), 250);
    assert_eq!(
        catalog.effective_tile(66, SimTime::new(0, 260)),
        catalog.effective_tile(66, SimTime::new(0, 10))
    );
    assert_eq!(catalog.effective_tile(66, SimTime::new(0, 120)), 68);
}

#[test]
fn test_frame_run_holds_each_frame() {
    let source = TilesetSource::new("t", 8, 32).with_tile(
        RawTile::new(8)
            .prop("shape", "solid")
            .int_prop("framecount", 4)
            .int_prop("framedelay", 2),
    );
    let catalog = load_catalog(&source, &CatalogConfig::default()).unwrap();

    let frames: Vec<u32> = (0..10).map(|tick| catalog.effective_tile(8, SimTime::new(tick, 0))).collect();
    assert_eq!(frames, vec![8, 8, 9, 9, 10, 10, 11, 11, 8, 8]);
}

#[test]
fn test_oversized_frame_run_degrades_to_static() {
    let source = TilesetSource::new("t", 8, 32)
        .with_tile(
            RawTile::new(1)
                .prop("shape", "solid")
                .int_prop("framecount", u32::MAX as i64)
                .int_prop("framedelay", 1),
        )
        .with_tile(RawTile::new(2).prop("shape", "half"));
    let catalog = load_catalog(&source, &CatalogConfig::default()).unwrap();

    assert!(catalog.cycle(1).is_none());
    assert_eq!(catalog.effective_tile(1, SimTime::new(5, 0)), 1);
    assert_eq!(catalog.get(1).unwrap().shape, TileShape::SOLID);
    assert_eq!(catalog.diagnostics().len(), 1);
    let diagnostic = catalog.diagnostics().iter().next().unwrap();
    assert_eq!(diagnostic.tile, 1);
    assert_eq!(diagnostic.fallback, Fallback::Static);
}

#[test]
fn test_discontinuous_pair_degrades_to_solid() {
    let source = TilesetSource::new("t", 8, 32)
        .with_tile(RawTile::new(10).prop("shape", "shallow1"))
        .with_tile(RawTile::new(11).prop("shape", "shallow2-v"));
    let catalog = load_catalog(&source, &CatalogConfig::default()).unwrap();

    assert_eq!(catalog.get(10).unwrap().shape, TileShape::SOLID);
    assert_eq!(catalog.get(11).unwrap().shape, TileShape::SOLID);
    assert!(catalog.compound_slope(10).is_none());
    assert!(catalog.compound_slopes().is_empty());

    let pairing: Vec<_> = catalog
        .diagnostics()
        .iter()
        .filter(|d| matches!(d.kind, DiagnosticKind::SlopePairing(_)))
        .collect();
    assert_eq!(pairing.len(), 1);
    assert_eq!(pairing[0].fallback, Fallback::Solid);
}

#[test]
fn test_stacked_steep_pair_is_shared() {
    let source = TilesetSource::new("t", 8, 32)
        .with_tile(RawTile::new(9).prop("shape", "steep2"))
        .with_tile(RawTile::new(17).prop("shape", "steep1"));
    let catalog = load_catalog(&source, &CatalogConfig::default()).unwrap();

    assert_eq!(catalog.compound_slopes().len(), 1);
    let compound = &catalog.compound_slopes()[0];
    assert_eq!((compound.near, compound.far), (17, 9));
    assert_eq!(catalog.compound_slope(9), Some(compound));
    assert_eq!(catalog.compound_slope(17), Some(compound));
    assert!(catalog.diagnostics().is_empty());
}

#[test]
fn test_drop_onto_oneway_then_ride_conveyor() {
    let catalog = load_catalog(&TilesetSource::from_json_str(CURRENT_JSON).unwrap(), &CatalogConfig::default()).unwrap();
    let mut grid = TileGrid::new(16, 8);
    grid.fill_row(0, 0, 15, 4);
    grid.fill_row(3, 2, 6, 2);
    let config = MotionConfig::default();
    let resolver = CollisionResolver::new(&catalog, &grid, &config);

    // Falls onto the one-way platform (top at y = 4)
    let start = BodyState::new(
        FixedRect::from_size(FixedVec2::new(to_fixed(3.25), from_int(6)), to_fixed(0.5), to_fixed(0.5)),
        FixedVec2::ZERO,
    );
    let (on_platform, _) = simulate(&resolver, start, 90, from_int(20));
    assert_eq!(on_platform.bounds.min.y, from_int(4));
    assert_eq!(on_platform.ground.unwrap().tile, 2);
    assert_eq!(on_platform.surface_velocity, FixedVec2::ZERO);

    // Jumping from below passes through the platform
    let below = BodyState::new(
        FixedRect::from_size(FixedVec2::new(to_fixed(3.25), FIXED_ONE), to_fixed(0.5), to_fixed(0.5)),
        FixedVec2::new(0, from_int(12)),
    );
    let (jumped, history) = simulate(&resolver, below, 90, from_int(20));
    assert!(history.iter().any(|r| r.bounds.min.y > from_int(4)));
    assert_eq!(jumped.bounds.min.y, from_int(4));

    // On the conveyor floor the body drifts right at the configured speed
    let mut riding = BodyState::new(
        FixedRect::from_size(FixedVec2::new(from_int(8), FIXED_ONE), to_fixed(0.5), to_fixed(0.5)),
        FixedVec2::ZERO,
    );
    step_body(&resolver, &mut riding, SimTime::ZERO);
    assert_eq!(riding.surface_velocity.x, config.conveyor_speed);
    for tick in 1..=10 {
        step_body(&resolver, &mut riding, SimTime::at_tick(tick, &config));
    }
    let per_tick = fixed_mul(config.conveyor_speed, config.tick_dt());
    assert_eq!(riding.bounds.min.x, from_int(8) + 10 * per_tick);
}
