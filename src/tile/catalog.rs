//! Tileset Catalog
//!
//! Immutable per-tileset tables built once at level load: normalized
//! definitions, resolved geometry, animation cycles and verified slope
//! pairs. After the build nothing is written, so a catalog can be shared
//! by reference across every body resolved in a tick.
//!
//! ## Build order
//!
//! ```text
//! source ─▶ normalize ─▶ geometry ─▶ pair slopes ─▶ animation cycles ─▶ fingerprint
//!              │            │             │                 │
//!              └── unknown shape / property / pairing / cycle diagnostics
//! ```

use tracing::info;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::config::CatalogConfig;
use crate::core::hash::{StateHash, StateHasher};
use crate::tile::animation::{build_cycles, AnimationCycle, SimTime};
use crate::tile::definition::{TileDefinition, TileId, TilesetLayout};
use crate::tile::diagnostics::{Diagnostic, Diagnostics};
use crate::tile::error::LoadError;
use crate::tile::geometry::TileGeometry;
use crate::tile::pairing::{pair_slopes, CompoundSlope};
use crate::tile::schema::{normalize, TilesetSource};
use crate::tile::shape::TileShape;

/// Read-only tile tables for one tileset.
#[derive(Clone, Debug)]
pub struct TilesetCatalog {
    layout: TilesetLayout,
    definitions: Vec<TileDefinition>,
    geometry: Vec<TileGeometry>,
    cycles: Vec<Option<AnimationCycle>>,
    compounds: Vec<CompoundSlope>,
    /// Per tile, index into `compounds`
    compound_index: Vec<Option<usize>>,
    diagnostics: Diagnostics,
    fingerprint: StateHash,
}

/// Normalize a tileset document and build its catalog.
pub fn load_catalog(source: &TilesetSource, config: &CatalogConfig) -> Result<TilesetCatalog, LoadError> {
    let (layout, definitions, diagnostics) = normalize(source)?;
    Ok(TilesetCatalog::build(layout, definitions, diagnostics, config))
}

impl TilesetCatalog {
    /// Build from already-normalized definitions.
    ///
    /// Ids missing from `definitions` become empty tiles.
    pub fn from_definitions(
        layout: TilesetLayout,
        definitions: Vec<TileDefinition>,
        config: &CatalogConfig,
    ) -> Result<Self, LoadError> {
        if layout.columns == 0 {
            return Err(LoadError::ZeroColumns);
        }

        let mut dense: Vec<Option<TileDefinition>> = vec![None; layout.tile_count as usize];
        for definition in definitions {
            let id = definition.id;
            let slot = dense
                .get_mut(id as usize)
                .ok_or(LoadError::TileIdOutOfRange { id, tile_count: layout.tile_count })?;
            if slot.is_some() {
                return Err(LoadError::DuplicateTileId(id));
            }
            *slot = Some(definition);
        }

        let definitions = dense
            .into_iter()
            .enumerate()
            .map(|(id, slot)| slot.unwrap_or_else(|| TileDefinition::new(id as TileId, TileShape::EMPTY)))
            .collect();

        Ok(Self::build(layout, definitions, Diagnostics::new(), config))
    }

    fn build(
        layout: TilesetLayout,
        mut definitions: Vec<TileDefinition>,
        mut diagnostics: Diagnostics,
        config: &CatalogConfig,
    ) -> Self {
        let mut geometry: Vec<TileGeometry> = definitions
            .iter()
            .map(|d| TileGeometry::from_shape(d.shape, config))
            .collect();

        // Slope pairs
        let shapes: Vec<TileShape> = definitions.iter().map(|d| d.shape).collect();
        let pairing = pair_slopes(&layout, &shapes, &geometry, config.seam_tolerance);
        for id in pairing.broken_tiles() {
            definitions[id as usize].shape = TileShape::SOLID;
            geometry[id as usize] = TileGeometry::solid();
        }
        for error in &pairing.errors {
            diagnostics.push(Diagnostic::slope_pairing(error.clone()));
        }

        let compounds = pairing.compounds;
        let mut compound_index = vec![None; definitions.len()];
        for (index, compound) in compounds.iter().enumerate() {
            compound_index[compound.near as usize] = Some(index);
            compound_index[compound.far as usize] = Some(index);
        }

        // Animation cycles
        let (cycles, failures) = build_cycles(&layout, &definitions, config);
        for (id, error) in failures {
            definitions[id as usize].make_static();
            diagnostics.push(Diagnostic::animation(id, error));
        }

        diagnostics.finish();
        diagnostics.log(&layout.name);

        let fingerprint = Self::compute_fingerprint(&layout, &definitions);
        let catalog = Self {
            layout,
            definitions,
            geometry,
            cycles,
            compounds,
            compound_index,
            diagnostics,
            fingerprint,
        };

        info!(
            tileset = %catalog.layout.name,
            tiles = catalog.definitions.len(),
            animated = catalog.cycles.iter().flatten().count(),
            slope_pairs = catalog.compounds.len(),
            diagnostics = catalog.diagnostics.len(),
            fingerprint = %hex::encode(&catalog.fingerprint[..8]),
            "Tileset catalog built"
        );

        catalog
    }

    fn compute_fingerprint(layout: &TilesetLayout, definitions: &[TileDefinition]) -> StateHash {
        let mut hasher = StateHasher::for_catalog();
        hasher.update_u32(layout.columns);
        hasher.update_u32(layout.tile_count);
        for definition in definitions {
            definition.hash_into(&mut hasher);
        }
        hasher.finalize()
    }

    pub fn layout(&self) -> &TilesetLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definition as loaded, after any degradation.
    pub fn get(&self, id: TileId) -> Option<&TileDefinition> {
        self.definitions.get(id as usize)
    }

    /// Geometry of a tile. Unknown ids have none.
    pub fn geometry(&self, id: TileId) -> &TileGeometry {
        const NONE: TileGeometry = TileGeometry::Empty;
        self.geometry.get(id as usize).unwrap_or(&NONE)
    }

    /// Tile to use for shape and material lookups at `time`.
    pub fn effective_tile(&self, id: TileId, time: SimTime) -> TileId {
        match self.cycle(id) {
            Some(cycle) => {
                let frame = cycle.frame_at(time);
                #[cfg(feature = "debug-tracing")]
                trace!(tile = id, frame, "animated tile resolved");
                frame
            }
            None => id,
        }
    }

    pub fn cycle(&self, id: TileId) -> Option<&AnimationCycle> {
        self.cycles.get(id as usize).and_then(Option::as_ref)
    }

    /// Verified pair this tile belongs to, if any.
    pub fn compound_slope(&self, id: TileId) -> Option<&CompoundSlope> {
        self.compound_index
            .get(id as usize)
            .copied()
            .flatten()
            .map(|index| &self.compounds[index])
    }

    pub fn compound_slopes(&self) -> &[CompoundSlope] {
        &self.compounds
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// SHA-256 over the normalized tile tables.
    pub fn fingerprint(&self) -> StateHash {
        self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::diagnostics::{DiagnosticKind, Fallback};
    use crate::tile::error::AnimationCycleError;
    use crate::tile::schema::RawTile;
    use crate::tile::shape::ShapeKind;

    fn layout() -> TilesetLayout {
        TilesetLayout::new("test", 8, 64)
    }

    #[test]
    fn test_unknown_shape_contributes_nothing() {
        let source = TilesetSource::new("test", 8, 64)
            .with_tile(RawTile::new(0).prop("shape", "solid"))
            .with_tile(RawTile::new(1).prop("shape", "pyramid"));
        let catalog = load_catalog(&source, &CatalogConfig::default()).unwrap();

        assert!(catalog.geometry(1).is_empty());
        assert_eq!(catalog.diagnostics().len(), 1);
        assert_eq!(catalog.diagnostics().for_tile(1).count(), 1);
        assert_eq!(*catalog.geometry(0), TileGeometry::solid());
    }

    #[test]
    fn test_broken_pair_degrades_to_solid() {
        let defs = vec![
            TileDefinition::new(5, TileShape::mirrored(ShapeKind::Steep2, true, false)),
            TileDefinition::new(13, TileShape::new(ShapeKind::Steep1)),
        ];
        let catalog = TilesetCatalog::from_definitions(layout(), defs, &CatalogConfig::default()).unwrap();

        assert_eq!(*catalog.geometry(5), TileGeometry::solid());
        assert_eq!(*catalog.geometry(13), TileGeometry::solid());
        assert_eq!(catalog.get(13).unwrap().shape, TileShape::SOLID);
        let diagnostic = catalog.diagnostics().iter().next().unwrap();
        assert!(matches!(diagnostic.kind, DiagnosticKind::SlopePairing(_)));
        assert_eq!(diagnostic.fallback, Fallback::Solid);
    }

    #[test]
    fn test_pair_lookup_from_either_half() {
        let defs = vec![
            TileDefinition::new(16, TileShape::new(ShapeKind::Shallow1)),
            TileDefinition::new(17, TileShape::new(ShapeKind::Shallow2)),
        ];
        let catalog = TilesetCatalog::from_definitions(layout(), defs, &CatalogConfig::default()).unwrap();
        assert_eq!(catalog.compound_slope(16), catalog.compound_slope(17));
        assert!(catalog.compound_slope(16).is_some());
        assert!(catalog.compound_slope(18).is_none());
        assert!(catalog.diagnostics().is_empty());
    }

    #[test]
    fn test_bad_chain_degrades_to_static() {
        let defs = vec![TileDefinition::new(7, TileShape::SOLID).with_chain(1, 0, 50)];
        let catalog = TilesetCatalog::from_definitions(layout(), defs, &CatalogConfig::default()).unwrap();

        assert!(catalog.cycle(7).is_none());
        assert_eq!(catalog.get(7).unwrap().animation(), None);
        assert_eq!(catalog.effective_tile(7, SimTime::new(100, 5000)), 7);
        let diagnostic = catalog.diagnostics().iter().next().unwrap();
        assert_eq!(
            diagnostic.kind,
            DiagnosticKind::Animation(AnimationCycleError::OutOfRange { from: 7, to: 8 })
        );
        // Shape survives the failed animation.
        assert_eq!(*catalog.geometry(7), TileGeometry::solid());
    }

    #[test]
    fn test_effective_tile_follows_frame_run() {
        let defs = vec![TileDefinition::new(8, TileShape::SOLID).with_frame_run(4, 2)];
        let catalog = TilesetCatalog::from_definitions(layout(), defs, &CatalogConfig::default()).unwrap();
        assert_eq!(catalog.effective_tile(8, SimTime::new(0, 0)), 8);
        assert_eq!(catalog.effective_tile(8, SimTime::new(5, 0)), 10);
        assert_eq!(catalog.effective_tile(3, SimTime::new(5, 0)), 3);
    }

    #[test]
    fn test_structural_errors() {
        let config = CatalogConfig::default();
        let dup = vec![TileDefinition::new(1, TileShape::SOLID), TileDefinition::new(1, TileShape::SOLID)];
        assert!(matches!(
            TilesetCatalog::from_definitions(layout(), dup, &config),
            Err(LoadError::DuplicateTileId(1))
        ));

        let outside = vec![TileDefinition::new(64, TileShape::SOLID)];
        assert!(matches!(
            TilesetCatalog::from_definitions(layout(), outside, &config),
            Err(LoadError::TileIdOutOfRange { id: 64, .. })
        ));

        let no_columns = TilesetLayout::new("test", 0, 64);
        assert!(matches!(
            TilesetCatalog::from_definitions(no_columns, Vec::new(), &config),
            Err(LoadError::ZeroColumns)
        ));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let config = CatalogConfig::default();
        let a = TilesetCatalog::from_definitions(layout(), vec![TileDefinition::new(1, TileShape::SOLID)], &config).unwrap();
        let b = TilesetCatalog::from_definitions(layout(), vec![TileDefinition::new(1, TileShape::SOLID)], &config).unwrap();
        let c = TilesetCatalog::from_definitions(layout(), vec![TileDefinition::new(2, TileShape::SOLID)], &config).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
