//! Catalog Diagnostics
//!
//! Per-tile problems found while building a catalog. Each one records what
//! went wrong and how the tile was degraded, ordered by tile id and build
//! stage so two loads of the same data report identically.

use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::tile::definition::TileId;
use crate::tile::error::{AnimationCycleError, PropertyError, SlopePairingError, UnknownShapeError};

/// Build stage that raised a diagnostic.
///
/// Lower value = reported first for the same tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiagnosticStage {
    /// Property normalization
    Schema = 0,
    /// Shape tag parsing
    Shape = 1,
    /// Animation cycle construction
    Animation = 2,
    /// Slope pair verification
    Pairing = 3,
}

/// What the tile became after the problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fallback {
    /// The offending value was ignored
    Ignored,
    /// Tile contributes no collision
    Empty,
    /// Tile keeps its base shape but does not animate
    Static,
    /// Tile collides as a full block
    Solid,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fallback::Ignored => "ignored",
            Fallback::Empty => "treated as empty",
            Fallback::Static => "treated as static",
            Fallback::Solid => "treated as solid",
        })
    }
}

/// The recovered error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    UnknownShape(UnknownShapeError),
    Property(PropertyError),
    Animation(AnimationCycleError),
    SlopePairing(SlopePairingError),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnknownShape(e) => write!(f, "{e}"),
            DiagnosticKind::Property(e) => write!(f, "{e}"),
            DiagnosticKind::Animation(e) => write!(f, "{e}"),
            DiagnosticKind::SlopePairing(e) => write!(f, "{e}"),
        }
    }
}

/// One recovered per-tile problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub tile: TileId,
    pub stage: DiagnosticStage,
    pub kind: DiagnosticKind,
    pub fallback: Fallback,
}

impl Diagnostic {
    pub fn unknown_shape(tile: TileId, error: UnknownShapeError) -> Self {
        Self {
            tile,
            stage: DiagnosticStage::Shape,
            kind: DiagnosticKind::UnknownShape(error),
            fallback: Fallback::Empty,
        }
    }

    pub fn property(tile: TileId, error: PropertyError) -> Self {
        let fallback = match error {
            PropertyError::CrossTilesetChain(_) | PropertyError::MalformedAnimMarkup(_) => {
                Fallback::Static
            }
            _ => Fallback::Ignored,
        };
        Self {
            tile,
            stage: DiagnosticStage::Schema,
            kind: DiagnosticKind::Property(error),
            fallback,
        }
    }

    pub fn animation(tile: TileId, error: AnimationCycleError) -> Self {
        Self {
            tile,
            stage: DiagnosticStage::Animation,
            kind: DiagnosticKind::Animation(error),
            fallback: Fallback::Static,
        }
    }

    /// Reported against the near half of the pair.
    pub fn slope_pairing(error: SlopePairingError) -> Self {
        Self {
            tile: error.near,
            stage: DiagnosticStage::Pairing,
            kind: DiagnosticKind::SlopePairing(error),
            fallback: Fallback::Solid,
        }
    }

    #[inline]
    fn sort_key(&self) -> (TileId, DiagnosticStage) {
        (self.tile, self.stage)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile {}: {} ({})", self.tile, self.kind, self.fallback)
    }
}

/// Ordered diagnostics of one catalog build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Sort by tile then stage. Stable, so same-stage entries keep the
    /// order in which they were found.
    pub fn finish(&mut self) {
        self.entries.sort_by_key(Diagnostic::sort_key);
    }

    /// Emit every entry as a warning.
    pub fn log(&self, tileset: &str) {
        for diagnostic in &self.entries {
            warn!(tileset, tile = diagnostic.tile, stage = ?diagnostic.stage, "{}", diagnostic);
        }
    }

    pub fn for_tile(&self, tile: TileId) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.tile == tile)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
