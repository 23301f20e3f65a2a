//! Tileset Schema Normalization
//!
//! Tilesets arrive as a list of tiles, each with a `properties` list of
//! name/value pairs. Two generations of that schema exist:
//!
//! ```text
//! ┌──────────────┬───────────────────────────┬──────────────────────────────┐
//! │ concept      │ legacy                    │ current                      │
//! ├──────────────┼───────────────────────────┼──────────────────────────────┤
//! │ shape        │ SHAPE = SOLID, SLOPE-H    │ shape = solid, slope-h       │
//! │ animation    │ ANIM = <anim ms nextx ../>│ logic=anim, logic_arg,       │
//! │              │                           │ next_x, next_y or framecount │
//! │ one-way wall │ ONEWAY_WALL               │ oneway_wall                  │
//! └──────────────┴───────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Both normalize to the same [`TileDefinition`]s. Bad values are recorded
//! as diagnostics and the affected field falls back; only structural
//! problems (zero columns, duplicate or out-of-range ids) fail the load.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::tile::definition::{TileDefinition, TileId, TilesetLayout};
use crate::tile::diagnostics::{Diagnostic, Diagnostics, Fallback};
use crate::tile::error::{LoadError, PropertyError};
use crate::tile::markup::parse_anim_markup;
use crate::tile::material::{LogicKind, MaterialFacing, MaterialKind};
use crate::tile::shape::TileShape;

/// A whole tileset document as read from disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TilesetSource {
    #[serde(default)]
    pub name: String,
    pub columns: u32,
    #[serde(rename = "tilecount")]
    pub tile_count: u32,
    #[serde(default)]
    pub tiles: Vec<RawTile>,
}

/// One `<tile>` entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawTile {
    pub id: TileId,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
}

/// One `<property>` entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawProperty {
    pub name: String,
    /// Type marker (`string` when absent, `int` for integers)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: serde_json::Value,
}

impl TilesetSource {
    pub fn new(name: impl Into<String>, columns: u32, tile_count: u32) -> Self {
        Self { name: name.into(), columns, tile_count, tiles: Vec::new() }
    }

    /// Parse a JSON tileset document.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_tile(mut self, tile: RawTile) -> Self {
        self.tiles.push(tile);
        self
    }

    pub fn layout(&self) -> TilesetLayout {
        TilesetLayout::new(self.name.clone(), self.columns, self.tile_count)
    }
}

impl RawTile {
    pub fn new(id: TileId) -> Self {
        Self { id, properties: Vec::new() }
    }

    /// Add a string property.
    pub fn prop(mut self, name: &str, value: &str) -> Self {
        self.properties.push(RawProperty {
            name: name.to_string(),
            kind: None,
            value: serde_json::Value::String(value.to_string()),
        });
        self
    }

    /// Add an `int`-typed property.
    pub fn int_prop(mut self, name: &str, value: i64) -> Self {
        self.properties.push(RawProperty {
            name: name.to_string(),
            kind: Some("int".to_string()),
            value: serde_json::Value::from(value),
        });
        self
    }
}

impl RawProperty {
    fn is_int_typed(&self) -> bool {
        self.kind.as_deref().is_some_and(|k| k.eq_ignore_ascii_case("int"))
    }

    /// Value rendered as text regardless of its JSON type.
    fn text(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn integer(&self) -> Result<i64, PropertyError> {
        let invalid = || PropertyError::InvalidInteger {
            name: self.name.clone(),
            value: self.text(),
        };
        match &self.value {
            serde_json::Value::Number(n) if self.is_int_typed() || n.is_i64() => {
                n.as_i64().ok_or_else(invalid)
            }
            _ => self.text().trim().parse::<i64>().map_err(|_| invalid()),
        }
    }

    fn unsigned(&self) -> Result<u32, PropertyError> {
        let value = self.integer()?;
        u32::try_from(value).map_err(|_| PropertyError::InvalidInteger {
            name: self.name.clone(),
            value: self.text(),
        })
    }

    fn signed(&self) -> Result<i32, PropertyError> {
        let value = self.integer()?;
        i32::try_from(value).map_err(|_| PropertyError::InvalidInteger {
            name: self.name.clone(),
            value: self.text(),
        })
    }
}

/// Normalize a tileset into a dense definition table.
///
/// Every id below `tile_count` gets a definition; tiles the document does
/// not mention are empty.
pub fn normalize(
    source: &TilesetSource,
) -> Result<(TilesetLayout, Vec<TileDefinition>, Diagnostics), LoadError> {
    if source.columns == 0 {
        return Err(LoadError::ZeroColumns);
    }

    let layout = source.layout();
    let mut diagnostics = Diagnostics::new();
    let mut listed: BTreeMap<TileId, TileDefinition> = BTreeMap::new();

    for raw in &source.tiles {
        if !layout.contains(raw.id) {
            return Err(LoadError::TileIdOutOfRange { id: raw.id, tile_count: layout.tile_count });
        }
        if listed.contains_key(&raw.id) {
            return Err(LoadError::DuplicateTileId(raw.id));
        }
        let definition = normalize_tile(raw, &layout, &mut diagnostics);
        listed.insert(raw.id, definition);
    }

    let definitions = (0..layout.tile_count)
        .map(|id| {
            listed
                .remove(&id)
                .unwrap_or_else(|| TileDefinition::new(id, TileShape::EMPTY))
        })
        .collect();

    Ok((layout, definitions, diagnostics))
}

fn normalize_tile(
    raw: &RawTile,
    layout: &TilesetLayout,
    diagnostics: &mut Diagnostics,
) -> TileDefinition {
    let id = raw.id;
    let mut tile = TileDefinition::new(id, TileShape::EMPTY);
    let mut force_static = false;

    let report = |error: PropertyError, diagnostics: &mut Diagnostics| {
        diagnostics.push(Diagnostic::property(id, error));
    };

    for property in &raw.properties {
        let name = property.name.trim().to_ascii_lowercase();
        match name.as_str() {
            "shape" => match TileShape::parse(&property.text()) {
                Ok(shape) => tile.shape = shape,
                Err(error) => {
                    tile.shape = TileShape::EMPTY;
                    diagnostics.push(Diagnostic::unknown_shape(id, error));
                }
            },
            "material" => {
                let text = property.text();
                if text.trim().is_empty() {
                    continue;
                }
                match MaterialKind::parse(&text) {
                    Some(material) => tile.material = Some(material),
                    None => report(PropertyError::UnknownMaterial(text), diagnostics),
                }
            }
            "material_facing" => {
                let text = property.text();
                match MaterialFacing::parse(&text) {
                    Some(facing) => tile.material_facing = facing,
                    None => report(PropertyError::UnknownFacing(text), diagnostics),
                }
            }
            "logic" => {
                let text = property.text();
                if text.trim().is_empty() {
                    continue;
                }
                match LogicKind::parse(&text) {
                    Some(logic) => tile.logic = Some(logic),
                    None => report(PropertyError::UnknownLogic(text), diagnostics),
                }
            }
            "logic_arg" => match property.unsigned() {
                Ok(ms) => tile.logic_arg = ms,
                Err(error) => report(error, diagnostics),
            },
            "next_x" => match property.signed() {
                Ok(dx) => tile.next_x = dx,
                Err(error) => report(error, diagnostics),
            },
            "next_y" => match property.signed() {
                Ok(dy) => tile.next_y = dy,
                Err(error) => report(error, diagnostics),
            },
            "framecount" => match property.unsigned() {
                Ok(count) => tile.framecount = count,
                Err(error) => report(error, diagnostics),
            },
            "framedelay" => match property.unsigned() {
                Ok(delay) => tile.framedelay = delay,
                Err(error) => report(error, diagnostics),
            },
            "next_tileset" => {
                let target = property.text();
                let target = target.trim();
                if !target.is_empty() && target != layout.name {
                    force_static = true;
                    report(PropertyError::CrossTilesetChain(target.to_string()), diagnostics);
                }
            }
            "anim" => match parse_anim_markup(&property.text()) {
                Ok(markup) => {
                    tile.logic = Some(LogicKind::Anim);
                    tile.logic_arg = markup.ms;
                    tile.next_x = markup.next_x;
                    tile.next_y = markup.next_y;
                    if let Some(target) = markup.tileset.filter(|t| *t != layout.name) {
                        force_static = true;
                        report(PropertyError::CrossTilesetChain(target), diagnostics);
                    }
                }
                Err(error) => {
                    // Any markup failure leaves the tile without animation
                    force_static = true;
                    let mut diagnostic = Diagnostic::property(id, error);
                    diagnostic.fallback = Fallback::Static;
                    diagnostics.push(diagnostic);
                }
            },
            _ => report(
                PropertyError::UnknownProperty {
                    name: property.name.clone(),
                    value: property.text(),
                },
                diagnostics,
            ),
        }
    }

    if force_static {
        tile.make_static();
    }
    tile
}
