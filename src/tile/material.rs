//! Material and logic tags.

use serde::{Serialize, Deserialize};

/// Surface material of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MaterialKind {
    /// Carries grounded bodies in +x
    ConveyorSlow = 0,
    /// Carries grounded bodies in -x
    ConveyorSlowReverse = 1,
}

impl MaterialKind {
    pub const fn label(self) -> &'static str {
        match self {
            MaterialKind::ConveyorSlow => "conveyor_slow",
            MaterialKind::ConveyorSlowReverse => "conveyor_slow_reverse",
        }
    }

    /// Case-insensitive parse. `None` for unknown materials.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "conveyor_slow" => Some(MaterialKind::ConveyorSlow),
            "conveyor_slow_reverse" => Some(MaterialKind::ConveyorSlowReverse),
            _ => None,
        }
    }

    /// Sign applied to the configured conveyor speed.
    #[inline]
    pub const fn direction(self) -> i32 {
        match self {
            MaterialKind::ConveyorSlow => 1,
            MaterialKind::ConveyorSlowReverse => -1,
        }
    }
}

/// Side of a tile its material acts on.
///
/// A conveyor carries bodies only across the surface it faces; the default
/// is the top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MaterialFacing {
    #[default]
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl MaterialFacing {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "north" => Some(MaterialFacing::North),
            "east" => Some(MaterialFacing::East),
            "south" => Some(MaterialFacing::South),
            "west" => Some(MaterialFacing::West),
            _ => None,
        }
    }
}

/// Per-tile behaviour tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LogicKind {
    Anim = 0,
}

impl LogicKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "anim" => Some(LogicKind::Anim),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_parse() {
        assert_eq!(MaterialKind::parse("conveyor_slow"), Some(MaterialKind::ConveyorSlow));
        assert_eq!(
            MaterialKind::parse("CONVEYOR_SLOW_REVERSE"),
            Some(MaterialKind::ConveyorSlowReverse)
        );
        assert_eq!(MaterialKind::parse("ice"), None);
    }

    #[test]
    fn test_material_direction() {
        assert_eq!(MaterialKind::ConveyorSlow.direction(), 1);
        assert_eq!(MaterialKind::ConveyorSlowReverse.direction(), -1);
    }

    #[test]
    fn test_facing_parse() {
        assert_eq!(MaterialFacing::parse("north"), Some(MaterialFacing::North));
        assert_eq!(MaterialFacing::parse(" WEST "), Some(MaterialFacing::West));
        assert_eq!(MaterialFacing::parse("up"), None);
        assert_eq!(MaterialFacing::default(), MaterialFacing::North);
    }

    #[test]
    fn test_logic_parse() {
        assert_eq!(LogicKind::parse("ANIM"), Some(LogicKind::Anim));
        assert_eq!(LogicKind::parse("spawn"), None);
    }
}
