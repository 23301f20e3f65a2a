//! Material Effects
//!
//! Surface materials bias a grounded body's velocity. The bias is
//! recomputed from the supporting tile every tick and replaces the previous
//! one, so it stops the tick after contact ends.

use serde::{Serialize, Deserialize};

use crate::config::MotionConfig;
use crate::core::vec2::FixedVec2;
use crate::tile::definition::TileDefinition;
use crate::tile::material::MaterialFacing;

/// Velocity contribution of the tile a body stands on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEffect {
    /// Added to the body's own velocity when integrating the next tick
    pub surface_velocity: FixedVec2,
}

impl MaterialEffect {
    pub const NONE: Self = Self { surface_velocity: FixedVec2::ZERO };

    /// Effect of standing on top of `tile` (`None` when airborne).
    pub fn for_tile(tile: Option<&TileDefinition>, config: &MotionConfig) -> Self {
        Self::for_surface(tile, MaterialFacing::North, config)
    }

    /// Effect of touching `side` of `tile`. Materials act only on the side
    /// they face.
    pub fn for_surface(tile: Option<&TileDefinition>, side: MaterialFacing, config: &MotionConfig) -> Self {
        match tile.filter(|t| t.material_facing == side).and_then(|t| t.material) {
            Some(material) => Self {
                surface_velocity: FixedVec2::new(material.direction() * config.conveyor_speed, 0),
            },
            None => Self::NONE,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::FIXED_ONE;
    use crate::tile::material::MaterialKind;
    use crate::tile::shape::TileShape;

    #[test]
    fn test_conveyor_directions() {
        let config = MotionConfig::default();
        let forward = TileDefinition::new(1, TileShape::SOLID).with_material(MaterialKind::ConveyorSlow);
        let reverse = TileDefinition::new(2, TileShape::SOLID).with_material(MaterialKind::ConveyorSlowReverse);

        assert_eq!(
            MaterialEffect::for_tile(Some(&forward), &config).surface_velocity,
            FixedVec2::new(2 * FIXED_ONE, 0)
        );
        assert_eq!(
            MaterialEffect::for_tile(Some(&reverse), &config).surface_velocity,
            FixedVec2::new(-2 * FIXED_ONE, 0)
        );
    }

    #[test]
    fn test_no_material_is_noop() {
        let config = MotionConfig::default();
        let plain = TileDefinition::new(1, TileShape::SOLID);
        assert!(MaterialEffect::for_tile(Some(&plain), &config).is_none());
        assert!(MaterialEffect::for_tile(None, &config).is_none());
    }

    #[test]
    fn test_material_acts_on_facing_side_only() {
        let config = MotionConfig::default();
        let sideways = TileDefinition::new(1, TileShape::SOLID)
            .with_material(MaterialKind::ConveyorSlow)
            .with_material_facing(MaterialFacing::East);

        assert!(MaterialEffect::for_tile(Some(&sideways), &config).is_none());
        assert_eq!(
            MaterialEffect::for_surface(Some(&sideways), MaterialFacing::East, &config).surface_velocity,
            FixedVec2::new(config.conveyor_speed, 0)
        );
        assert!(MaterialEffect::for_surface(Some(&sideways), MaterialFacing::West, &config).is_none());
    }

    #[test]
    fn test_speed_is_configurable() {
        let config = MotionConfig { conveyor_speed: FIXED_ONE / 2, ..Default::default() };
        let tile = TileDefinition::new(1, TileShape::SOLID).with_material(MaterialKind::ConveyorSlowReverse);
        assert_eq!(
            MaterialEffect::for_tile(Some(&tile), &config).surface_velocity.x,
            -FIXED_ONE / 2
        );
    }
}
