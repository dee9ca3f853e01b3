//! Map records: dimensions, tile layers and unit placements.

use serde::{Deserialize, Serialize};

use super::atlas_data::default_tile_size;
use crate::roster::Faction;
use crate::tiles::TileId;

/// One stacked tile layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerData {
    /// Layer name, shown in tools.
    #[serde(default)]
    pub name: String,

    /// Whether the renderer draws this layer.
    #[serde(default = "default_visible")]
    pub visible: bool,

    /// Tile ids in row-major order.
    #[serde(default)]
    pub data: Vec<TileId>,
}

/// Default layer visibility.
const fn default_visible() -> bool {
    true
}

/// A unit placed on the map at load time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapUnitData {
    /// Side the unit fights for.
    #[serde(alias = "type")]
    pub faction: Faction,

    /// Key into the unit records of that faction.
    #[serde(default)]
    pub unit_id: String,

    /// Sprite path, only meaningful to the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,

    /// Starting column.
    #[serde(default)]
    pub x: i64,

    /// Starting row.
    #[serde(default)]
    pub y: i64,
}

/// A complete authored map.
///
/// # Example RON
///
/// ```ron
/// MapData(
///     name: "Prologue",
///     music: Some("assets/music/prologue.ogg"),
///     width: 3,
///     height: 2,
///     atlas: Some("atlas.ron"),
///     layers: [(name: "ground", data: [1, 1, 1, 1, 2, 1])],
///     units: [(faction: player, unit_id: "alvis", x: 0, y: 0)],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapData {
    /// Display name of the map.
    #[serde(default = "default_map_name")]
    pub name: String,

    /// Background music path, handed to the audio collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,

    /// Width in cells.
    #[serde(default)]
    pub width: u32,

    /// Height in cells.
    #[serde(default)]
    pub height: u32,

    /// Tile edge length in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Atlas reference, resolved by the loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atlas: Option<String>,

    /// Stacked tile layers, bottom first.
    #[serde(default)]
    pub layers: Vec<LayerData>,

    /// Units placed at load time.
    #[serde(default)]
    pub units: Vec<MapUnitData>,
}

fn default_map_name() -> String {
    "Untitled Map".to_string()
}

impl MapData {
    /// Number of cells every layer must cover.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validate internal consistency of the map record.
    ///
    /// Checks for:
    /// - Non-zero dimensions
    /// - Every layer covering the grid exactly
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.width == 0 || self.height == 0 {
            errors.push(format!(
                "Map '{}' has invalid dimensions {}x{}",
                self.name, self.width, self.height
            ));
        }

        if self.layers.is_empty() {
            errors.push(format!("Map '{}' has no layers", self.name));
        }

        for layer in &self.layers {
            if layer.data.len() != self.cell_count() {
                errors.push(format!(
                    "Layer '{}' has {} cells, expected {}",
                    layer.name,
                    layer.data.len(),
                    self.cell_count()
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_map() -> MapData {
        MapData {
            name: "test".to_string(),
            music: None,
            width: 2,
            height: 2,
            tile_size: 32,
            atlas: None,
            layers: vec![LayerData {
                name: "ground".to_string(),
                visible: true,
                data: vec![1, 1, 1, 1],
            }],
            units: vec![],
        }
    }

    #[test]
    fn test_validate_valid_map() {
        let map = create_test_map();
        assert!(map.validate().is_empty());
    }

    #[test]
    fn test_validate_short_layer() {
        let mut map = create_test_map();
        map.layers[0].data.pop();

        let errors = map.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("expected 4"));
    }

    #[test]
    fn test_unit_placement_from_ron() {
        let unit: MapUnitData =
            ron::from_str("(faction: enemy, unit_id: \"brigand\", x: 3, y: 1)").unwrap();
        assert_eq!(unit.faction, Faction::Enemy);
        assert_eq!(unit.unit_id, "brigand");
        assert!(unit.sprite.is_none());
    }

    #[test]
    fn test_defaults_from_ron() {
        let map: MapData = ron::from_str("(width: 1, height: 1)").unwrap();
        assert_eq!(map.name, "Untitled Map");
        assert_eq!(map.tile_size, 32);
        assert!(map.music.is_none());
    }
}
