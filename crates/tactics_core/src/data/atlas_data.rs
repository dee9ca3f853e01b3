//! Tile atlas records.

use serde::{Deserialize, Serialize};

use crate::tiles::TileId;

/// One tile type as authored in an atlas file.
///
/// # Example RON
///
/// ```ron
/// TileData(
///     id: 3,
///     name: "Forest",
///     texture: "assets/tiles/forest.png",
///     passable: true,
///     move_cost: 2,
///     avoid_bonus: 20,
///     defense_bonus: 1,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileData {
    /// Tile type id referenced by layer data.
    #[serde(default)]
    pub id: TileId,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Texture path, only meaningful to the renderer.
    #[serde(default)]
    pub texture: String,

    /// Whether units may stand on this tile.
    #[serde(default = "default_passable")]
    pub passable: bool,

    /// Movement points spent entering this tile.
    #[serde(default = "default_move_cost")]
    pub move_cost: u32,

    /// Avoid bonus granted to a unit standing here.
    #[serde(default)]
    pub avoid_bonus: i32,

    /// Defense bonus granted to a unit standing here.
    #[serde(default)]
    pub defense_bonus: i32,
}

/// Default passability for tiles without an explicit flag.
const fn default_passable() -> bool {
    true
}

/// Default movement cost for tiles without an explicit cost.
const fn default_move_cost() -> u32 {
    1
}

/// Default tile edge length in pixels.
pub(crate) const fn default_tile_size() -> u32 {
    32
}

/// A complete tile atlas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasData {
    /// Tile edge length in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// All tile types of this atlas.
    #[serde(default)]
    pub tiles: Vec<TileData>,
}

impl AtlasData {
    /// Find a tile definition by id.
    #[must_use]
    pub fn get_tile(&self, id: TileId) -> Option<&TileData> {
        self.tiles.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let atlas: AtlasData = ron::from_str("(tiles: [(id: 4, name: \"Plains\")])").unwrap();
        assert_eq!(atlas.tile_size, 32);

        let tile = atlas.get_tile(4).unwrap();
        assert!(tile.passable);
        assert_eq!(tile.move_cost, 1);
        assert_eq!(tile.avoid_bonus, 0);
        assert!(atlas.get_tile(5).is_none());
    }
}
