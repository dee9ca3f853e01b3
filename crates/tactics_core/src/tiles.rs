//! Tile catalog: immutable tile attributes keyed by tile-type id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::{AtlasData, TileData};
use crate::error::{Result, TacticsError};

/// Tile-type identifier as stored in layer data.
///
/// Signed because authored layers use negative ids for empty cells.
pub type TileId = i32;

/// Attributes of one tile type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileType {
    /// Tile-type id.
    pub id: TileId,
    /// Human-readable name.
    pub name: String,
    /// Whether a unit may stand here.
    pub passable: bool,
    /// Movement points spent entering this tile (always ≥ 1).
    pub move_cost: u32,
    /// Avoid bonus for a unit standing here.
    pub avoid_bonus: i32,
    /// Defense bonus for a unit standing here.
    pub defense_bonus: i32,
}

impl TileType {
    /// Build a tile type from its authored record.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::InvalidTile`] if the move cost is zero.
    pub fn from_data(data: &TileData) -> Result<Self> {
        if data.move_cost == 0 {
            return Err(TacticsError::InvalidTile {
                id: data.id,
                reason: "move cost must be at least 1".to_string(),
            });
        }

        Ok(Self {
            id: data.id,
            name: data.name.clone(),
            passable: data.passable,
            move_cost: data.move_cost,
            avoid_bonus: data.avoid_bonus,
            defense_bonus: data.defense_bonus,
        })
    }
}

/// Read-only mapping from tile-type id to [`TileType`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileCatalog {
    tile_size: u32,
    tiles: HashMap<TileId, TileType>,
}

impl TileCatalog {
    /// Build a catalog from an atlas record.
    ///
    /// # Errors
    ///
    /// Returns an error if a tile is malformed or two tiles share an id.
    pub fn from_atlas(atlas: &AtlasData) -> Result<Self> {
        let mut tiles = HashMap::with_capacity(atlas.tiles.len());
        for data in &atlas.tiles {
            let tile = TileType::from_data(data)?;
            if tiles.insert(tile.id, tile).is_some() {
                return Err(TacticsError::DuplicateTileId(data.id));
            }
        }

        Ok(Self {
            tile_size: atlas.tile_size,
            tiles,
        })
    }

    /// Tile edge length in pixels, as declared by the atlas.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Look up a tile type. Unknown ids yield `None`.
    #[must_use]
    pub fn get(&self, id: TileId) -> Option<&TileType> {
        self.tiles.get(&id)
    }

    /// Check if a tile id is defined.
    #[must_use]
    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    /// Number of tile types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// All tile types, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TileType> {
        self.tiles.values()
    }
}
