//! Rectangular tile grid with stacked layers.
//!
//! The grid answers "which tile type occupies cell (x, y)" by consulting its
//! layers top-down against the [`TileCatalog`]. Ids missing from the catalog
//! are treated as empty cells.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::MapData;
use crate::error::{Result, TacticsError};
use crate::tiles::{TileCatalog, TileId, TileType};

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    /// Column, growing to the right.
    pub x: u32,
    /// Row, growing downwards.
    pub y: u32,
}

impl GridPos {
    /// Create a grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Neighbouring cells in the four cardinal directions.
    ///
    /// Cells left of column 0 or above row 0 are skipped; the caller still has
    /// to check the far edges against the grid.
    pub fn neighbors(self) -> impl Iterator<Item = GridPos> {
        const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
        DIRECTIONS.into_iter().filter_map(move |(dx, dy)| {
            let x = u32::try_from(i64::from(self.x) + dx).ok()?;
            let y = u32::try_from(i64::from(self.y) + dy).ok()?;
            Some(GridPos { x, y })
        })
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One row-major layer of tile ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Layer name.
    pub name: String,
    /// Whether the renderer draws this layer. Gameplay ignores it.
    pub visible: bool,
    data: Vec<TileId>,
}

impl Layer {
    /// Tile id stored at a row-major index.
    #[must_use]
    pub fn tile_id(&self, index: usize) -> Option<TileId> {
        self.data.get(index).copied()
    }

    /// Raw tile ids in row-major order.
    #[must_use]
    pub fn data(&self) -> &[TileId] {
        &self.data
    }
}

/// The loaded map: dimensions, layers and the catalog interpreting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    name: String,
    music: Option<String>,
    width: u32,
    height: u32,
    tile_size: u32,
    layers: Vec<Layer>,
    catalog: TileCatalog,
}

impl GridMap {
    /// Build a grid from a map record and the catalog of its atlas.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero, the map has no layers,
    /// or a layer does not contain exactly `width × height` ids.
    pub fn from_data(map: &MapData, catalog: TileCatalog) -> Result<Self> {
        if map.width == 0 || map.height == 0 {
            return Err(TacticsError::InvalidDimensions {
                width: map.width,
                height: map.height,
            });
        }
        if map.layers.is_empty() {
            return Err(TacticsError::NoLayers(map.name.clone()));
        }

        let expected = map.cell_count();
        let mut layers = Vec::with_capacity(map.layers.len());
        for layer in &map.layers {
            if layer.data.len() != expected {
                return Err(TacticsError::LayerSizeMismatch {
                    layer: layer.name.clone(),
                    expected,
                    actual: layer.data.len(),
                });
            }
            layers.push(Layer {
                name: layer.name.clone(),
                visible: layer.visible,
                data: layer.data.clone(),
            });
        }

        let grid = Self {
            name: map.name.clone(),
            music: map.music.clone(),
            width: map.width,
            height: map.height,
            tile_size: map.tile_size,
            layers,
            catalog,
        };

        let unknown = grid.unknown_tile_count();
        if unknown > 0 {
            tracing::debug!(map = %grid.name, unknown, "Layer cells reference unknown tile ids");
        }

        Ok(grid)
    }

    /// Map display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Background music path for the audio collaborator.
    #[must_use]
    pub fn music(&self) -> Option<&str> {
        self.music.as_deref()
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in cells.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Tile edge length in pixels, for the renderer.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// The catalog interpreting this grid's ids.
    #[must_use]
    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Layers, bottom first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Check if a cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Clamp signed coordinates into the grid.
    #[must_use]
    pub fn clamp(&self, x: i64, y: i64) -> GridPos {
        let max_x = i64::from(self.width.saturating_sub(1));
        let max_y = i64::from(self.height.saturating_sub(1));
        GridPos {
            x: x.clamp(0, max_x) as u32,
            y: y.clamp(0, max_y) as u32,
        }
    }

    /// Row-major index of a cell.
    #[inline]
    fn index(&self, pos: GridPos) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }

    fn check_bounds(&self, pos: GridPos) -> Result<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(TacticsError::OutOfBounds {
                x: i64::from(pos.x),
                y: i64::from(pos.y),
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Tile type occupying a cell.
    ///
    /// Layers are consulted top-down and the first known id wins. Returns
    /// `Ok(None)` when no layer holds a known id at that cell.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::OutOfBounds`] if the cell is outside the grid.
    pub fn tile_at(&self, pos: GridPos) -> Result<Option<&TileType>> {
        self.check_bounds(pos)?;
        let index = self.index(pos);
        Ok(self
            .layers
            .iter()
            .rev()
            .filter_map(|layer| layer.tile_id(index))
            .find_map(|id| self.catalog.get(id)))
    }

    /// Per-layer tile types of a cell, bottom first. Unknown ids are `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::OutOfBounds`] if the cell is outside the grid.
    pub fn layer_tiles(&self, pos: GridPos) -> Result<Vec<Option<&TileType>>> {
        self.check_bounds(pos)?;
        let index = self.index(pos);
        Ok(self
            .layers
            .iter()
            .map(|layer| layer.tile_id(index).and_then(|id| self.catalog.get(id)))
            .collect())
    }

    /// Check if a unit may stand on a cell.
    ///
    /// Out-of-bounds and empty cells are not passable.
    #[must_use]
    pub fn is_passable(&self, pos: GridPos) -> bool {
        matches!(self.tile_at(pos), Ok(Some(tile)) if tile.passable)
    }

    /// Movement cost of entering a cell, `None` if it cannot be entered.
    #[must_use]
    pub fn move_cost(&self, pos: GridPos) -> Option<u32> {
        match self.tile_at(pos) {
            Ok(Some(tile)) if tile.passable => Some(tile.move_cost),
            _ => None,
        }
    }

    /// Number of layer cells holding an id the catalog does not know.
    #[must_use]
    pub fn unknown_tile_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| layer.data.iter())
            .filter(|id| !self.catalog.contains(**id))
            .count()
    }
}
