//! Error types for the tactical core.

use thiserror::Error;

use crate::roster::UnitIndex;
use crate::tiles::TileId;

/// Result type alias using [`TacticsError`].
pub type Result<T> = std::result::Result<T, TacticsError>;

/// Top-level error type for all tactical core errors.
#[derive(Debug, Error)]
pub enum TacticsError {
    /// A cell lookup fell outside the grid.
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },

    /// Map dimensions are unusable.
    #[error("Invalid map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// A layer does not cover the grid exactly.
    #[error("Layer '{layer}' has {actual} cells, expected {expected}")]
    LayerSizeMismatch {
        /// Layer name.
        layer: String,
        /// width × height.
        expected: usize,
        /// Number of ids in the layer.
        actual: usize,
    },

    /// A map declared no layers at all.
    #[error("Map '{0}' has no tile layers")]
    NoLayers(String),

    /// Tile definition is malformed.
    #[error("Invalid tile {id}: {reason}")]
    InvalidTile {
        /// Tile type id.
        id: TileId,
        /// What is wrong with it.
        reason: String,
    },

    /// Two tile definitions share an id.
    #[error("Duplicate tile id {0}")]
    DuplicateTileId(TileId),

    /// Two units were placed on the same cell.
    #[error("Cell ({x}, {y}) is already occupied by unit {occupant}")]
    CellOccupied {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// Index of the unit already there.
        occupant: UnitIndex,
    },

    /// Roster index does not exist.
    #[error("Unit index {0} is not in the roster")]
    UnknownUnit(UnitIndex),

    /// Data file parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the document that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Recording format version does not match this build.
    #[error("Recording version mismatch: expected {expected}, got {found}")]
    RecordingVersion {
        /// Version this build writes.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Playback ended in a different state than was recorded.
    #[error("Playback diverged: recorded hash {recorded:#018x}, replayed hash {replayed:#018x}")]
    PlaybackDiverged {
        /// Hash stored in the recording.
        recorded: u64,
        /// Hash reached by playback.
        replayed: u64,
    },

    /// Invalid session state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
