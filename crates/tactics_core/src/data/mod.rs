//! Authoring records consumed by the core.
//!
//! This module contains pure data structures mirroring the map, atlas,
//! unit, weapon and class records produced by the content tools. All
//! structs derive serde and are deserialized from RON or JSON.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `tactics_tools`.

mod atlas_data;
mod equipment_data;
mod map_data;
mod unit_data;

pub use atlas_data::{AtlasData, TileData};
pub use equipment_data::{ClassData, ClassesData, WeaponData, WeaponsData};
pub use map_data::{LayerData, MapData, MapUnitData};
pub use unit_data::{StatsData, UnitData, UnitsData};
