//! # Tactics Core
//!
//! Tactical grid and unit-action core for a turn-based strategy game.
//!
//! This crate contains **only** game rules:
//! - No rendering
//! - No audio
//! - No file IO apart from input recordings
//!
//! Everything arrives as already-parsed records (see [`data`]) and leaves as
//! read-only views for a renderer (see [`session::SessionView`]).
//!
//! ## Crate Structure
//!
//! - [`tiles`] / [`grid`] - Tile catalog and layered grid
//! - [`roster`] - Placed units
//! - [`equipment`] - Weapons, classes and wieldability
//! - [`range`] - Movement and attack ranges
//! - [`action`] - The unit action state machine
//! - [`session`] - Map loading and input routing
//! - [`recording`] - Input recordings for playback

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action;
pub mod battlefield;
pub mod data;
pub mod equipment;
pub mod error;
pub mod grid;
pub mod input;
pub mod range;
pub mod recording;
pub mod roster;
pub mod rules;
pub mod session;
pub mod tiles;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::{
        ActionMenuRow, ActionState, ActionStateMachine, DropChoice, Feedback, InventorySnapshot,
    };
    pub use crate::battlefield::Battlefield;
    pub use crate::equipment::{
        ClassDefinition, ClassLookup, EquipmentCatalog, WeaponCategory, WeaponDefinition,
    };
    pub use crate::error::{Result, TacticsError};
    pub use crate::grid::{GridMap, GridPos};
    pub use crate::input::InputEvent;
    pub use crate::range::{MovementRule, RangeSet, Ranges, ThreatReach};
    pub use crate::recording::InputRecording;
    pub use crate::roster::{Faction, Stats, Unit, UnitIndex, UnitRoster};
    pub use crate::rules::Rules;
    pub use crate::session::{InventoryRow, MapSession, MenuView, SessionView};
    pub use crate::tiles::{TileCatalog, TileId, TileType};
}
