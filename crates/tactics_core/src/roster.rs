//! Placed units and the roster that owns them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::StatsData;
use crate::error::{Result, TacticsError};
use crate::grid::GridPos;

/// Index of a unit inside its [`UnitRoster`]. Stable for the whole session.
pub type UnitIndex = usize;

/// Side a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// Controlled by the player.
    Player,
    /// Controlled by the opposing side.
    Enemy,
}

impl Faction {
    /// Key used for this faction in unit records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
        }
    }

    /// Both factions, in record order.
    pub const ALL: [Self; 2] = [Self::Player, Self::Enemy];
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime statistics of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Stats {
    pub hp: i32,
    pub max_hp: i32,
    pub strength: i32,
    pub magic: i32,
    pub skill: i32,
    pub speed: i32,
    pub luck: i32,
    pub defense: i32,
    pub resistance: i32,
    pub constitution: i32,
    /// Movement points.
    pub movement: u32,
}

impl From<&StatsData> for Stats {
    fn from(data: &StatsData) -> Self {
        Self {
            hp: data.hp,
            max_hp: data.hp,
            strength: data.strength,
            magic: data.magic,
            skill: data.skill,
            speed: data.speed,
            luck: data.luck,
            defense: data.defense,
            resistance: data.resistance,
            constitution: data.constitution,
            movement: data.movement,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::from(&StatsData::default())
    }
}

/// A unit placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Record key, also the owner key of personal weapons.
    pub unit_id: String,
    /// Display name.
    pub name: String,
    /// Class id.
    pub class_id: String,
    /// Class display name, falling back to the class id.
    pub class_name: String,
    /// Current level.
    pub level: u32,
    /// Side the unit fights for.
    pub faction: Faction,
    /// Cell the unit stands on.
    pub position: GridPos,
    /// Runtime statistics.
    pub stats: Stats,
    /// Carried item ids, in display order.
    pub inventory: Vec<String>,
    /// Index into `inventory` of the equipped weapon.
    pub equipped: Option<usize>,
    /// Whether the unit has acted this turn.
    pub has_moved: bool,
}

impl Unit {
    /// Id of the equipped item, if any.
    #[must_use]
    pub fn equipped_item(&self) -> Option<&str> {
        self.equipped
            .and_then(|index| self.inventory.get(index))
            .map(String::as_str)
    }

    /// Check if the unit can still be given orders this turn.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.faction == Faction::Player && !self.has_moved
    }
}

/// Ordered collection of placed units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnitRoster {
    units: Vec<Unit>,
}

impl UnitRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit, rejecting it if its cell is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::CellOccupied`] if another unit stands on the
    /// same cell.
    pub fn push(&mut self, unit: Unit) -> Result<UnitIndex> {
        if let Some(occupant) = self.unit_at(unit.position) {
            return Err(TacticsError::CellOccupied {
                x: unit.position.x,
                y: unit.position.y,
                occupant,
            });
        }
        self.units.push(unit);
        Ok(self.units.len() - 1)
    }

    /// Unit standing on a cell.
    ///
    /// Linear scan over the roster.
    #[must_use]
    pub fn unit_at(&self, pos: GridPos) -> Option<UnitIndex> {
        self.units.iter().position(|unit| unit.position == pos)
    }

    /// Relocate a unit. The caller is responsible for validating the target.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::UnknownUnit`] for an invalid index.
    pub fn move_unit(&mut self, index: UnitIndex, pos: GridPos) -> Result<()> {
        self.get_mut(index)?.position = pos;
        Ok(())
    }

    /// Mark a unit as having acted this turn.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::UnknownUnit`] for an invalid index.
    pub fn mark_moved(&mut self, index: UnitIndex) -> Result<()> {
        self.get_mut(index)?.has_moved = true;
        Ok(())
    }

    /// Reset the moved flag of every unit of a faction. Returns how many
    /// units were reset.
    pub fn clear_moved(&mut self, faction: Faction) -> usize {
        let mut cleared = 0;
        for unit in self.units.iter_mut().filter(|u| u.faction == faction) {
            if unit.has_moved {
                unit.has_moved = false;
                cleared += 1;
            }
        }
        tracing::debug!(%faction, cleared, "Cleared moved flags");
        cleared
    }

    /// Look up a unit.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::UnknownUnit`] for an invalid index.
    pub fn get(&self, index: UnitIndex) -> Result<&Unit> {
        self.units.get(index).ok_or(TacticsError::UnknownUnit(index))
    }

    /// Look up a unit mutably.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::UnknownUnit`] for an invalid index.
    pub fn get_mut(&mut self, index: UnitIndex) -> Result<&mut Unit> {
        self.units
            .get_mut(index)
            .ok_or(TacticsError::UnknownUnit(index))
    }

    /// All units with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (UnitIndex, &Unit)> {
        self.units.iter().enumerate()
    }

    /// Indices of the units of one faction.
    pub fn indices_of(&self, faction: Faction) -> impl Iterator<Item = UnitIndex> + '_ {
        self.iter()
            .filter(move |(_, unit)| unit.faction == faction)
            .map(|(index, _)| index)
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
