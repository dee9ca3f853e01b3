//! Unit records for data-driven unit definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unit records keyed by faction name (`"player"`, `"enemy"`), then unit id.
pub type UnitsData = BTreeMap<String, BTreeMap<String, UnitData>>;

/// Base statistics of a unit.
///
/// Every field falls back to the engine default when omitted, so partially
/// authored records still produce a usable unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsData {
    /// Maximum hit points.
    #[serde(default = "default_hp")]
    pub hp: i32,
    /// Strength.
    #[serde(default = "default_stat", rename = "str")]
    pub strength: i32,
    /// Magic.
    #[serde(default = "default_stat", rename = "mag")]
    pub magic: i32,
    /// Skill.
    #[serde(default = "default_stat", rename = "skl")]
    pub skill: i32,
    /// Speed.
    #[serde(default = "default_stat", rename = "spd")]
    pub speed: i32,
    /// Luck.
    #[serde(default = "default_stat", rename = "lck")]
    pub luck: i32,
    /// Defense.
    #[serde(default = "default_stat", rename = "def")]
    pub defense: i32,
    /// Resistance.
    #[serde(default = "default_stat", rename = "res")]
    pub resistance: i32,
    /// Constitution.
    #[serde(default = "default_stat", rename = "con")]
    pub constitution: i32,
    /// Movement points.
    #[serde(default = "default_stat", rename = "mov")]
    pub movement: u32,
}

const fn default_hp() -> i32 {
    20
}

// Shared by the signed stats and `mov`.
fn default_stat<T: From<u8>>() -> T {
    T::from(5)
}

impl Default for StatsData {
    fn default() -> Self {
        Self {
            hp: default_hp(),
            strength: default_stat(),
            magic: default_stat(),
            skill: default_stat(),
            speed: default_stat(),
            luck: default_stat(),
            defense: default_stat(),
            resistance: default_stat(),
            constitution: default_stat(),
            movement: default_stat(),
        }
    }
}

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     name: "Alvis",
///     class: "lord",
///     level: 1,
///     stats: (hp: 18, str: 6, mov: 5),
///     current_inventory: ["rapier", "vulnerary"],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitData {
    /// Display name.
    #[serde(default = "default_unit_name")]
    pub name: String,

    /// Class id, resolved against the class records.
    #[serde(default)]
    pub class: String,

    /// Current level.
    #[serde(default = "default_level")]
    pub level: u32,

    /// Base statistics.
    #[serde(default)]
    pub stats: StatsData,

    /// Item ids carried into the map, in display order.
    #[serde(default)]
    pub current_inventory: Vec<String>,
}

fn default_unit_name() -> String {
    "Unknown".to_string()
}

const fn default_level() -> u32 {
    1
}

impl UnitData {
    /// Check if the unit carries an item.
    #[must_use]
    pub fn carries(&self, item_id: &str) -> bool {
        self.current_inventory.iter().any(|i| i == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_stats_use_defaults() {
        let unit: UnitData = ron::from_str(
            "(name: \"Alvis\", class: \"lord\", stats: (hp: 18, str: 7, mov: 6))",
        )
        .unwrap();

        assert_eq!(unit.level, 1);
        assert_eq!(unit.stats.hp, 18);
        assert_eq!(unit.stats.strength, 7);
        assert_eq!(unit.stats.movement, 6);
        assert_eq!(unit.stats.speed, 5);
        assert!(unit.current_inventory.is_empty());
    }

    #[test]
    fn test_carries() {
        let unit: UnitData =
            ron::from_str("(current_inventory: [\"iron_sword\", \"vulnerary\"])").unwrap();
        assert_eq!(unit.name, "Unknown");
        assert!(unit.carries("vulnerary"));
        assert!(!unit.carries("iron_axe"));
    }
}
