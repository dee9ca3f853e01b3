//! Weapon and class records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single weapon entry.
///
/// The weapon type is not stored on the entry: it is the key of the list the
/// entry lives in (see [`WeaponsData`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeaponData {
    /// Item id referenced by unit inventories.
    pub id: String,

    /// Display name; the id is used when empty.
    #[serde(default)]
    pub name: String,

    /// Might.
    #[serde(default)]
    pub might: i32,

    /// Hit rate.
    #[serde(default)]
    pub hit: i32,

    /// Critical rate.
    #[serde(default)]
    pub crit: i32,

    /// Weight.
    #[serde(default)]
    pub weight: i32,

    /// Uses left; `None` (or `null` in JSON) means unbreakable.
    #[serde(default = "default_durability")]
    pub durability: Option<u32>,

    /// Distances this weapon can strike at.
    #[serde(default)]
    pub range: Vec<u32>,

    /// Owning unit id for personal (PRF) weapons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// An omitted durability means zero uses, matching the authoring tool.
#[allow(clippy::unnecessary_wraps)]
const fn default_durability() -> Option<u32> {
    Some(0)
}

/// All weapons, grouped by category and then by weapon type.
///
/// # Example RON
///
/// ```ron
/// WeaponsData(
///     generic: {
///         "sword": [(id: "iron_sword", name: "Iron Sword", might: 5, range: [1])],
///     },
///     prf: {
///         "sword": [(id: "rapier", name: "Rapier", might: 7, range: [1], user: Some("alvis"))],
///     },
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeaponsData {
    /// Weapons anyone of the right class may wield.
    #[serde(default)]
    pub generic: BTreeMap<String, Vec<WeaponData>>,

    /// Personal weapons bound to a single unit.
    #[serde(default)]
    pub prf: BTreeMap<String, Vec<WeaponData>>,

    /// Weapons carrying an elemental or special attribute.
    #[serde(default)]
    pub attributed: BTreeMap<String, Vec<WeaponData>>,
}

impl WeaponsData {
    /// Total number of weapon entries across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        [&self.generic, &self.prf, &self.attributed]
            .iter()
            .flat_map(|group| group.values())
            .map(Vec::len)
            .sum()
    }

    /// Whether no weapons are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One class entry. Only the first entry of a class list is authoritative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassData {
    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Weapon types this class may wield.
    #[serde(default)]
    pub weapon_types: Vec<String>,
}

/// Class records keyed by class id.
pub type ClassesData = BTreeMap<String, Vec<ClassData>>;
