//! Weapon and class definitions, and the wieldability rule joining them.
//!
//! A weapon is wieldable by a unit when:
//! - it is a personal weapon whose owner is that unit (class is ignored), or
//! - it has no owner and the unit's class lists the weapon's type.
//!
//! Unknown weapons and unknown classes are never wieldable.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::data::{ClassesData, WeaponData, WeaponsData};
use crate::roster::Unit;

/// Which table a weapon was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponCategory {
    /// Ordinary weapons.
    Generic,
    /// Personal weapons bound to one unit.
    Prf,
    /// Weapons with a special attribute.
    Attributed,
}

impl WeaponCategory {
    /// Lookup order when the same id appears in several tables.
    pub const LOOKUP_ORDER: [Self; 3] = [Self::Generic, Self::Prf, Self::Attributed];
}

/// How a unit's class is found when checking wieldability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassLookup {
    /// Match the unit's class id against the class record key.
    #[default]
    ById,
    /// Match the unit's class display name against each record's name.
    ByDisplayName,
}

/// A resolved weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    /// Item id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Weapon type, matched against class permissions.
    pub weapon_type: String,
    /// Might.
    pub might: i32,
    /// Hit rate.
    pub hit: i32,
    /// Critical rate.
    pub crit: i32,
    /// Weight.
    pub weight: i32,
    /// Uses left, `None` for unbreakable.
    pub durability: Option<u32>,
    /// Distances this weapon can strike at.
    pub range: BTreeSet<u32>,
    /// Owning unit id of a personal weapon.
    pub owner: Option<String>,
    /// Table the weapon came from.
    pub category: WeaponCategory,
}

impl WeaponDefinition {
    fn from_data(data: &WeaponData, weapon_type: &str, category: WeaponCategory) -> Self {
        let name = if data.name.is_empty() {
            data.id.clone()
        } else {
            data.name.clone()
        };
        // Only personal weapons honour an owner, and an empty owner is no owner.
        let owner = match category {
            WeaponCategory::Prf => data.user.clone().filter(|user| !user.is_empty()),
            WeaponCategory::Generic | WeaponCategory::Attributed => None,
        };

        Self {
            id: data.id.clone(),
            name,
            weapon_type: weapon_type.to_string(),
            might: data.might,
            hit: data.hit,
            crit: data.crit,
            weight: data.weight,
            durability: data.durability,
            range: data.range.iter().copied().collect(),
            owner,
            category,
        }
    }

    /// Zero-stat stand-in for an item id with no weapon record.
    #[must_use]
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            weapon_type: String::new(),
            might: 0,
            hit: 0,
            crit: 0,
            weight: 0,
            durability: Some(0),
            range: BTreeSet::new(),
            owner: None,
            category: WeaponCategory::Generic,
        }
    }
}

/// A resolved class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Class id.
    pub id: String,
    /// Display name, the id when the record has none.
    pub name: String,
    /// Weapon types members of this class may wield.
    pub weapon_types: BTreeSet<String>,
}

/// Read-only weapon and class catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentCatalog {
    weapons: HashMap<String, WeaponDefinition>,
    classes: BTreeMap<String, ClassDefinition>,
    lookup: ClassLookup,
}

impl EquipmentCatalog {
    /// Build the catalog from weapon and class records.
    ///
    /// When an id is declared more than once the first declaration wins,
    /// scanning generic, then personal, then attributed weapons. Class
    /// records with an empty entry list are skipped.
    #[must_use]
    pub fn from_data(weapons: &WeaponsData, classes: &ClassesData, lookup: ClassLookup) -> Self {
        let mut catalog = HashMap::with_capacity(weapons.len());
        for category in WeaponCategory::LOOKUP_ORDER {
            let table = match category {
                WeaponCategory::Generic => &weapons.generic,
                WeaponCategory::Prf => &weapons.prf,
                WeaponCategory::Attributed => &weapons.attributed,
            };
            for (weapon_type, entries) in table {
                for entry in entries {
                    if catalog.contains_key(&entry.id) {
                        tracing::debug!(id = %entry.id, ?category, "Shadowed duplicate weapon id");
                        continue;
                    }
                    catalog.insert(
                        entry.id.clone(),
                        WeaponDefinition::from_data(entry, weapon_type, category),
                    );
                }
            }
        }

        let classes = classes
            .iter()
            .filter_map(|(id, entries)| {
                let first = entries.first()?;
                let name = if first.name.is_empty() {
                    id.clone()
                } else {
                    first.name.clone()
                };
                Some((
                    id.clone(),
                    ClassDefinition {
                        id: id.clone(),
                        name,
                        weapon_types: first.weapon_types.iter().cloned().collect(),
                    },
                ))
            })
            .collect();

        Self {
            weapons: catalog,
            classes,
            lookup,
        }
    }

    /// Class lookup policy in effect.
    #[must_use]
    pub const fn lookup(&self) -> ClassLookup {
        self.lookup
    }

    /// Weapon definition for an item id.
    #[must_use]
    pub fn weapon(&self, id: &str) -> Option<&WeaponDefinition> {
        self.weapons.get(id)
    }

    /// Weapon definition for an item id, or a placeholder named after it.
    #[must_use]
    pub fn weapon_or_placeholder(&self, id: &str) -> WeaponDefinition {
        self.weapon(id)
            .cloned()
            .unwrap_or_else(|| WeaponDefinition::placeholder(id))
    }

    /// Class definition by id.
    #[must_use]
    pub fn class(&self, id: &str) -> Option<&ClassDefinition> {
        self.classes.get(id)
    }

    /// Display name of a class, falling back to the id.
    #[must_use]
    pub fn class_display_name(&self, id: &str) -> String {
        self.class(id)
            .map_or_else(|| id.to_string(), |class| class.name.clone())
    }

    /// Number of distinct weapons.
    #[must_use]
    pub fn weapon_count(&self) -> usize {
        self.weapons.len()
    }

    /// Number of classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Check if a unit may wield a weapon.
    #[must_use]
    pub fn can_wield(&self, unit: &Unit, weapon: &WeaponDefinition) -> bool {
        if let Some(owner) = &weapon.owner {
            return *owner == unit.unit_id;
        }

        match self.lookup {
            ClassLookup::ById => self
                .class(&unit.class_id)
                .is_some_and(|class| class.weapon_types.contains(&weapon.weapon_type)),
            ClassLookup::ByDisplayName => self.classes.values().any(|class| {
                class.name == unit.class_name && class.weapon_types.contains(&weapon.weapon_type)
            }),
        }
    }

    /// Check if a unit record of class `class_id` finds a class under the
    /// lookup policy in effect.
    #[must_use]
    pub fn resolves_class(&self, class_id: &str) -> bool {
        match self.lookup {
            ClassLookup::ById => self.class(class_id).is_some(),
            ClassLookup::ByDisplayName => {
                let name = self.class_display_name(class_id);
                self.classes.values().any(|class| class.name == name)
            }
        }
    }

    /// Check if a unit may wield the item with the given id.
    ///
    /// Items without a weapon record are never wieldable.
    #[must_use]
    pub fn can_wield_item(&self, unit: &Unit, item_id: &str) -> bool {
        self.weapon(item_id)
            .is_some_and(|weapon| self.can_wield(unit, weapon))
    }

    /// Index of the first inventory item the unit may wield.
    #[must_use]
    pub fn first_wieldable(&self, unit: &Unit) -> Option<usize> {
        unit.inventory
            .iter()
            .position(|item| self.can_wield_item(unit, item))
    }
}
