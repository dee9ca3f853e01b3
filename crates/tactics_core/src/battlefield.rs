//! The battlefield aggregate: grid, roster, equipment and rules of one map.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::data::{AtlasData, ClassesData, MapData, MapUnitData, UnitsData, WeaponsData};
use crate::equipment::EquipmentCatalog;
use crate::error::Result;
use crate::grid::GridMap;
use crate::range::Ranges;
use crate::roster::{Faction, Stats, Unit, UnitIndex, UnitRoster};
use crate::rules::Rules;
use crate::tiles::TileCatalog;

/// Everything the action state machine reads and mutates during a map.
///
/// Grid, tile catalog and equipment are read-only once built. The roster is
/// mutated only through the state machine and [`Battlefield::clear_moved`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battlefield {
    pub(crate) grid: GridMap,
    pub(crate) roster: UnitRoster,
    pub(crate) equipment: EquipmentCatalog,
    pub(crate) rules: Rules,
}

impl Battlefield {
    /// Build a battlefield from parsed records.
    ///
    /// Unit placements are clamped into the grid. Placements without a unit
    /// record get fallback stats from `rules`. Each unit starts with its
    /// first wieldable item equipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the atlas or map is malformed, or if two units
    /// end up on the same cell.
    pub fn from_records(
        map: &MapData,
        atlas: &AtlasData,
        units: &UnitsData,
        weapons: &WeaponsData,
        classes: &ClassesData,
        rules: Rules,
    ) -> Result<Self> {
        let catalog = TileCatalog::from_atlas(atlas)?;
        let grid = GridMap::from_data(map, catalog)?;
        let equipment = EquipmentCatalog::from_data(weapons, classes, rules.class_lookup);

        let mut roster = UnitRoster::new();
        for placement in &map.units {
            let unit = place_unit(placement, &grid, units, &equipment, &rules);
            roster.push(unit)?;
        }

        tracing::info!(
            map = %grid.name(),
            width = grid.width(),
            height = grid.height(),
            tiles = grid.catalog().len(),
            units = roster.len(),
            weapons = equipment.weapon_count(),
            classes = equipment.class_count(),
            "Battlefield ready"
        );

        Ok(Self {
            grid,
            roster,
            equipment,
            rules,
        })
    }

    /// The tile grid.
    #[must_use]
    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    /// Placed units.
    #[must_use]
    pub fn roster(&self) -> &UnitRoster {
        &self.roster
    }

    /// Weapon and class catalog.
    #[must_use]
    pub fn equipment(&self) -> &EquipmentCatalog {
        &self.equipment
    }

    /// Rules in effect.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Movement and attack overlays for a unit at its current position.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not in the roster.
    pub fn ranges_for(&self, index: UnitIndex) -> Result<Ranges> {
        Ranges::compute(
            &self.grid,
            &self.roster,
            &self.equipment,
            index,
            self.rules.movement,
            self.rules.threat_reach,
        )
    }

    /// Start of a new turn for `faction`: its units may act again.
    pub fn clear_moved(&mut self, faction: Faction) -> usize {
        self.roster.clear_moved(faction)
    }

    /// Deterministic hash of the mutable roster state.
    ///
    /// Covers position, inventory, equipped slot and moved flag of every
    /// unit, in roster order.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.roster.len().hash(&mut hasher);
        for (index, unit) in self.roster.iter() {
            index.hash(&mut hasher);
            unit.position.hash(&mut hasher);
            unit.inventory.hash(&mut hasher);
            unit.equipped.hash(&mut hasher);
            unit.has_moved.hash(&mut hasher);
        }
        hasher.finish()
    }
}

fn place_unit(
    placement: &MapUnitData,
    grid: &GridMap,
    units: &UnitsData,
    equipment: &EquipmentCatalog,
    rules: &Rules,
) -> Unit {
    let position = grid.clamp(placement.x, placement.y);
    if (i64::from(position.x), i64::from(position.y)) != (placement.x, placement.y) {
        tracing::warn!(
            unit = %placement.unit_id,
            x = placement.x,
            y = placement.y,
            clamped = %position,
            "Unit placed outside the grid"
        );
    }

    let record = units
        .get(placement.faction.as_str())
        .and_then(|faction| faction.get(&placement.unit_id));

    let mut unit = match record {
        Some(record) => Unit {
            unit_id: placement.unit_id.clone(),
            name: record.name.clone(),
            class_name: equipment.class_display_name(&record.class),
            class_id: record.class.clone(),
            level: record.level,
            faction: placement.faction,
            position,
            stats: Stats::from(&record.stats),
            inventory: record.current_inventory.clone(),
            equipped: None,
            has_moved: false,
        },
        None => {
            tracing::warn!(
                faction = %placement.faction,
                unit = %placement.unit_id,
                "No unit record, using fallback stats"
            );
            Unit {
                unit_id: placement.unit_id.clone(),
                name: "Unknown".to_string(),
                class_id: String::new(),
                class_name: String::new(),
                level: 1,
                faction: placement.faction,
                position,
                stats: Stats::from(&rules.fallback_stats),
                inventory: Vec::new(),
                equipped: None,
                has_moved: false,
            }
        }
    };

    unit.equipped = equipment.first_wieldable(&unit);
    unit
}
