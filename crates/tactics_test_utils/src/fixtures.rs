//! Test fixtures and helpers.
//!
//! A small, fixed content set (atlas, units, weapons, classes) plus builders
//! for maps of any size, so tests only spell out what they care about.

use serde::de::DeserializeOwned;

use tactics_core::prelude::*;
use tactics_core::data::{
    AtlasData, ClassesData, LayerData, MapData, MapUnitData, UnitsData, WeaponsData,
};

/// Plains: passable, cost 1.
pub const PLAINS: TileId = 1;
/// Wall: impassable.
pub const WALL: TileId = 2;
/// Forest: passable, cost 2.
pub const FOREST: TileId = 3;
/// Mountain: passable, cost 3.
pub const MOUNTAIN: TileId = 4;

/// Fixture atlas.
pub const ATLAS_RON: &str = r#"(
    tile_size: 16,
    tiles: [
        (id: 1, name: "Plains"),
        (id: 2, name: "Wall", passable: false),
        (id: 3, name: "Forest", move_cost: 2, avoid_bonus: 20, defense_bonus: 1),
        (id: 4, name: "Mountain", move_cost: 3, avoid_bonus: 30, defense_bonus: 2),
    ],
)"#;

/// Fixture unit records.
///
/// - `seth`: lord, mov 2, carries a sword and an axe.
/// - `eirika`: lord, mov 5, carries her personal rapier and a vulnerary.
/// - `ross`: fighter, mov 4, carries an axe.
/// - `neimi`: archer, mov 5, carries a bow.
/// - `brigand` (enemy): fighter, mov 5, carries an axe.
pub const UNITS_RON: &str = r#"{
    "player": {
        "seth": (name: "Seth", class: "lord", level: 3,
                 stats: (hp: 30, str: 14, mov: 2),
                 current_inventory: ["iron_sword", "iron_axe"]),
        "eirika": (name: "Eirika", class: "lord",
                   stats: (hp: 16, spd: 9, mov: 5),
                   current_inventory: ["rapier", "vulnerary"]),
        "ross": (name: "Ross", class: "fighter",
                 stats: (hp: 15, mov: 4),
                 current_inventory: ["iron_axe"]),
        "neimi": (name: "Neimi", class: "archer",
                  stats: (hp: 17, mov: 5),
                  current_inventory: ["iron_bow"]),
    },
    "enemy": {
        "brigand": (name: "Brigand", class: "fighter",
                    stats: (hp: 20, str: 5),
                    current_inventory: ["iron_axe"]),
    },
}"#;

/// Fixture weapon records.
pub const WEAPONS_RON: &str = r#"(
    generic: {
        "sword": [(id: "iron_sword", name: "Iron Sword", might: 5, hit: 90, weight: 5, durability: Some(46), range: [1])],
        "axe": [(id: "iron_axe", name: "Iron Axe", might: 8, hit: 75, weight: 10, durability: Some(45), range: [1])],
        "bow": [(id: "iron_bow", name: "Iron Bow", might: 6, hit: 85, weight: 5, durability: Some(45), range: [2])],
    },
    prf: {
        "sword": [(id: "rapier", name: "Rapier", might: 7, hit: 95, crit: 10, durability: None, range: [1], user: Some("eirika"))],
    },
    attributed: {
        "sword": [(id: "flame_blade", name: "Flame Blade", might: 9, range: [1, 2])],
    },
)"#;

/// Fixture class records.
pub const CLASSES_RON: &str = r#"{
    "lord": [(name: "Lord", weapon_types: ["sword"])],
    "fighter": [(name: "Fighter", weapon_types: ["axe"])],
    "archer": [(name: "Archer", weapon_types: ["bow"])],
}"#;

/// Parse a fixture RON document.
///
/// # Panics
///
/// Panics if the document is malformed.
#[must_use]
pub fn parse<T: DeserializeOwned>(source: &str) -> T {
    match ron::from_str(source) {
        Ok(value) => value,
        Err(e) => panic!("Fixture failed to parse: {e}"),
    }
}

/// Place a unit record on a cell.
#[must_use]
pub fn place(faction: Faction, unit_id: &str, x: i64, y: i64) -> MapUnitData {
    MapUnitData {
        faction,
        unit_id: unit_id.to_string(),
        sprite: None,
        x,
        y,
    }
}

/// A single-layer map.
#[must_use]
pub fn map_with_tiles(
    width: u32,
    height: u32,
    tiles: Vec<TileId>,
    units: Vec<MapUnitData>,
) -> MapData {
    MapData {
        name: "Fixture".to_string(),
        music: None,
        width,
        height,
        tile_size: 16,
        atlas: None,
        layers: vec![LayerData {
            name: "ground".to_string(),
            visible: true,
            data: tiles,
        }],
        units,
    }
}

/// An all-plains map.
#[must_use]
pub fn open_map(width: u32, height: u32, units: Vec<MapUnitData>) -> MapData {
    map_with_tiles(width, height, vec![PLAINS; (width * height) as usize], units)
}

/// Every record needed to build a battlefield.
#[derive(Debug, Clone)]
pub struct FixtureRecords {
    /// Map record.
    pub map: MapData,
    /// Atlas record.
    pub atlas: AtlasData,
    /// Unit records.
    pub units: UnitsData,
    /// Weapon records.
    pub weapons: WeaponsData,
    /// Class records.
    pub classes: ClassesData,
}

impl FixtureRecords {
    /// Fixture content around the given map.
    #[must_use]
    pub fn new(map: MapData) -> Self {
        Self {
            map,
            atlas: parse(ATLAS_RON),
            units: parse(UNITS_RON),
            weapons: parse(WEAPONS_RON),
            classes: parse(CLASSES_RON),
        }
    }

    /// Build the battlefield.
    ///
    /// # Errors
    ///
    /// Returns the build error.
    pub fn try_battlefield(&self, rules: Rules) -> Result<Battlefield> {
        Battlefield::from_records(
            &self.map,
            &self.atlas,
            &self.units,
            &self.weapons,
            &self.classes,
            rules,
        )
    }

    /// Build the battlefield, panicking on malformed fixtures.
    ///
    /// # Panics
    ///
    /// Panics if the records do not build.
    #[must_use]
    pub fn battlefield(&self, rules: Rules) -> Battlefield {
        match self.try_battlefield(rules) {
            Ok(field) => field,
            Err(e) => panic!("Fixture battlefield failed to build: {e}"),
        }
    }

    /// Load the records into a session.
    ///
    /// # Errors
    ///
    /// Returns the build error; `session` keeps its previous map.
    pub fn load_into(&self, session: &mut MapSession, rules: Rules) -> Result<()> {
        session.load(
            &self.map,
            &self.atlas,
            &self.units,
            &self.weapons,
            &self.classes,
            rules,
        )
    }

    /// A fresh session with these records loaded.
    ///
    /// # Panics
    ///
    /// Panics if the records do not build.
    #[must_use]
    pub fn session(&self, rules: Rules) -> MapSession {
        let mut session = MapSession::new();
        if let Err(e) = self.load_into(&mut session, rules) {
            panic!("Fixture session failed to load: {e}");
        }
        tracing::debug!(map = %self.map.name, "Fixture session loaded");
        session
    }
}

/// Seth alone on a 5x5 plain at (2, 2).
#[must_use]
pub fn lone_seth() -> FixtureRecords {
    FixtureRecords::new(open_map(5, 5, vec![place(Faction::Player, "seth", 2, 2)]))
}

/// A bare unit for roster-level tests.
#[must_use]
pub fn create_test_unit(unit_id: &str, faction: Faction, x: u32, y: u32, movement: u32) -> Unit {
    Unit {
        unit_id: unit_id.to_string(),
        name: unit_id.to_string(),
        class_id: "lord".to_string(),
        class_name: "Lord".to_string(),
        level: 1,
        faction,
        position: GridPos::new(x, y),
        stats: Stats {
            movement,
            ..Stats::default()
        },
        inventory: Vec::new(),
        equipped: None,
        has_moved: false,
    }
}

/// Feed events into a session, panicking on core errors.
///
/// # Panics
///
/// Panics if the session reports an error.
pub fn drive(session: &mut MapSession, events: &[InputEvent]) -> Vec<Feedback> {
    events
        .iter()
        .map(|&event| match session.handle(event) {
            Ok(feedback) => feedback,
            Err(e) => panic!("Input {event:?} failed: {e}"),
        })
        .collect()
}
