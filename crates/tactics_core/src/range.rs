//! Movement and threat range computation.
//!
//! Both computations are pure functions of the grid, the roster and the
//! selected unit. Results are ordered sets so that iteration, rendering and
//! hashing are deterministic.
//!
//! Two movement rules are available:
//! - [`MovementRule::DistanceBound`]: every cell within `mov` Manhattan steps,
//!   ignoring terrain. This is the classic behaviour and the default.
//! - [`MovementRule::CostAware`]: Dijkstra over tile move costs with `mov` as
//!   the budget, blocked by impassable terrain and hostile units.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentCatalog;
use crate::error::Result;
use crate::grid::{GridMap, GridPos};
use crate::roster::{Unit, UnitIndex, UnitRoster};

/// Ordered set of cells.
pub type RangeSet = BTreeSet<GridPos>;

/// Distances a unit threatens when no weapon decides otherwise.
pub const DEFAULT_REACH: [u32; 2] = [1, 2];

/// Rule used to compute movement ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementRule {
    /// Manhattan distance only; terrain is not consulted.
    #[default]
    DistanceBound,
    /// Shortest paths over tile move costs.
    CostAware,
}

/// Rule used to pick the distances a unit threatens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatReach {
    /// Always [`DEFAULT_REACH`].
    #[default]
    Fixed,
    /// The equipped weapon's range, or [`DEFAULT_REACH`] when nothing with a
    /// range is equipped.
    EquippedWeapon,
}

impl ThreatReach {
    /// Distances the unit threatens under this rule.
    #[must_use]
    pub fn distances(self, unit: &Unit, equipment: &EquipmentCatalog) -> BTreeSet<u32> {
        let fixed = || -> BTreeSet<u32> { DEFAULT_REACH.into_iter().collect() };
        match self {
            Self::Fixed => fixed(),
            Self::EquippedWeapon => unit
                .equipped_item()
                .and_then(|item| equipment.weapon(item))
                .map(|weapon| weapon.range.clone())
                .filter(|range| !range.is_empty())
                .unwrap_or_else(fixed),
        }
    }
}

/// Movement and attack overlays of one selected unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ranges {
    /// Cells the unit may move to.
    pub movement: RangeSet,
    /// Cells the unit threatens but cannot move to.
    pub attack: RangeSet,
}

impl Ranges {
    /// Compute both overlays for a unit at its current position.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not in the roster.
    pub fn compute(
        grid: &GridMap,
        roster: &UnitRoster,
        equipment: &EquipmentCatalog,
        index: UnitIndex,
        movement_rule: MovementRule,
        threat: ThreatReach,
    ) -> Result<Self> {
        let unit = roster.get(index)?;
        let movement = movement_range(grid, roster, index, movement_rule)?;
        let reach = threat.distances(unit, equipment);
        let attack = attack_range(grid, &movement, &reach);

        #[cfg(feature = "debug-validation")]
        {
            assert!(movement.contains(&unit.position), "own cell missing from movement");
            assert!(movement.is_disjoint(&attack), "attack overlaps movement");
        }

        tracing::debug!(
            unit = %unit.name,
            movement = movement.len(),
            attack = attack.len(),
            "Computed ranges"
        );
        Ok(Self { movement, attack })
    }
}

/// Cells a unit may end its move on.
///
/// The unit's own cell is always part of the result. Cells held by any other
/// unit never are.
///
/// # Errors
///
/// Returns an error if `index` is not in the roster.
pub fn movement_range(
    grid: &GridMap,
    roster: &UnitRoster,
    index: UnitIndex,
    rule: MovementRule,
) -> Result<RangeSet> {
    let unit = roster.get(index)?;
    let mut cells = match rule {
        MovementRule::DistanceBound => distance_fill(grid, roster, index, unit),
        MovementRule::CostAware => cost_fill(grid, roster, index, unit),
    };
    cells.insert(unit.position);
    Ok(cells)
}

fn distance_fill(grid: &GridMap, roster: &UnitRoster, index: UnitIndex, unit: &Unit) -> RangeSet {
    let origin = unit.position;
    let mov = unit.stats.movement;
    let (width, height) = grid.dimensions();

    let min_y = origin.y.saturating_sub(mov);
    let max_y = origin.y.saturating_add(mov).min(height - 1);

    let mut cells = RangeSet::new();
    for y in min_y..=max_y {
        let remaining = mov - origin.y.abs_diff(y);
        let min_x = origin.x.saturating_sub(remaining);
        let max_x = origin.x.saturating_add(remaining).min(width - 1);
        for x in min_x..=max_x {
            let pos = GridPos::new(x, y);
            if roster.unit_at(pos).map_or(true, |other| other == index) {
                cells.insert(pos);
            }
        }
    }
    cells
}

/// Open-set entry for the cost-aware fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frontier {
    cost: u32,
    pos: GridPos,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost, then on position for a stable expansion order.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn cost_fill(grid: &GridMap, roster: &UnitRoster, index: UnitIndex, unit: &Unit) -> RangeSet {
    let budget = unit.stats.movement;
    let mut best: HashMap<GridPos, u32> = HashMap::new();
    let mut open = BinaryHeap::new();

    best.insert(unit.position, 0);
    open.push(Frontier {
        cost: 0,
        pos: unit.position,
    });

    while let Some(Frontier { cost, pos }) = open.pop() {
        if best.get(&pos).is_some_and(|&known| cost > known) {
            continue;
        }
        for next in pos.neighbors() {
            if !grid.contains(next) {
                continue;
            }
            let Some(step) = grid.move_cost(next) else {
                continue;
            };
            // Hostile units block the path; allies can be passed through.
            let hostile = roster
                .unit_at(next)
                .and_then(|other| roster.get(other).ok())
                .is_some_and(|other| other.faction != unit.faction);
            if hostile {
                continue;
            }
            let total = cost.saturating_add(step);
            if total > budget {
                continue;
            }
            if best.get(&next).map_or(true, |&known| total < known) {
                best.insert(next, total);
                open.push(Frontier { cost: total, pos: next });
            }
        }
    }

    best.into_keys()
        .filter(|&pos| roster.unit_at(pos).map_or(true, |other| other == index))
        .collect()
}

/// Cells threatened from any cell of `movement`, excluding `movement` itself.
///
/// A cell is threatened when its Manhattan distance to some movement cell is
/// one of the `reach` distances. Cells outside the grid are dropped.
#[must_use]
pub fn attack_range(grid: &GridMap, movement: &RangeSet, reach: &BTreeSet<u32>) -> RangeSet {
    let mut cells = RangeSet::new();
    for &origin in movement {
        for &distance in reach.iter().filter(|&&d| d > 0) {
            for pos in ring(grid, origin, distance) {
                if !movement.contains(&pos) {
                    cells.insert(pos);
                }
            }
        }
    }
    cells
}

/// In-bounds cells at exactly `distance` Manhattan steps from `origin`.
fn ring(grid: &GridMap, origin: GridPos, distance: u32) -> impl Iterator<Item = GridPos> + '_ {
    let d = i64::from(distance);
    let ox = i64::from(origin.x);
    let oy = i64::from(origin.y);
    (-d..=d).flat_map(move |dx| {
        let dy = d - dx.abs();
        let offsets = if dy == 0 { vec![0] } else { vec![-dy, dy] };
        offsets.into_iter().filter_map(move |dy| {
            let x = u32::try_from(ox + dx).ok()?;
            let y = u32::try_from(oy + dy).ok()?;
            let pos = GridPos::new(x, y);
            grid.contains(pos).then_some(pos)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AtlasData, LayerData, MapData, TileData};
    use crate::roster::{Faction, Stats};
    use crate::tiles::{TileCatalog, TileId};

    const PLAINS: TileId = 1;
    const WALL: TileId = 2;
    const FOREST: TileId = 3;

    fn create_test_grid(width: u32, height: u32, data: Vec<TileId>) -> GridMap {
        let tile = |id, passable, move_cost| TileData {
            id,
            name: format!("tile_{id}"),
            texture: String::new(),
            passable,
            move_cost,
            avoid_bonus: 0,
            defense_bonus: 0,
        };
        let atlas = AtlasData {
            tile_size: 32,
            tiles: vec![tile(PLAINS, true, 1), tile(WALL, false, 1), tile(FOREST, true, 2)],
        };
        let map = MapData {
            name: "range".to_string(),
            music: None,
            width,
            height,
            tile_size: 32,
            atlas: None,
            layers: vec![LayerData {
                name: "ground".to_string(),
                visible: true,
                data,
            }],
            units: vec![],
        };
        GridMap::from_data(&map, TileCatalog::from_atlas(&atlas).unwrap()).unwrap()
    }

    fn create_test_unit(faction: Faction, x: u32, y: u32, mov: u32) -> Unit {
        Unit {
            unit_id: format!("u{x}{y}"),
            name: format!("u{x}{y}"),
            class_id: "lord".to_string(),
            class_name: "Lord".to_string(),
            level: 1,
            faction,
            position: GridPos::new(x, y),
            stats: Stats {
                movement: mov,
                ..Stats::default()
            },
            inventory: vec![],
            equipped: None,
            has_moved: false,
        }
    }

    fn reach() -> BTreeSet<u32> {
        DEFAULT_REACH.into_iter().collect()
    }

    #[test]
    fn test_lone_unit_diamond() {
        let grid = create_test_grid(5, 5, vec![PLAINS; 25]);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 2, 2, 2)).unwrap();

        let cells = movement_range(&grid, &roster, u, MovementRule::DistanceBound).unwrap();
        assert_eq!(cells.len(), 13);
        assert!(cells.contains(&GridPos::new(2, 2)));
        assert!(cells.contains(&GridPos::new(0, 2)));
        assert!(!cells.contains(&GridPos::new(0, 0)));
    }

    #[test]
    fn test_distance_bound_ignores_terrain() {
        let mut data = vec![PLAINS; 25];
        data[2 * 5 + 1] = WALL;
        let grid = create_test_grid(5, 5, data);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 2, 2, 2)).unwrap();

        let cells = movement_range(&grid, &roster, u, MovementRule::DistanceBound).unwrap();
        assert!(cells.contains(&GridPos::new(1, 2)));
        assert_eq!(cells.len(), 13);
    }

    #[test]
    fn test_other_units_excluded() {
        let grid = create_test_grid(5, 5, vec![PLAINS; 25]);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 2, 2, 2)).unwrap();
        roster.push(create_test_unit(Faction::Enemy, 3, 2, 5)).unwrap();
        roster.push(create_test_unit(Faction::Player, 2, 1, 5)).unwrap();

        let cells = movement_range(&grid, &roster, u, MovementRule::DistanceBound).unwrap();
        assert_eq!(cells.len(), 11);
        assert!(!cells.contains(&GridPos::new(3, 2)));
        assert!(!cells.contains(&GridPos::new(2, 1)));
    }

    #[test]
    fn test_clipped_at_corner() {
        let grid = create_test_grid(3, 3, vec![PLAINS; 9]);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 0, 0, 1)).unwrap();

        let cells = movement_range(&grid, &roster, u, MovementRule::DistanceBound).unwrap();
        let expected: RangeSet = [GridPos::new(0, 0), GridPos::new(1, 0), GridPos::new(0, 1)]
            .into_iter()
            .collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_zero_movement_keeps_own_cell() {
        let grid = create_test_grid(3, 3, vec![PLAINS; 9]);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 1, 1, 0)).unwrap();

        let cells = movement_range(&grid, &roster, u, MovementRule::CostAware).unwrap();
        assert_eq!(cells.len(), 1);
        let cells = movement_range(&grid, &roster, u, MovementRule::DistanceBound).unwrap();
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn test_attack_ring_around_lone_unit() {
        let grid = create_test_grid(9, 9, vec![PLAINS; 81]);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 4, 4, 2)).unwrap();

        let movement = movement_range(&grid, &roster, u, MovementRule::DistanceBound).unwrap();
        let attack = attack_range(&grid, &movement, &reach());

        // Rings at distance 3 and 4 around the diamond.
        assert_eq!(attack.len(), 12 + 16);
        assert!(attack.iter().all(|pos| !movement.contains(pos)));
        assert!(attack.contains(&GridPos::new(4, 0)));
        assert!(!attack.contains(&GridPos::new(0, 0)));
    }

    #[test]
    fn test_attack_includes_occupied_cells() {
        let grid = create_test_grid(5, 5, vec![PLAINS; 25]);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 2, 2, 1)).unwrap();
        roster.push(create_test_unit(Faction::Enemy, 2, 3, 1)).unwrap();

        let movement = movement_range(&grid, &roster, u, MovementRule::DistanceBound).unwrap();
        let attack = attack_range(&grid, &movement, &reach());
        assert!(!movement.contains(&GridPos::new(2, 3)));
        assert!(attack.contains(&GridPos::new(2, 3)));
    }

    #[test]
    fn test_cost_aware_walls_and_forest() {
        // Row 1 is a wall except for a forest gap at x = 4.
        #[rustfmt::skip]
        let data = vec![
            PLAINS, PLAINS, PLAINS, PLAINS, PLAINS,
            WALL,   WALL,   WALL,   WALL,   FOREST,
            PLAINS, PLAINS, PLAINS, PLAINS, PLAINS,
        ];
        let grid = create_test_grid(5, 3, data);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 0, 0, 4)).unwrap();

        let cells = movement_range(&grid, &roster, u, MovementRule::CostAware).unwrap();
        // Along the top row, and into the forest for cost 4 + 2 > 4: not reachable.
        let expected: RangeSet = (0..5).map(|x| GridPos::new(x, 0)).collect();
        assert_eq!(cells, expected);

        let bound = movement_range(&grid, &roster, u, MovementRule::DistanceBound).unwrap();
        assert!(cells.is_subset(&bound));
    }

    #[test]
    fn test_cost_aware_pass_through_allies_only() {
        let grid = create_test_grid(5, 1, vec![PLAINS; 5]);
        let mut roster = UnitRoster::new();
        let u = roster.push(create_test_unit(Faction::Player, 0, 0, 3)).unwrap();
        roster.push(create_test_unit(Faction::Player, 1, 0, 3)).unwrap();

        let cells = movement_range(&grid, &roster, u, MovementRule::CostAware).unwrap();
        let expected: RangeSet = [0, 2, 3].into_iter().map(|x| GridPos::new(x, 0)).collect();
        assert_eq!(cells, expected);

        roster.get_mut(1).unwrap().faction = Faction::Enemy;
        let cells = movement_range(&grid, &roster, u, MovementRule::CostAware).unwrap();
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn test_equipped_weapon_reach() {
        use crate::data::{ClassesData, WeaponsData};
        use crate::equipment::ClassLookup;

        let weapons: WeaponsData =
            ron::from_str(r#"(generic: { "bow": [(id: "longbow", range: [2, 3])] })"#).unwrap();
        let equipment = EquipmentCatalog::from_data(&weapons, &ClassesData::new(), ClassLookup::ById);

        let mut unit = create_test_unit(Faction::Player, 0, 0, 1);
        assert_eq!(
            ThreatReach::EquippedWeapon.distances(&unit, &equipment),
            reach()
        );

        unit.inventory = vec!["longbow".to_string()];
        unit.equipped = Some(0);
        let expected: BTreeSet<u32> = [2, 3].into_iter().collect();
        assert_eq!(ThreatReach::EquippedWeapon.distances(&unit, &equipment), expected);
        assert_eq!(ThreatReach::Fixed.distances(&unit, &equipment), reach());
    }
}
