//! Proptest strategies.
//!
//! These generate small random battlefields and input streams for
//! property-based tests of range invariants and replay determinism.

use std::collections::BTreeSet;

use proptest::prelude::*;
use tactics_core::prelude::*;

use crate::fixtures::{map_with_tiles, place, FixtureRecords, FOREST, MOUNTAIN, PLAINS, WALL};

/// A generated battlefield: one selectable player unit and some others.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Grid width.
    pub width: u32,
    /// Grid height.
    pub height: u32,
    /// Row-major terrain.
    pub tiles: Vec<TileId>,
    /// Position of the selectable unit (always roster index 0).
    pub hero: (u32, u32),
    /// Other units, on distinct cells.
    pub others: Vec<(Faction, u32, u32)>,
}

impl Scenario {
    /// Records for this scenario. The hero is `eirika` (mov 5); allies are
    /// `ross`, enemies are `brigand`.
    #[must_use]
    pub fn records(&self) -> FixtureRecords {
        let mut units = vec![place(
            Faction::Player,
            "eirika",
            i64::from(self.hero.0),
            i64::from(self.hero.1),
        )];
        units.extend(self.others.iter().map(|&(faction, x, y)| {
            let id = match faction {
                Faction::Player => "ross",
                Faction::Enemy => "brigand",
            };
            place(faction, id, i64::from(x), i64::from(y))
        }));
        FixtureRecords::new(map_with_tiles(
            self.width,
            self.height,
            self.tiles.clone(),
            units,
        ))
    }
}

/// A terrain tile id, mostly plains.
pub fn arb_tile() -> impl Strategy<Value = TileId> {
    prop_oneof![
        6 => Just(PLAINS),
        1 => Just(WALL),
        2 => Just(FOREST),
        1 => Just(MOUNTAIN),
        1 => Just(-1),
    ]
}

/// A battlefield of up to 12x12 cells with up to 6 other units.
pub fn arb_scenario() -> impl Strategy<Value = Scenario> {
    (2u32..=12, 2u32..=12)
        .prop_flat_map(|(width, height)| {
            let cells = (width * height) as usize;
            (
                Just(width),
                Just(height),
                proptest::collection::vec(arb_tile(), cells),
                (0..width, 0..height),
                proptest::collection::vec(
                    (any::<bool>(), 0..width, 0..height),
                    0..=6,
                ),
            )
        })
        .prop_map(|(width, height, tiles, hero, others)| {
            let mut taken = BTreeSet::from([hero]);
            let others = others
                .into_iter()
                .filter(|&(_, x, y)| taken.insert((x, y)))
                .map(|(ally, x, y)| {
                    let faction = if ally { Faction::Player } else { Faction::Enemy };
                    (faction, x, y)
                })
                .collect();
            Scenario {
                width,
                height,
                tiles,
                hero,
                others,
            }
        })
}

/// Any input event, biased towards cursor moves.
pub fn arb_input_event() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        4 => (-1i32..=1, -1i32..=1).prop_map(|(dx, dy)| InputEvent::MoveCursor { dx, dy }),
        2 => Just(InputEvent::Select),
        1 => Just(InputEvent::Cancel),
        2 => prop_oneof![Just(-1), Just(1)].prop_map(InputEvent::NavigateMenu),
        2 => Just(InputEvent::ConfirmMenu),
        1 => Just(InputEvent::ToggleUnitInfo),
    ]
}

/// A stream of up to `max_len` input events.
pub fn arb_input_stream(max_len: usize) -> impl Strategy<Value = Vec<InputEvent>> {
    proptest::collection::vec(arb_input_event(), 0..=max_len)
}
