//! Map session: owns the loaded battlefield and routes input to it.
//!
//! A session is either empty ("no map loaded") or holds one battlefield and
//! its action state machine. Loading is atomic: if building the new
//! battlefield fails, the previous one stays in place untouched.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::action::{ActionMenuRow, ActionState, ActionStateMachine, DropChoice, Feedback};
use crate::battlefield::Battlefield;
use crate::data::{AtlasData, ClassesData, MapData, UnitsData, WeaponsData};
use crate::error::Result;
use crate::grid::GridPos;
use crate::input::InputEvent;
use crate::range::RangeSet;
use crate::roster::{Faction, Unit, UnitIndex};
use crate::rules::Rules;

/// One row of the inventory menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    /// Item id.
    pub item_id: String,
    /// Display name.
    pub name: String,
    /// Whether this slot is equipped.
    pub equipped: bool,
    /// Whether the unit may equip it.
    pub wieldable: bool,
}

/// The open menu, as a renderer draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "menu", rename_all = "snake_case")]
pub enum MenuView {
    /// Inventory / Wait.
    Action {
        /// Row labels.
        rows: Vec<&'static str>,
        /// Highlighted row.
        highlighted: usize,
    },
    /// Items followed by the Drop row.
    Inventory {
        /// Item rows.
        items: Vec<InventoryRow>,
        /// Highlighted row; `items.len()` is the Drop row.
        highlighted: usize,
        /// Whether confirming Drop would do anything.
        drop_enabled: bool,
    },
    /// Yes / No over the inventory.
    DropConfirm {
        /// Item that would be dropped.
        item: String,
        /// Highlighted answer.
        choice: DropChoice,
    },
}

/// Read-only snapshot of everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView<'a> {
    /// Map display name.
    pub map_name: &'a str,
    /// `(width, height)` in cells.
    pub dimensions: (u32, u32),
    /// Cursor cell.
    pub cursor: GridPos,
    /// State name.
    pub state: &'static str,
    /// Selected or acting unit.
    pub selected: Option<UnitIndex>,
    /// Movement overlay.
    pub movement: Option<&'a RangeSet>,
    /// Attack overlay.
    pub attack: Option<&'a RangeSet>,
    /// Open menu.
    pub menu: Option<MenuView>,
    /// Unit described by the info panel.
    pub unit_info: Option<&'a Unit>,
}

/// Holder of the current map, if any.
#[derive(Debug, Default)]
pub struct MapSession {
    active: Option<(Battlefield, ActionStateMachine)>,
}

impl MapSession {
    /// Create a session with no map loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a battlefield from records and make it current.
    ///
    /// The cursor starts on the first player unit, or the top-left cell.
    ///
    /// # Errors
    ///
    /// Returns the build error; the previous map, if any, stays loaded.
    pub fn load(
        &mut self,
        map: &MapData,
        atlas: &AtlasData,
        units: &UnitsData,
        weapons: &WeaponsData,
        classes: &ClassesData,
        rules: Rules,
    ) -> Result<()> {
        let field = Battlefield::from_records(map, atlas, units, weapons, classes, rules)?;
        let cursor = field
            .roster()
            .indices_of(Faction::Player)
            .next()
            .and_then(|index| field.roster().get(index).ok())
            .map_or(GridPos::default(), |unit| unit.position);
        if let Some((previous, _)) = &self.active {
            tracing::info!(previous = %previous.grid().name(), "Replacing loaded map");
        }
        self.active = Some((field, ActionStateMachine::new(cursor)));
        Ok(())
    }

    /// Drop the current map.
    pub fn unload(&mut self) {
        if let Some((field, _)) = self.active.take() {
            tracing::info!(map = %field.grid().name(), "Unloaded map");
        }
    }

    /// Whether a map is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.active.is_some()
    }

    /// The loaded battlefield.
    #[must_use]
    pub fn battlefield(&self) -> Option<&Battlefield> {
        self.active.as_ref().map(|(field, _)| field)
    }

    /// The loaded map's state machine.
    #[must_use]
    pub fn machine(&self) -> Option<&ActionStateMachine> {
        self.active.as_ref().map(|(_, machine)| machine)
    }

    /// Route one input. Without a map every input is ignored.
    ///
    /// # Errors
    ///
    /// Propagates state machine errors.
    pub fn handle(&mut self, event: InputEvent) -> Result<Feedback> {
        match &mut self.active {
            Some((field, machine)) => machine.handle(field, event),
            None => Ok(Feedback::Ignored),
        }
    }

    /// Cancel one step; `false` when there was nothing to cancel.
    ///
    /// # Errors
    ///
    /// Propagates state machine errors.
    pub fn cancel(&mut self) -> Result<bool> {
        match &mut self.active {
            Some((field, machine)) => machine.cancel(field),
            None => Ok(false),
        }
    }

    /// Let every unit of `faction` act again.
    pub fn clear_moved(&mut self, faction: Faction) -> usize {
        self.active
            .as_mut()
            .map_or(0, |(field, _)| field.clear_moved(faction))
    }

    /// Deterministic hash of roster and controller state.
    #[must_use]
    pub fn state_hash(&self) -> Option<u64> {
        self.active.as_ref().map(|(field, machine)| {
            let mut hasher = DefaultHasher::new();
            field.state_hash().hash(&mut hasher);
            machine.hash(&mut hasher);
            hasher.finish()
        })
    }

    /// Render-facing snapshot of the current frame.
    #[must_use]
    pub fn view(&self) -> Option<SessionView<'_>> {
        let (field, machine) = self.active.as_ref()?;
        let ranges = machine.ranges();
        Some(SessionView {
            map_name: field.grid().name(),
            dimensions: field.grid().dimensions(),
            cursor: machine.cursor(),
            state: machine.state().name(),
            selected: machine.state().unit(),
            movement: ranges.map(|r| &r.movement),
            attack: ranges.map(|r| &r.attack),
            menu: menu_view(field, machine.state()),
            unit_info: machine
                .unit_info()
                .and_then(|index| field.roster().get(index).ok()),
        })
    }
}

fn menu_view(field: &Battlefield, state: &ActionState) -> Option<MenuView> {
    match state {
        ActionState::Idle | ActionState::UnitSelected { .. } => None,
        ActionState::ActionMenu { cursor, .. } => Some(MenuView::Action {
            rows: ActionMenuRow::ALL.iter().map(|row| row.label()).collect(),
            highlighted: *cursor,
        }),
        ActionState::InventoryMenu { unit, cursor, .. } => {
            let unit = field.roster().get(*unit).ok()?;
            Some(MenuView::Inventory {
                items: inventory_rows(field, unit),
                highlighted: *cursor,
                drop_enabled: unit.equipped_item().is_some(),
            })
        }
        ActionState::DropConfirm { unit, choice, .. } => {
            let unit = field.roster().get(*unit).ok()?;
            let item = unit.equipped_item().unwrap_or_default();
            Some(MenuView::DropConfirm {
                item: field.equipment().weapon_or_placeholder(item).name,
                choice: *choice,
            })
        }
    }
}

fn inventory_rows(field: &Battlefield, unit: &Unit) -> Vec<InventoryRow> {
    unit.inventory
        .iter()
        .enumerate()
        .map(|(slot, item)| InventoryRow {
            item_id: item.clone(),
            name: field.equipment().weapon_or_placeholder(item).name,
            equipped: unit.equipped == Some(slot),
            wieldable: field.equipment().can_wield_item(unit, item),
        })
        .collect()
}
