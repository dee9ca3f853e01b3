//! The unit action state machine.
//!
//! A player turn for one unit walks through these states:
//!
//! ```text
//! Idle ──select──▶ UnitSelected ──select in range──▶ ActionMenu
//!                                                     │  Inventory
//!                                                     ▼
//!                              DropConfirm ◀──Drop── InventoryMenu
//! ```
//!
//! Every step can be backed out with cancel. Rollback is asymmetric:
//! - cancelling the action menu puts the unit back where it started;
//! - cancelling the inventory menu restores the inventory snapshot, but
//!   equips and confirmed drops update that snapshot, so they survive;
//! - choosing Wait commits everything and ends the unit's turn.
//!
//! The unit-info panel is independent of these states.

use serde::{Deserialize, Serialize};

use crate::battlefield::Battlefield;
use crate::error::Result;
use crate::grid::GridPos;
use crate::input::InputEvent;
use crate::range::Ranges;
use crate::roster::{Unit, UnitIndex};

/// Rows of the action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionMenuRow {
    /// Open the inventory.
    Inventory,
    /// End the unit's turn.
    Wait,
}

impl ActionMenuRow {
    /// Rows in display order.
    pub const ALL: [Self; 2] = [Self::Inventory, Self::Wait];

    /// Row label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inventory => "Inventory",
            Self::Wait => "Wait",
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Answer highlighted in the drop confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropChoice {
    /// Drop the equipped item.
    #[default]
    Yes,
    /// Keep it.
    No,
}

impl DropChoice {
    /// Row index of this choice.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Yes => 0,
            Self::No => 1,
        }
    }

    const fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Inventory and equipped slot as they were when the inventory was opened,
/// plus any changes committed since.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// Item ids.
    pub inventory: Vec<String>,
    /// Equipped slot.
    pub equipped: Option<usize>,
}

impl InventorySnapshot {
    fn capture(unit: &Unit) -> Self {
        Self {
            inventory: unit.inventory.clone(),
            equipped: unit.equipped,
        }
    }

    fn restore(&self, unit: &mut Unit) {
        unit.inventory.clone_from(&self.inventory);
        unit.equipped = self.equipped;
    }
}

/// Controller state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionState {
    /// Nothing selected; the cursor roams freely.
    #[default]
    Idle,
    /// A unit is selected and its overlays are shown.
    UnitSelected {
        /// Selected unit.
        unit: UnitIndex,
        /// Overlays computed at selection time.
        ranges: Ranges,
    },
    /// The unit has been moved provisionally.
    ActionMenu {
        /// Acting unit.
        unit: UnitIndex,
        /// Cell the unit stood on before moving.
        origin: GridPos,
        /// Highlighted row.
        cursor: usize,
    },
    /// The unit's items are listed, followed by a Drop row.
    InventoryMenu {
        /// Acting unit.
        unit: UnitIndex,
        /// Cell the unit stood on before moving.
        origin: GridPos,
        /// Highlighted row.
        cursor: usize,
        /// State restored on cancel.
        snapshot: InventorySnapshot,
    },
    /// Asking whether to drop the equipped item.
    DropConfirm {
        /// Acting unit.
        unit: UnitIndex,
        /// Cell the unit stood on before moving.
        origin: GridPos,
        /// Inventory row highlighted underneath.
        cursor: usize,
        /// State restored on inventory cancel.
        snapshot: InventorySnapshot,
        /// Highlighted answer.
        choice: DropChoice,
    },
}

impl ActionState {
    /// Whether a menu is open, making cursor movement inert.
    #[must_use]
    pub const fn in_menu(&self) -> bool {
        matches!(
            self,
            Self::ActionMenu { .. } | Self::InventoryMenu { .. } | Self::DropConfirm { .. }
        )
    }

    /// Unit being selected or acted with.
    #[must_use]
    pub const fn unit(&self) -> Option<UnitIndex> {
        match self {
            Self::Idle => None,
            Self::UnitSelected { unit, .. }
            | Self::ActionMenu { unit, .. }
            | Self::InventoryMenu { unit, .. }
            | Self::DropConfirm { unit, .. } => Some(*unit),
        }
    }

    /// Short state name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::UnitSelected { .. } => "unit_selected",
            Self::ActionMenu { .. } => "action_menu",
            Self::InventoryMenu { .. } => "inventory_menu",
            Self::DropConfirm { .. } => "drop_confirm",
        }
    }
}

/// Outcome of one input, for logging and presentation hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    /// The input had no effect.
    Ignored,
    /// The cursor moved.
    CursorMoved {
        /// New cursor cell.
        to: GridPos,
    },
    /// A unit was selected.
    UnitSelected {
        /// Selected unit.
        unit: UnitIndex,
    },
    /// The selection was dropped.
    SelectionCleared,
    /// The selected unit moved provisionally and the action menu opened.
    UnitMoved {
        /// Moving unit.
        unit: UnitIndex,
        /// Previous cell.
        from: GridPos,
        /// New cell.
        to: GridPos,
    },
    /// A provisional move was undone.
    MoveReverted {
        /// Moved unit.
        unit: UnitIndex,
        /// Restored cell.
        to: GridPos,
    },
    /// The menu highlight moved.
    MenuMoved {
        /// New highlighted row.
        row: usize,
    },
    /// The inventory menu opened.
    InventoryOpened,
    /// The inventory menu closed and its snapshot was restored.
    InventoryClosed,
    /// An item was equipped.
    Equipped {
        /// Equipping unit.
        unit: UnitIndex,
        /// Inventory slot.
        slot: usize,
    },
    /// The highlighted item cannot be wielded by this unit.
    EquipRejected {
        /// Unit.
        unit: UnitIndex,
        /// Inventory slot.
        slot: usize,
    },
    /// The drop confirmation opened.
    DropRequested,
    /// The drop confirmation closed without dropping.
    DropCancelled,
    /// The equipped item was dropped.
    Dropped {
        /// Unit.
        unit: UnitIndex,
        /// Dropped item id.
        item: String,
        /// Slot equipped afterwards.
        equipped: Option<usize>,
    },
    /// The unit ended its turn.
    Waited {
        /// Unit.
        unit: UnitIndex,
    },
    /// The unit-info panel opened.
    UnitInfoShown {
        /// Unit described by the panel.
        unit: UnitIndex,
    },
    /// The unit-info panel closed.
    UnitInfoHidden,
}

impl Feedback {
    /// Whether the input changed anything.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Drives one map session's unit actions from discrete input events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionStateMachine {
    state: ActionState,
    cursor: GridPos,
    unit_info: Option<UnitIndex>,
}

impl ActionStateMachine {
    /// Create an idle machine with the cursor on `cursor`.
    #[must_use]
    pub fn new(cursor: GridPos) -> Self {
        Self {
            state: ActionState::Idle,
            cursor,
            unit_info: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ActionState {
        &self.state
    }

    /// Cursor cell.
    #[must_use]
    pub const fn cursor(&self) -> GridPos {
        self.cursor
    }

    /// Unit shown in the info panel, if open.
    #[must_use]
    pub const fn unit_info(&self) -> Option<UnitIndex> {
        self.unit_info
    }

    /// Overlays of the selected unit, only while in `UnitSelected`.
    #[must_use]
    pub fn ranges(&self) -> Option<&Ranges> {
        match &self.state {
            ActionState::UnitSelected { ranges, .. } => Some(ranges),
            _ => None,
        }
    }

    /// Apply one input event.
    ///
    /// # Errors
    ///
    /// Returns an error only if the machine refers to a unit that is no
    /// longer in the roster.
    pub fn handle(&mut self, field: &mut Battlefield, event: InputEvent) -> Result<Feedback> {
        let before = self.state.name();
        let feedback = match event {
            InputEvent::MoveCursor { dx, dy } => self.move_cursor(field, dx, dy),
            InputEvent::Select => self.select(field)?,
            InputEvent::Cancel => self.cancel_step(field)?,
            InputEvent::NavigateMenu(delta) => self.navigate_menu(field, delta)?,
            InputEvent::ConfirmMenu => self.confirm_menu(field)?,
            InputEvent::ToggleUnitInfo => self.toggle_unit_info(field),
        };
        if !feedback.is_ignored() {
            tracing::debug!(
                ?event,
                from = before,
                to = self.state.name(),
                ?feedback,
                "Handled input"
            );
        }
        Ok(feedback)
    }

    /// Move the cursor, clamped into the grid. Inert while a menu is open.
    pub fn move_cursor(&mut self, field: &Battlefield, dx: i32, dy: i32) -> Feedback {
        if self.state.in_menu() {
            return Feedback::Ignored;
        }
        let target = field.grid.clamp(
            i64::from(self.cursor.x) + i64::from(dx),
            i64::from(self.cursor.y) + i64::from(dy),
        );
        if target == self.cursor {
            return Feedback::Ignored;
        }
        self.cursor = target;
        Feedback::CursorMoved { to: target }
    }

    /// Act on the cursor cell, or confirm the highlighted row inside menus.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected unit is missing from the roster.
    pub fn select(&mut self, field: &mut Battlefield) -> Result<Feedback> {
        match &self.state {
            ActionState::Idle => {
                let Some(index) = field.roster.unit_at(self.cursor) else {
                    return Ok(Feedback::Ignored);
                };
                if !field.roster.get(index)?.can_act() {
                    return Ok(Feedback::Ignored);
                }
                let ranges = field.ranges_for(index)?;
                self.state = ActionState::UnitSelected {
                    unit: index,
                    ranges,
                };
                Ok(Feedback::UnitSelected { unit: index })
            }
            ActionState::UnitSelected { unit, ranges } => {
                let unit = *unit;
                if !ranges.movement.contains(&self.cursor) {
                    return Ok(Feedback::Ignored);
                }
                let from = field.roster.get(unit)?.position;
                let to = self.cursor;
                field.roster.move_unit(unit, to)?;
                self.state = ActionState::ActionMenu {
                    unit,
                    origin: from,
                    cursor: 0,
                };
                Ok(Feedback::UnitMoved { unit, from, to })
            }
            _ => self.confirm_menu(field),
        }
    }

    /// Back out one step.
    ///
    /// Returns `false` when there was nothing to cancel, which lets the host
    /// treat cancel in `Idle` as "leave the map".
    ///
    /// # Errors
    ///
    /// Returns an error if the selected unit is missing from the roster.
    pub fn cancel(&mut self, field: &mut Battlefield) -> Result<bool> {
        Ok(!self.cancel_step(field)?.is_ignored())
    }

    fn cancel_step(&mut self, field: &mut Battlefield) -> Result<Feedback> {
        match &mut self.state {
            ActionState::Idle => {
                if self.unit_info.take().is_some() {
                    return Ok(Feedback::UnitInfoHidden);
                }
                Ok(Feedback::Ignored)
            }
            ActionState::UnitSelected { .. } => {
                self.state = ActionState::Idle;
                Ok(Feedback::SelectionCleared)
            }
            ActionState::ActionMenu { unit, origin, .. } => {
                let (unit, origin) = (*unit, *origin);
                field.roster.move_unit(unit, origin)?;
                self.cursor = origin;
                let ranges = field.ranges_for(unit)?;
                self.state = ActionState::UnitSelected { unit, ranges };
                Ok(Feedback::MoveReverted { unit, to: origin })
            }
            ActionState::InventoryMenu {
                unit,
                origin,
                snapshot,
                ..
            } => {
                let (unit, origin) = (*unit, *origin);
                snapshot.restore(field.roster.get_mut(unit)?);
                self.state = ActionState::ActionMenu {
                    unit,
                    origin,
                    cursor: 0,
                };
                Ok(Feedback::InventoryClosed)
            }
            ActionState::DropConfirm { .. } => {
                self.close_drop_confirm();
                Ok(Feedback::DropCancelled)
            }
        }
    }

    /// Move the menu highlight by `delta` rows, wrapping at both ends.
    /// Inert outside menus.
    ///
    /// # Errors
    ///
    /// Returns an error if the acting unit is missing from the roster.
    pub fn navigate_menu(&mut self, field: &Battlefield, delta: i32) -> Result<Feedback> {
        if delta == 0 {
            return Ok(Feedback::Ignored);
        }
        let row = match &mut self.state {
            ActionState::Idle | ActionState::UnitSelected { .. } => return Ok(Feedback::Ignored),
            ActionState::ActionMenu { cursor, .. } => {
                *cursor = wrap(*cursor, delta, ActionMenuRow::ALL.len());
                *cursor
            }
            ActionState::InventoryMenu { unit, cursor, .. } => {
                let rows = field.roster.get(*unit)?.inventory.len() + 1;
                *cursor = wrap(*cursor, delta, rows);
                *cursor
            }
            ActionState::DropConfirm { choice, .. } => {
                *choice = DropChoice::from_index(wrap(choice.index(), delta, 2));
                choice.index()
            }
        };
        Ok(Feedback::MenuMoved { row })
    }

    /// Confirm the highlighted menu row, or act on the map outside menus.
    ///
    /// # Errors
    ///
    /// Returns an error if the acting unit is missing from the roster.
    pub fn confirm_menu(&mut self, field: &mut Battlefield) -> Result<Feedback> {
        match &mut self.state {
            ActionState::Idle | ActionState::UnitSelected { .. } => self.select(field),
            ActionState::ActionMenu {
                unit,
                origin,
                cursor,
            } => {
                let (unit, origin) = (*unit, *origin);
                match ActionMenuRow::from_index(*cursor) {
                    Some(ActionMenuRow::Inventory) => {
                        let snapshot = InventorySnapshot::capture(field.roster.get(unit)?);
                        self.state = ActionState::InventoryMenu {
                            unit,
                            origin,
                            cursor: 0,
                            snapshot,
                        };
                        Ok(Feedback::InventoryOpened)
                    }
                    Some(ActionMenuRow::Wait) => {
                        field.roster.mark_moved(unit)?;
                        self.state = ActionState::Idle;
                        Ok(Feedback::Waited { unit })
                    }
                    None => Ok(Feedback::Ignored),
                }
            }
            ActionState::InventoryMenu {
                unit,
                cursor,
                snapshot,
                ..
            } => {
                let (unit, slot) = (*unit, *cursor);
                let member = field.roster.get(unit)?;
                if slot < member.inventory.len() {
                    if !field.equipment.can_wield_item(member, &member.inventory[slot]) {
                        return Ok(Feedback::EquipRejected { unit, slot });
                    }
                    snapshot.equipped = Some(slot);
                    field.roster.get_mut(unit)?.equipped = Some(slot);
                    Ok(Feedback::Equipped { unit, slot })
                } else if member.equipped_item().is_some() {
                    self.open_drop_confirm();
                    Ok(Feedback::DropRequested)
                } else {
                    Ok(Feedback::Ignored)
                }
            }
            ActionState::DropConfirm { choice, .. } => match *choice {
                DropChoice::Yes => self.drop_equipped(field),
                DropChoice::No => {
                    self.close_drop_confirm();
                    Ok(Feedback::DropCancelled)
                }
            },
        }
    }

    /// Open or close the unit-info panel.
    ///
    /// Opens for the unit under the cursor in map states; closes from any
    /// state. Selection is never touched.
    pub fn toggle_unit_info(&mut self, field: &Battlefield) -> Feedback {
        if self.unit_info.take().is_some() {
            return Feedback::UnitInfoHidden;
        }
        if self.state.in_menu() {
            return Feedback::Ignored;
        }
        match field.roster.unit_at(self.cursor) {
            Some(unit) => {
                self.unit_info = Some(unit);
                Feedback::UnitInfoShown { unit }
            }
            None => Feedback::Ignored,
        }
    }

    fn open_drop_confirm(&mut self) {
        if let ActionState::InventoryMenu {
            unit,
            origin,
            cursor,
            snapshot,
        } = std::mem::take(&mut self.state)
        {
            self.state = ActionState::DropConfirm {
                unit,
                origin,
                cursor,
                snapshot,
                choice: DropChoice::default(),
            };
        }
    }

    fn close_drop_confirm(&mut self) {
        if let ActionState::DropConfirm {
            unit,
            origin,
            cursor,
            snapshot,
            ..
        } = std::mem::take(&mut self.state)
        {
            self.state = ActionState::InventoryMenu {
                unit,
                origin,
                cursor,
                snapshot,
            };
        }
    }

    fn drop_equipped(&mut self, field: &mut Battlefield) -> Result<Feedback> {
        let ActionState::DropConfirm {
            unit,
            origin,
            cursor,
            ..
        } = self.state
        else {
            return Ok(Feedback::Ignored);
        };

        let member = field.roster.get_mut(unit)?;
        let Some(slot) = member.equipped.filter(|&slot| slot < member.inventory.len()) else {
            self.close_drop_confirm();
            return Ok(Feedback::DropCancelled);
        };
        let item = member.inventory.remove(slot);
        member.equipped = None;
        let member = field.roster.get(unit)?;
        let equipped = field.equipment.first_wieldable(member);

        let member = field.roster.get_mut(unit)?;
        member.equipped = equipped;
        let snapshot = InventorySnapshot::capture(member);
        let cursor = cursor.min(member.inventory.len());

        self.state = ActionState::InventoryMenu {
            unit,
            origin,
            cursor,
            snapshot,
        };
        Ok(Feedback::Dropped {
            unit,
            item,
            equipped,
        })
    }
}

/// Step `current` by `delta` within `0..rows`, wrapping.
fn wrap(current: usize, delta: i32, rows: usize) -> usize {
    if rows == 0 {
        return 0;
    }
    let rows = rows as i64;
    (current as i64 + i64::from(delta)).rem_euclid(rows) as usize
}
