//! Discrete input events consumed by the action state machine.

use serde::{Deserialize, Serialize};

/// One player input, already translated from keys or buttons.
///
/// JSON form: `{"move_cursor": {"dx": 1, "dy": 0}}`, `"select"`,
/// `{"navigate_menu": -1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    /// Move the map cursor by a cell offset.
    MoveCursor {
        /// Column offset.
        dx: i32,
        /// Row offset.
        dy: i32,
    },
    /// Act on the cell under the cursor.
    Select,
    /// Back out of the current step.
    Cancel,
    /// Move the menu highlight; the sign gives the direction.
    NavigateMenu(i32),
    /// Confirm the highlighted menu row.
    ConfirmMenu,
    /// Open or close the unit-info panel.
    ToggleUnitInfo,
}

impl InputEvent {
    /// Cursor step one cell left.
    pub const LEFT: Self = Self::MoveCursor { dx: -1, dy: 0 };
    /// Cursor step one cell right.
    pub const RIGHT: Self = Self::MoveCursor { dx: 1, dy: 0 };
    /// Cursor step one cell up.
    pub const UP: Self = Self::MoveCursor { dx: 0, dy: -1 };
    /// Cursor step one cell down.
    pub const DOWN: Self = Self::MoveCursor { dx: 0, dy: 1 };
}
