//! End-to-end unit action flows driven through a map session.

use tactics_core::prelude::*;
use tactics_test_utils::fixtures::{drive, lone_seth, open_map, place, FixtureRecords};

fn seth(session: &MapSession) -> Unit {
    session
        .battlefield()
        .and_then(|field| field.roster().get(0).ok())
        .cloned()
        .unwrap()
}

fn set_seth_inventory(records: &mut FixtureRecords, items: &[&str]) {
    let seth = records
        .units
        .get_mut("player")
        .and_then(|player| player.get_mut("seth"))
        .unwrap();
    seth.current_inventory = items.iter().map(|item| item.to_string()).collect();
}

fn open_inventory() -> Vec<InputEvent> {
    vec![InputEvent::Select, InputEvent::Select, InputEvent::ConfirmMenu]
}

#[test]
fn cancel_from_action_menu_restores_position_and_ranges() {
    let mut session = lone_seth().session(Rules::default());
    drive(&mut session, &[InputEvent::Select]);
    let first = session.view().unwrap().movement.cloned().unwrap();

    drive(
        &mut session,
        &[InputEvent::LEFT, InputEvent::LEFT, InputEvent::Select],
    );
    assert_eq!(seth(&session).position, GridPos::new(0, 2));

    assert!(session.cancel().unwrap());
    assert_eq!(seth(&session).position, GridPos::new(2, 2));
    assert_eq!(session.view().unwrap().cursor, GridPos::new(2, 2));
    assert_eq!(session.view().unwrap().movement.cloned().unwrap(), first);

    // Back out completely and reselect: same range again.
    assert!(session.cancel().unwrap());
    assert!(!session.cancel().unwrap());
    drive(&mut session, &[InputEvent::Select]);
    assert_eq!(session.view().unwrap().movement.cloned().unwrap(), first);
}

#[test]
fn equipping_unwieldable_item_changes_nothing() {
    let mut session = lone_seth().session(Rules::default());
    assert_eq!(seth(&session).inventory, vec!["iron_sword", "iron_axe"]);

    drive(&mut session, &open_inventory());
    let feedback = drive(&mut session, &[InputEvent::NavigateMenu(1), InputEvent::ConfirmMenu]);

    assert_eq!(feedback[1], Feedback::EquipRejected { unit: 0, slot: 1 });
    assert_eq!(seth(&session).equipped, Some(0));
}

#[test]
fn equip_survives_inventory_cancel() {
    let mut records = lone_seth();
    set_seth_inventory(&mut records, &["iron_axe", "iron_sword", "flame_blade"]);
    let mut session = records.session(Rules::default());
    assert_eq!(seth(&session).equipped, Some(1));

    drive(&mut session, &open_inventory());
    let feedback = drive(
        &mut session,
        &[InputEvent::NavigateMenu(1), InputEvent::NavigateMenu(1), InputEvent::ConfirmMenu],
    );
    assert_eq!(feedback[2], Feedback::Equipped { unit: 0, slot: 2 });

    assert!(session.cancel().unwrap());
    assert_eq!(seth(&session).equipped_item(), Some("flame_blade"));
    assert!(matches!(
        session.machine().unwrap().state(),
        ActionState::ActionMenu { cursor: 0, .. }
    ));
}

#[test]
fn dropped_item_stays_dropped_after_inventory_cancel() {
    let mut session = lone_seth().session(Rules::default());
    let before = seth(&session).inventory.len();

    drive(&mut session, &open_inventory());
    // Drop row sits after the two items.
    let feedback = drive(
        &mut session,
        &[
            InputEvent::NavigateMenu(1),
            InputEvent::NavigateMenu(1),
            InputEvent::ConfirmMenu,
            InputEvent::ConfirmMenu,
        ],
    );
    assert_eq!(feedback[2], Feedback::DropRequested);
    assert!(matches!(feedback[3], Feedback::Dropped { .. }));

    assert!(session.cancel().unwrap());
    let unit = seth(&session);
    assert_eq!(unit.inventory.len(), before - 1);
    assert_eq!(unit.inventory, vec!["iron_axe"]);
    // Axe is not wieldable by a lord.
    assert_eq!(unit.equipped, None);
}

#[test]
fn drop_reequips_next_wieldable_item() {
    let mut records = lone_seth();
    set_seth_inventory(&mut records, &["iron_sword", "vulnerary", "flame_blade"]);
    let mut session = records.session(Rules::default());

    drive(&mut session, &open_inventory());
    let feedback = drive(
        &mut session,
        &[
            InputEvent::NavigateMenu(-1),
            InputEvent::ConfirmMenu,
            InputEvent::ConfirmMenu,
        ],
    );
    assert_eq!(
        feedback[2],
        Feedback::Dropped {
            unit: 0,
            item: "iron_sword".to_string(),
            equipped: Some(1),
        }
    );
    assert_eq!(seth(&session).equipped_item(), Some("flame_blade"));
}

#[test]
fn moved_unit_cannot_be_selected() {
    let mut session = lone_seth().session(Rules::default());
    drive(
        &mut session,
        &[
            InputEvent::Select,
            InputEvent::Select,
            InputEvent::NavigateMenu(1),
            InputEvent::ConfirmMenu,
        ],
    );
    assert!(seth(&session).has_moved);

    let feedback = drive(&mut session, &[InputEvent::Select]);
    assert!(feedback[0].is_ignored());
    assert_eq!(session.view().unwrap().state, "idle");
}

#[test]
fn cannot_move_onto_other_unit() {
    let records = FixtureRecords::new(open_map(
        5,
        5,
        vec![
            place(Faction::Player, "seth", 2, 2),
            place(Faction::Enemy, "brigand", 3, 2),
        ],
    ));
    let mut session = records.session(Rules::default());
    let feedback = drive(
        &mut session,
        &[InputEvent::Select, InputEvent::RIGHT, InputEvent::Select],
    );

    assert!(feedback[2].is_ignored());
    assert_eq!(seth(&session).position, GridPos::new(2, 2));
}

#[test]
fn unit_info_does_not_touch_selection() {
    let records = FixtureRecords::new(open_map(
        5,
        5,
        vec![
            place(Faction::Player, "seth", 2, 2),
            place(Faction::Enemy, "brigand", 4, 2),
        ],
    ));
    let mut session = records.session(Rules::default());
    drive(
        &mut session,
        &[InputEvent::Select, InputEvent::RIGHT, InputEvent::RIGHT],
    );
    let feedback = drive(&mut session, &[InputEvent::ToggleUnitInfo]);
    assert_eq!(feedback[0], Feedback::UnitInfoShown { unit: 1 });

    let view = session.view().unwrap();
    assert_eq!(view.selected, Some(0));
    assert_eq!(view.unit_info.map(|unit| unit.name.as_str()), Some("Brigand"));
    assert!(view.movement.is_some());
}

#[test]
fn cancel_in_idle_closes_info_panel() {
    let mut session = lone_seth().session(Rules::default());
    let feedback = drive(&mut session, &[InputEvent::ToggleUnitInfo]);
    assert_eq!(feedback[0], Feedback::UnitInfoShown { unit: 0 });

    assert!(session.cancel().unwrap());
    let view = session.view().unwrap();
    assert!(view.unit_info.is_none());
    assert_eq!(view.state, "idle");

    // Nothing left to back out of.
    assert!(!session.cancel().unwrap());
}

#[test]
fn cursor_clamped_at_edges() {
    let mut session = lone_seth().session(Rules::default());
    let feedback = drive(
        &mut session,
        &[
            InputEvent::MoveCursor { dx: -10, dy: 0 },
            InputEvent::LEFT,
            InputEvent::MoveCursor { dx: 7, dy: 7 },
        ],
    );
    assert_eq!(feedback[0], Feedback::CursorMoved { to: GridPos::new(0, 2) });
    assert!(feedback[1].is_ignored());
    assert_eq!(session.view().unwrap().cursor, GridPos::new(4, 4));
}

#[test]
fn display_name_lookup_parity() {
    let mut records = lone_seth();
    // Class record keyed differently from the unit's class id, but whose
    // display name equals that id.
    let mut lord = records.classes.remove("lord").unwrap();
    lord[0].name = "lord".to_string();
    records.classes.insert("lord_v2".to_string(), lord);

    let by_id = records.battlefield(Rules::default());
    let unit = by_id.roster().get(0).unwrap();
    assert_eq!(unit.class_name, "lord");
    assert_eq!(unit.equipped, None);

    let by_name = records.battlefield(Rules {
        class_lookup: ClassLookup::ByDisplayName,
        ..Rules::default()
    });
    assert_eq!(by_name.roster().get(0).unwrap().equipped, Some(0));
}
