//! Recording playback, determinism and atomic loading.

use proptest::prelude::*;

use tactics_core::prelude::*;
use tactics_test_utils::determinism::{find_first_divergence, record_and_replay, verify_determinism};
use tactics_test_utils::fixtures::{drive, lone_seth, open_map, place, FixtureRecords};
use tactics_test_utils::strategies::{arb_input_stream, arb_scenario};

fn full_turn() -> Vec<InputEvent> {
    vec![
        InputEvent::Select,
        InputEvent::UP,
        InputEvent::Select,
        InputEvent::ConfirmMenu,
        InputEvent::NavigateMenu(1),
        InputEvent::ConfirmMenu,
        InputEvent::Cancel,
        InputEvent::NavigateMenu(1),
        InputEvent::ConfirmMenu,
    ]
}

#[test]
fn recording_replays_to_same_hash() {
    let records = lone_seth();
    let recording = record_and_replay(|| records.session(Rules::default()), &full_turn()).unwrap();
    assert_eq!(recording.len(), full_turn().len());
}

#[test]
fn tampered_recording_is_detected() {
    let records = lone_seth();
    let mut live = records.session(Rules::default());
    let mut recording = InputRecording::new("Fixture");
    for event in full_turn() {
        live.handle(event).unwrap();
        recording.record(event);
    }
    recording.finalize(live.state_hash().unwrap().wrapping_add(1));

    let err = recording
        .play(&mut records.session(Rules::default()))
        .unwrap_err();
    assert!(matches!(err, TacticsError::PlaybackDiverged { .. }));
}

#[test]
fn recording_survives_file_round_trip() {
    let records = lone_seth();
    let mut live = records.session(Rules::default());
    let mut recording = InputRecording::new("Fixture");
    for event in full_turn() {
        live.handle(event).unwrap();
        recording.record(event);
    }
    recording.finalize(live.state_hash().unwrap());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("turn.rec");
    recording.save(&path).unwrap();

    let loaded = InputRecording::load(&path).unwrap();
    let hash = loaded.play(&mut records.session(Rules::default())).unwrap();
    assert_eq!(hash, recording.final_hash);
}

#[test]
fn malformed_load_leaves_session_intact() {
    let good = FixtureRecords::new(open_map(4, 4, vec![place(Faction::Player, "seth", 1, 1)]));
    let mut session = good.session(Rules::default());
    drive(&mut session, &[InputEvent::Select, InputEvent::RIGHT]);
    let hash = session.state_hash();

    // Two units on one cell.
    let crowded = FixtureRecords::new(open_map(
        4,
        4,
        vec![
            place(Faction::Player, "seth", 0, 0),
            place(Faction::Enemy, "brigand", 0, 0),
        ],
    ));
    assert!(crowded.load_into(&mut session, Rules::default()).is_err());

    // Layer shorter than the grid.
    let mut short = good.clone();
    short.map.layers[0].data.pop();
    assert!(matches!(
        short.load_into(&mut session, Rules::default()),
        Err(TacticsError::LayerSizeMismatch { .. })
    ));

    assert_eq!(session.state_hash(), hash);
    assert_eq!(session.view().unwrap().cursor, GridPos::new(2, 1));
}

#[test]
fn cost_aware_sessions_are_deterministic() {
    let rules = Rules {
        movement: MovementRule::CostAware,
        ..Rules::default()
    };
    let records = lone_seth();
    verify_determinism(4, || records.session(rules.clone()), &full_turn()).assert_deterministic();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_input_is_deterministic(
        scenario in arb_scenario(),
        events in arb_input_stream(40),
    ) {
        let records = scenario.records();
        let setup = || records.session(Rules::default());

        prop_assert_eq!(find_first_divergence(setup, &events), None);
        prop_assert!(record_and_replay(setup, &events).is_ok());
    }

    #[test]
    fn prop_roster_never_shares_cells(
        scenario in arb_scenario(),
        events in arb_input_stream(60),
    ) {
        let mut session = scenario.records().session(Rules::default());
        for event in events {
            session.handle(event).unwrap();
            let field = session.battlefield().unwrap();
            let mut cells: Vec<_> = field.roster().iter().map(|(_, unit)| unit.position).collect();
            cells.sort();
            let before = cells.len();
            cells.dedup();
            prop_assert_eq!(before, cells.len());
        }
    }
}
