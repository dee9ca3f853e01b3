//! Headless runner driven over in-memory JSON lines.

use std::io::Cursor;

use serde_json::Value;

use tactics_core::prelude::*;
use tactics_test_utils::fixtures::lone_seth;
use tactics_tools::data_loader::DataLoadError;
use tactics_tools::runner::{replay, HeadlessConfig, HeadlessRunner};

fn run_script(runner: &mut HeadlessRunner, script: &str) -> Vec<Value> {
    let mut output = Vec::new();
    runner.run(Cursor::new(script), &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

const TURN: &str = r#"
{"cmd":"input","event":"select"}
{"cmd":"input","event":{"move_cursor":{"dx":0,"dy":-1}}}
{"cmd":"input","event":"select"}
{"cmd":"query"}
{"cmd":"input","event":{"navigate_menu":1}}
{"cmd":"input","event":"confirm_menu"}
{"cmd":"hash"}
"#;

#[test]
fn scripted_turn_produces_one_response_per_command() {
    let mut runner = HeadlessRunner::new(lone_seth().session(Rules::default()), &HeadlessConfig::default());
    let responses = run_script(&mut runner, TURN);

    assert_eq!(responses.len(), 8);
    assert_eq!(responses[0]["type"], "ready");
    assert_eq!(responses[0]["map"], "Fixture");
    assert_eq!(responses[1]["feedback"]["kind"], "unit_selected");
    assert_eq!(responses[2]["feedback"]["kind"], "cursor_moved");
    assert_eq!(responses[3]["feedback"]["kind"], "unit_moved");

    let state = &responses[4];
    assert_eq!(state["type"], "state");
    assert_eq!(state["view"]["state"], "action_menu");
    assert_eq!(state["view"]["menu"]["menu"], "action");
    assert_eq!(state["view"]["menu"]["rows"], serde_json::json!(["Inventory", "Wait"]));

    assert_eq!(responses[6]["feedback"]["kind"], "waited");
    assert_eq!(responses[7]["type"], "state_hash");
    assert_eq!(responses[7]["events"], 5);

    let seth = runner.session().battlefield().unwrap().roster().get(0).unwrap();
    assert_eq!(seth.position, GridPos::new(2, 1));
    assert!(seth.has_moved);
}

#[test]
fn malformed_lines_are_reported_and_skipped() {
    let mut runner = HeadlessRunner::new(lone_seth().session(Rules::default()), &HeadlessConfig::default());
    let responses = run_script(
        &mut runner,
        "not json\n{\"cmd\":\"fly\"}\n\n{\"cmd\":\"input\",\"event\":\"select\"}\n",
    );

    assert_eq!(responses.len(), 4);
    assert_eq!(responses[1]["type"], "error");
    assert_eq!(responses[2]["type"], "error");
    assert_eq!(responses[3]["feedback"]["kind"], "unit_selected");
}

#[test]
fn quit_stops_reading() {
    let mut runner = HeadlessRunner::new(lone_seth().session(Rules::default()), &HeadlessConfig::default());
    let responses = run_script(
        &mut runner,
        "{\"cmd\":\"quit\"}\n{\"cmd\":\"input\",\"event\":\"select\"}\n",
    );

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[1]["type"], "bye");
    assert_eq!(runner.events(), 0);
}

#[test]
fn clear_moved_lets_units_act_again() {
    let mut runner = HeadlessRunner::new(lone_seth().session(Rules::default()), &HeadlessConfig::default());
    let responses = run_script(
        &mut runner,
        r#"
{"cmd":"input","event":"select"}
{"cmd":"input","event":"select"}
{"cmd":"input","event":{"navigate_menu":1}}
{"cmd":"input","event":"confirm_menu"}
{"cmd":"input","event":"select"}
{"cmd":"clear_moved","faction":"player"}
{"cmd":"input","event":"select"}
"#,
    );

    assert_eq!(responses[5]["feedback"]["kind"], "ignored");
    assert_eq!(responses[6]["count"], 1);
    assert_eq!(responses[7]["feedback"]["kind"], "unit_selected");
}

#[test]
fn recorded_run_replays_to_same_hash() {
    let records = lone_seth();
    let mut runner = HeadlessRunner::new(records.session(Rules::default()), &HeadlessConfig { record: true });
    let responses = run_script(&mut runner, TURN);
    let reported = responses[7]["hash"].as_u64().unwrap();

    let recording = runner.finish().unwrap();
    assert_eq!(recording.len(), 5);
    assert_eq!(recording.final_hash, reported);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("turn.rec");
    recording.save(&path).unwrap();

    let loaded = InputRecording::load(&path).unwrap();
    let mut fresh = records.session(Rules::default());
    assert_eq!(replay(&loaded, &mut fresh).unwrap(), reported);
}

#[test]
fn replay_detects_other_rules() {
    let records = lone_seth();
    let mut runner = HeadlessRunner::new(records.session(Rules::default()), &HeadlessConfig { record: true });
    run_script(&mut runner, "{\"cmd\":\"input\",\"event\":\"select\"}\n");
    let recording = runner.finish().unwrap();

    // Seth's sword only reaches one cell, so the attack overlay differs.
    let mut other = records.session(Rules {
        threat_reach: ThreatReach::EquippedWeapon,
        ..Rules::default()
    });
    assert!(matches!(
        replay(&recording, &mut other),
        Err(DataLoadError::Core(TacticsError::PlaybackDiverged { .. }))
    ));
}
