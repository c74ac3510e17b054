use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use chrono::NaiveDate;
use fhl_terminal::cache::{
    read_page_snapshot, read_simulation, write_page_snapshot, write_simulation, PageSnapshot,
    FREE_AGENTS_TTL,
};
use fhl_terminal::simulator::SimulatedMove;
use fhl_terminal::state::{AppState, Player};

fn player(id: &str, name: &str) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        team: "EDM".to_string(),
        positions: vec!["LW".to_string()],
        cat_ranks: HashMap::new(),
        overall_rank: Some(4.0),
        games_this_week: Vec::new(),
        games_next_week: Vec::new(),
    }
}

fn populated_state() -> AppState {
    let mut state = AppState::new();
    state.waiver_players = vec![player("w1", "Waiver One")];
    state.free_agents = vec![player("f1", "Free One")];
    state.team_roster = vec![player("r1", "Roster One")];
    state.checked_categories = vec!["G".to_string(), "A".to_string()];
    state.selected_team = Some("Puck Hogs".to_string());
    state.filters.search = "one".to_string();
    state
}

#[test]
fn page_snapshot_roundtrip_within_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page_state.json");

    let snapshot = PageSnapshot::capture(&populated_state());
    let captured_at = snapshot.captured_at;
    write_page_snapshot(&path, &snapshot).unwrap();

    let loaded = read_page_snapshot(&path, Duration::from_secs(120), captured_at + 60)
        .expect("fresh snapshot should load");
    let mut restored = AppState::new();
    loaded.restore(&mut restored);

    assert_eq!(restored.waiver_players.len(), 1);
    assert_eq!(restored.free_agents[0].name, "Free One");
    assert_eq!(restored.selected_team.as_deref(), Some("Puck Hogs"));
    assert_eq!(restored.filters.search, "one");
}

#[test]
fn expired_page_snapshot_is_discarded_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page_state.json");

    let snapshot = PageSnapshot::capture(&populated_state());
    let captured_at = snapshot.captured_at;
    write_page_snapshot(&path, &snapshot).unwrap();

    let loaded = read_page_snapshot(&path, Duration::from_secs(120), captured_at + 121);
    assert!(loaded.is_none());
    assert!(!path.exists(), "expired slot should be deleted");
}

#[test]
fn snapshot_at_exact_ttl_boundary_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page_state.json");

    let snapshot = PageSnapshot::capture(&populated_state());
    let captured_at = snapshot.captured_at;
    write_page_snapshot(&path, &snapshot).unwrap();

    let ttl = FREE_AGENTS_TTL;
    let loaded = read_page_snapshot(&path, ttl, captured_at + ttl.as_secs());
    assert!(loaded.is_some());
}

#[test]
fn malformed_page_snapshot_reads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page_state.json");
    fs::write(&path, "{not json").unwrap();

    let loaded = read_page_snapshot(&path, Duration::from_secs(120), 0);
    assert!(loaded.is_none());
}

#[test]
fn version_mismatch_reads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page_state.json");

    let snapshot = PageSnapshot::capture(&populated_state());
    let captured_at = snapshot.captured_at;
    write_page_snapshot(&path, &snapshot).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let bumped = raw.replacen("\"version\":1", "\"version\":99", 1);
    assert_ne!(raw, bumped, "fixture should contain the version field");
    fs::write(&path, bumped).unwrap();

    let loaded = read_page_snapshot(&path, Duration::from_secs(120), captured_at);
    assert!(loaded.is_none());
}

#[test]
fn simulation_slot_roundtrips_without_a_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simulation.json");

    let moves = vec![SimulatedMove {
        date: NaiveDate::parse_from_str("2024-01-08", "%Y-%m-%d").unwrap(),
        added: player("f1", "Free One"),
        dropped: player("r1", "Roster One"),
    }];
    write_simulation(&path, &moves).unwrap();

    let loaded = read_simulation(&path);
    assert_eq!(loaded, moves);
}

#[test]
fn missing_simulation_slot_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simulation.json");
    assert!(read_simulation(&path).is_empty());
}

#[test]
fn malformed_simulation_slot_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simulation.json");
    fs::write(&path, "[1, 2,").unwrap();
    assert!(read_simulation(&path).is_empty());
}
