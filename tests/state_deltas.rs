use std::collections::HashMap;

use chrono::NaiveDate;
use fhl_terminal::filter::{SortConfig, SortDirection, SORT_KEY_OVERALL};
use fhl_terminal::state::{
    apply_delta, AppState, DbStatus, Delta, FreeAgentData, PlayerTab, Player, Screen,
};

fn player(id: &str, name: &str, overall: Option<f64>) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        team: "NYR".to_string(),
        positions: vec!["C".to_string()],
        cat_ranks: HashMap::new(),
        overall_rank: overall,
        games_this_week: Vec::new(),
        games_next_week: Vec::new(),
    }
}

fn sample_data() -> FreeAgentData {
    FreeAgentData {
        waiver_players: vec![player("w1", "Waiver One", Some(3.0))],
        free_agents: vec![
            player("f1", "Free One", Some(2.0)),
            player("f2", "Free Two", Some(1.0)),
        ],
        scoring_categories: vec!["G".to_string(), "A".to_string()],
        ranked_categories: vec!["G".to_string(), "A".to_string()],
        checked_categories: vec!["G".to_string()],
        unused_roster_spots: Default::default(),
        team_roster: vec![player("r1", "Roster One", Some(5.0))],
        week_dates: vec![NaiveDate::parse_from_str("2024-01-08", "%Y-%m-%d").unwrap()],
    }
}

#[test]
fn fresh_data_clears_pending_add_and_loading() {
    let mut state = AppState::new();
    state.loading = true;
    state.pending_add = Some("w1".to_string());
    state.last_error = Some("old failure".to_string());

    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));

    assert!(!state.loading);
    assert_eq!(state.pending_add, None);
    assert_eq!(state.last_error, None);
    assert_eq!(state.waiver_players.len(), 1);
    assert_eq!(state.team_roster.len(), 1);
}

#[test]
fn fresh_data_resets_sorts_on_vanished_keys() {
    let mut state = AppState::new();
    state.free_agent_sort = SortConfig {
        key: "BLK".to_string(),
        direction: SortDirection::Descending,
    };
    state.waiver_sort = SortConfig {
        key: "G".to_string(),
        direction: SortDirection::Descending,
    };

    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));

    // "BLK" is no longer a checked category; "G" still is.
    assert_eq!(state.free_agent_sort, SortConfig::default());
    assert_eq!(state.waiver_sort.key, "G");
    assert_eq!(state.waiver_sort.direction, SortDirection::Descending);
}

#[test]
fn sort_keys_follow_the_checked_categories() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));

    assert_eq!(state.sort_keys(), vec!["name", "overall", "G"]);
}

#[test]
fn cycle_sort_key_walks_the_key_ring() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));
    assert_eq!(state.active_sort().key, SORT_KEY_OVERALL);

    state.cycle_sort_key();
    assert_eq!(state.active_sort().key, "G");
    state.cycle_sort_key();
    assert_eq!(state.active_sort().key, "name");
    state.cycle_sort_key();
    assert_eq!(state.active_sort().key, SORT_KEY_OVERALL);
}

#[test]
fn each_tab_keeps_its_own_sort() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));

    state.reselect_sort_key();
    assert_eq!(state.active_sort().direction, SortDirection::Descending);

    state.cycle_tab();
    assert_eq!(state.tab, PlayerTab::FreeAgents);
    assert_eq!(state.active_sort().direction, SortDirection::Ascending);
}

#[test]
fn free_agent_tab_sorts_by_overall_by_default() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));
    state.cycle_tab();

    let visible = state.visible_players();
    assert_eq!(visible[0].name, "Free Two");
    assert_eq!(visible[1].name, "Free One");
}

#[test]
fn selection_wraps_within_the_visible_list() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));
    state.cycle_tab();
    assert_eq!(state.selected, 0);

    state.select_next();
    assert_eq!(state.selected, 1);
    state.select_next();
    assert_eq!(state.selected, 0);
    state.select_prev();
    assert_eq!(state.selected, 1);
}

#[test]
fn selection_clamps_when_the_list_shrinks() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));
    state.cycle_tab();
    state.selected = 1;

    state.filters.search = "Free One".to_string();
    state.clamp_selection();
    assert_eq!(state.selected, 0);
}

#[test]
fn toggling_a_pending_add_twice_unchecks_it() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));

    state.toggle_pending_add();
    assert_eq!(state.pending_add.as_deref(), Some("w1"));
    state.toggle_pending_add();
    assert_eq!(state.pending_add, None);
}

#[test]
fn db_update_failure_surfaces_as_inline_error() {
    let mut state = AppState::new();

    apply_delta(&mut state, Delta::DbUpdateStarted);
    assert!(state.db_updating);

    apply_delta(
        &mut state,
        Delta::DbUpdateFinished {
            success: false,
            message: "update request failed".to_string(),
        },
    );
    assert!(!state.db_updating);
    assert_eq!(state.last_error.as_deref(), Some("update request failed"));
}

#[test]
fn status_and_timestamp_deltas_land_in_state() {
    let mut state = AppState::new();

    apply_delta(
        &mut state,
        Delta::SetDbStatus(DbStatus {
            db_exists: true,
            league_name: Some("Puck Hogs".to_string()),
            timestamp: Some(1704700000),
        }),
    );
    apply_delta(
        &mut state,
        Delta::SetAvailableTimestamp("2024-01-08 10:30".to_string()),
    );

    assert!(state.db_status.as_ref().is_some_and(|s| s.db_exists));
    assert_eq!(
        state.available_players_at.as_deref(),
        Some("2024-01-08 10:30")
    );
}

#[test]
fn moves_screen_selects_among_drop_candidates() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetFreeAgentData(sample_data()));
    state.screen = Screen::Moves;

    state.select_next();
    assert_eq!(state.drop_selected, 0, "single candidate wraps to itself");
    let target = state.selected_drop_target().unwrap();
    assert_eq!(
        target,
        fhl_terminal::simulator::DropTarget::Roster("r1".to_string())
    );
}
