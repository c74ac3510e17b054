use std::collections::HashMap;

use chrono::NaiveDate;
use fhl_terminal::filter::{SortConfig, SortDirection, SORT_KEY_NAME, SORT_KEY_OVERALL};
use fhl_terminal::simulator::{DropTarget, Simulator};
use fhl_terminal::state::Player;
use fhl_terminal::table::{header_labels, player_columns, player_rows, sort_indicator};

fn player(id: &str, name: &str, overall: Option<f64>) -> Player {
    let mut cat_ranks = HashMap::new();
    cat_ranks.insert("G".to_string(), Some(7.0));
    cat_ranks.insert("A".to_string(), None);
    Player {
        id: id.to_string(),
        name: name.to_string(),
        team: "COL".to_string(),
        positions: vec!["C".to_string(), "RW".to_string()],
        cat_ranks,
        overall_rank: overall,
        games_this_week: vec!["Mon".to_string(), "Thu".to_string()],
        games_next_week: Vec::new(),
    }
}

#[test]
fn columns_follow_the_checked_categories() {
    let checked = vec!["G".to_string(), "A".to_string()];
    let columns = player_columns(&checked);

    let keys: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["add", SORT_KEY_NAME, "team", "pos", "games", SORT_KEY_OVERALL, "G", "A"]
    );
}

#[test]
fn sort_indicator_marks_only_the_active_column() {
    let sort = SortConfig {
        key: SORT_KEY_OVERALL.to_string(),
        direction: SortDirection::Ascending,
    };
    assert_eq!(sort_indicator(SORT_KEY_OVERALL, &sort), " ^");
    assert_eq!(sort_indicator("G", &sort), "");

    let sort = SortConfig {
        key: "G".to_string(),
        direction: SortDirection::Descending,
    };
    let columns = player_columns(&["G".to_string()]);
    let labels = header_labels(&columns, &sort);
    assert!(labels.contains(&"G v".to_string()));
    assert!(labels.contains(&"ROS".to_string()));
}

#[test]
fn rank_cells_carry_the_numeric_rank_for_coloring() {
    let columns = player_columns(&["G".to_string(), "A".to_string()]);
    let players = vec![player("1", "Nathan", Some(2.0))];
    let rows = player_rows(&players, &columns, &Simulator::default(), None);

    let row = &rows[0];
    // ROS column.
    assert_eq!(row[5].text, "2");
    assert_eq!(row[5].rank, Some(2.0));
    // Present category.
    assert_eq!(row[6].text, "7");
    assert_eq!(row[6].rank, Some(7.0));
    // Missing category renders the dash and stays uncolored.
    assert_eq!(row[7].text, "-");
    assert_eq!(row[7].rank, None);
    // Text columns carry no rank.
    assert_eq!(row[1].text, "Nathan");
    assert_eq!(row[1].rank, None);
}

#[test]
fn fractional_ranks_keep_one_decimal() {
    let columns = player_columns(&[]);
    let players = vec![player("1", "Cale", Some(3.5))];
    let rows = player_rows(&players, &columns, &Simulator::default(), None);
    assert_eq!(rows[0][5].text, "3.5");
}

#[test]
fn add_marker_reflects_pending_and_consumed_players() {
    let columns = player_columns(&[]);
    let players = vec![
        player("p1", "Pending", Some(1.0)),
        player("p2", "Plain", Some(2.0)),
        player("p3", "Consumed", Some(3.0)),
    ];

    let mut sim = Simulator::default();
    let roster = vec![player("r1", "Roster", Some(9.0))];
    sim.simulate_move(
        &players,
        &[],
        &roster,
        Some("p3"),
        Some(&DropTarget::Roster("r1".to_string())),
        Some(NaiveDate::parse_from_str("2024-01-08", "%Y-%m-%d").unwrap()),
    )
    .unwrap();

    let rows = player_rows(&players, &columns, &sim, Some("p1"));
    assert_eq!(rows[0][0].text, "[x]");
    assert_eq!(rows[1][0].text, "[ ]");
    assert_eq!(rows[2][0].text, "used");
}
