use chrono::NaiveDate;
use fhl_terminal::api::{
    parse_db_status_json, parse_free_agent_data_json, parse_timestamp_json,
};
use fhl_terminal::state::SpotValue;

const FIXTURE: &str = include_str!("fixtures/free_agent_data.json");

#[test]
fn parses_the_full_payload() {
    let data = parse_free_agent_data_json(FIXTURE).unwrap();

    // Row with no usable id is dropped.
    assert_eq!(data.waiver_players.len(), 3);
    assert_eq!(data.free_agents.len(), 1);
    assert_eq!(data.team_roster.len(), 1);
    assert_eq!(data.scoring_categories.len(), 6);
    assert_eq!(data.checked_categories, vec!["G", "A", "PPP"]);
}

#[test]
fn ids_normalize_to_strings_regardless_of_json_type() {
    let data = parse_free_agent_data_json(FIXTURE).unwrap();
    let ids: Vec<&str> = data.waiver_players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["4712", "4713", "4714"]);
}

#[test]
fn placeholder_and_zero_ranks_read_as_missing() {
    let data = parse_free_agent_data_json(FIXTURE).unwrap();

    let miro = &data.waiver_players[0];
    assert_eq!(miro.rank_for("G"), Some(5.0));
    assert_eq!(miro.rank_for("A"), None, "dash placeholder");

    let cole = &data.waiver_players[1];
    assert_eq!(cole.rank_for("G"), None, "null rank");
    assert_eq!(cole.rank_for("PPP"), Some(8.5), "stringified number");
    assert_eq!(cole.overall_rank, None);

    let anton = &data.waiver_players[2];
    assert_eq!(anton.rank_for("A"), None, "zero placeholder");

    let danny = &data.free_agents[0];
    assert_eq!(danny.overall_rank, Some(14.0));
}

#[test]
fn team_and_position_aliases_are_honored() {
    let data = parse_free_agent_data_json(FIXTURE).unwrap();
    let miro = &data.waiver_players[0];
    assert_eq!(miro.team, "DAL");
    assert_eq!(miro.positions, vec!["C", "LW"]);
}

#[test]
fn unused_spots_keep_counts_and_projected_sentinels() {
    let data = parse_free_agent_data_json(FIXTURE).unwrap();

    let monday = &data.unused_roster_spots["Mon"];
    assert_eq!(monday["RW"], SpotValue::Count(2));

    let tuesday = &data.unused_roster_spots["Tue"];
    assert_eq!(tuesday["C"], SpotValue::Projected("1*".to_string()));
    assert_eq!(tuesday["C"].label(), "1*");
}

#[test]
fn unparseable_week_dates_are_skipped() {
    let data = parse_free_agent_data_json(FIXTURE).unwrap();
    let expected: Vec<NaiveDate> = ["2024-01-08", "2024-01-09", "2024-01-10"]
        .iter()
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
        .collect();
    assert_eq!(data.week_dates, expected);
}

#[test]
fn empty_and_null_bodies_read_as_default() {
    assert_eq!(parse_free_agent_data_json("").unwrap(), Default::default());
    assert_eq!(
        parse_free_agent_data_json("null").unwrap(),
        Default::default()
    );
}

#[test]
fn garbage_body_is_an_error() {
    assert!(parse_free_agent_data_json("{oops").is_err());
}

#[test]
fn db_status_parses_with_missing_fields() {
    let status =
        parse_db_status_json(r#"{"db_exists": true, "league_name": "Puck Hogs", "timestamp": 1704700000}"#)
            .unwrap();
    assert!(status.db_exists);
    assert_eq!(status.league_name.as_deref(), Some("Puck Hogs"));
    assert_eq!(status.timestamp, Some(1704700000));

    let bare = parse_db_status_json("{}").unwrap();
    assert!(!bare.db_exists);
    assert_eq!(bare.league_name, None);
}

#[test]
fn timestamp_accepts_strings_and_numbers() {
    assert_eq!(
        parse_timestamp_json(r#"{"timestamp": "2024-01-08 10:30"}"#).unwrap(),
        Some("2024-01-08 10:30".to_string())
    );
    assert_eq!(
        parse_timestamp_json(r#"{"timestamp": 1704700000}"#).unwrap(),
        Some("1704700000".to_string())
    );
    assert_eq!(parse_timestamp_json(r#"{"timestamp": ""}"#).unwrap(), None);
    assert_eq!(parse_timestamp_json(r#"{"timestamp": null}"#).unwrap(), None);
    assert_eq!(parse_timestamp_json("{}").unwrap(), None);
}
