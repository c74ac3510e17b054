use std::collections::HashMap;
use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::{DbStatus, FreeAgentData, Player, SpotValue, UnusedRosterSpots};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_BASE: &str = "http://127.0.0.1:5001";

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// True when a backend base URL is configured; otherwise the demo provider
/// serves generated data.
pub fn backend_configured() -> bool {
    env::var("FHL_API_BASE").is_ok_and(|v| !v.trim().is_empty())
}

fn api_base() -> String {
    env::var("FHL_API_BASE")
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

pub fn fetch_free_agent_data(
    team_name: Option<&str>,
    categories: &[String],
) -> Result<FreeAgentData> {
    let client = http_client()?;
    let url = format!("{}/api/free_agent_data", api_base());

    let mut payload = serde_json::Map::new();
    if let Some(team) = team_name {
        payload.insert("team_name".to_string(), json!(team));
    }
    if !categories.is_empty() {
        payload.insert("categories".to_string(), json!(categories));
    }

    let resp = client
        .post(&url)
        .json(&Value::Object(payload))
        .send()
        .context("free_agent_data request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        bail!("http {}: {}", status, body);
    }
    parse_free_agent_data_json(&body)
}

pub fn fetch_available_players_timestamp() -> Result<Option<String>> {
    let body = get_json("/api/available_players_timestamp")?;
    parse_timestamp_json(&body)
}

pub fn fetch_db_status() -> Result<DbStatus> {
    let body = get_json("/api/db_status")?;
    parse_db_status_json(&body)
}

/// Kicks off the long-running league database rebuild. Completion is
/// observed separately by polling `/api/db_status`.
pub fn start_db_update(capture_lineups: bool) -> Result<()> {
    let client = http_client()?;
    let url = format!("{}/api/update_db", api_base());
    let resp = client
        .post(&url)
        .json(&json!({ "capture_lineups": capture_lineups }))
        .send()
        .context("update_db request failed")?;
    let status = resp.status();
    if !status.is_success() && status.as_u16() != 202 {
        let body = resp.text().unwrap_or_default();
        bail!("http {}: {}", status, body);
    }
    Ok(())
}

fn get_json(path: &str) -> Result<String> {
    let client = http_client()?;
    let url = format!("{}{}", api_base(), path);
    let resp = client
        .get(&url)
        .send()
        .with_context(|| format!("{path} request failed"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        bail!("http {}: {}", status, body);
    }
    Ok(body)
}

#[derive(Debug, Default, Deserialize)]
struct RawFreeAgentData {
    #[serde(default)]
    waiver_players: Vec<RawPlayer>,
    #[serde(default)]
    free_agents: Vec<RawPlayer>,
    #[serde(default)]
    scoring_categories: Vec<String>,
    #[serde(default)]
    ranked_categories: Vec<String>,
    #[serde(default)]
    checked_categories: Vec<String>,
    #[serde(default)]
    unused_roster_spots: HashMap<String, HashMap<String, Value>>,
    #[serde(default)]
    team_roster: Vec<RawPlayer>,
    #[serde(default)]
    week_dates: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(default)]
    player_id: Value,
    #[serde(default)]
    name: String,
    #[serde(default, alias = "editorial_team_abbr")]
    team: String,
    #[serde(default, alias = "eligible_positions")]
    positions: Vec<String>,
    #[serde(default, alias = "cat_ranks")]
    ranks: HashMap<String, Value>,
    #[serde(default)]
    overall_rank: Value,
    #[serde(default)]
    games_this_week: Vec<String>,
    #[serde(default)]
    games_next_week: Vec<String>,
}

pub fn parse_free_agent_data_json(raw: &str) -> Result<FreeAgentData> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(FreeAgentData::default());
    }
    let raw: RawFreeAgentData =
        serde_json::from_str(trimmed).context("invalid free_agent_data json")?;
    Ok(FreeAgentData {
        waiver_players: build_players(raw.waiver_players),
        free_agents: build_players(raw.free_agents),
        scoring_categories: raw.scoring_categories,
        ranked_categories: raw.ranked_categories,
        checked_categories: raw.checked_categories,
        unused_roster_spots: build_unused_spots(raw.unused_roster_spots),
        team_roster: build_players(raw.team_roster),
        week_dates: raw
            .week_dates
            .iter()
            .filter_map(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .collect(),
    })
}

pub fn parse_db_status_json(raw: &str) -> Result<DbStatus> {
    serde_json::from_str(raw.trim()).context("invalid db_status json")
}

pub fn parse_timestamp_json(raw: &str) -> Result<Option<String>> {
    #[derive(Deserialize)]
    struct TimestampResponse {
        #[serde(default)]
        timestamp: Value,
    }
    let parsed: TimestampResponse =
        serde_json::from_str(raw.trim()).context("invalid timestamp json")?;
    Ok(match parsed.timestamp {
        Value::String(s) => {
            let trimmed = s.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn build_players(raw: Vec<RawPlayer>) -> Vec<Player> {
    raw.into_iter().filter_map(build_player).collect()
}

// Ids arrive as numbers from the database and as strings from form values;
// both normalize to one canonical string form here, at the ingestion
// boundary. Rows with no usable id are dropped.
fn build_player(raw: RawPlayer) -> Option<Player> {
    let id = id_string(&raw.player_id)?;
    Some(Player {
        id,
        name: raw.name,
        team: raw.team,
        positions: raw.positions,
        cat_ranks: raw
            .ranks
            .into_iter()
            .map(|(cat, value)| (cat, rank_value(&value)))
            .collect(),
        overall_rank: rank_value(&raw.overall_rank),
        games_this_week: raw.games_this_week,
        games_next_week: raw.games_next_week,
    })
}

pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Rank cells come back as a number, null, or a "-" placeholder; anything
/// that is not a positive finite number counts as "no rank".
pub fn rank_value(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    num.filter(|v| v.is_finite() && *v > 0.0)
}

fn build_unused_spots(raw: HashMap<String, HashMap<String, Value>>) -> UnusedRosterSpots {
    raw.into_iter()
        .map(|(day, positions)| {
            let converted = positions
                .into_iter()
                .filter_map(|(pos, value)| spot_value(&value).map(|v| (pos, v)))
                .collect();
            (day, converted)
        })
        .collect()
}

fn spot_value(value: &Value) -> Option<SpotValue> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| SpotValue::Count(n as u32)),
        Value::String(s) => Some(SpotValue::Projected(s.clone())),
        _ => None,
    }
}
