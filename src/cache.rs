use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::{Filters, SortConfig};
use crate::simulator::SimulatedMove;
use crate::state::{AppState, Player, UnusedRosterSpots};

const CACHE_DIR: &str = "fhl_terminal";
const PAGE_STATE_FILE: &str = "page_state.json";
const SIMULATION_FILE: &str = "simulation.json";
const CACHE_VERSION: u32 = 1;

/// Free-agent page snapshots go stale quickly; anything older is refetched.
pub const FREE_AGENTS_TTL: Duration = Duration::from_secs(300);

/// One page's working state: the fetched lists plus the user's filter, sort,
/// and team selections, stamped with the capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    version: u32,
    pub captured_at: u64,
    pub waiver_players: Vec<Player>,
    pub free_agents: Vec<Player>,
    pub team_roster: Vec<Player>,
    pub unused_roster_spots: UnusedRosterSpots,
    pub scoring_categories: Vec<String>,
    pub ranked_categories: Vec<String>,
    pub checked_categories: Vec<String>,
    pub week_dates: Vec<NaiveDate>,
    pub selected_team: Option<String>,
    pub filters: Filters,
    pub waiver_sort: SortConfig,
    pub free_agent_sort: SortConfig,
}

impl PageSnapshot {
    pub fn capture(state: &AppState) -> Self {
        Self {
            version: CACHE_VERSION,
            captured_at: now_secs(),
            waiver_players: state.waiver_players.clone(),
            free_agents: state.free_agents.clone(),
            team_roster: state.team_roster.clone(),
            unused_roster_spots: state.unused_roster_spots.clone(),
            scoring_categories: state.scoring_categories.clone(),
            ranked_categories: state.ranked_categories.clone(),
            checked_categories: state.checked_categories.clone(),
            week_dates: state.week_dates.clone(),
            selected_team: state.selected_team.clone(),
            filters: state.filters.clone(),
            waiver_sort: state.waiver_sort.clone(),
            free_agent_sort: state.free_agent_sort.clone(),
        }
    }

    pub fn restore(self, state: &mut AppState) {
        state.waiver_players = self.waiver_players;
        state.free_agents = self.free_agents;
        state.team_roster = self.team_roster;
        state.unused_roster_spots = self.unused_roster_spots;
        state.scoring_categories = self.scoring_categories;
        state.ranked_categories = self.ranked_categories;
        state.checked_categories = self.checked_categories;
        state.week_dates = self.week_dates;
        state.selected_team = self.selected_team;
        state.filters = self.filters;
        state.waiver_sort = self.waiver_sort;
        state.free_agent_sort = self.free_agent_sort;
        state.clamp_selection();
    }
}

/// Best-effort: callers log failures, they never abort anything.
pub fn save_page_state(state: &AppState) -> Result<()> {
    let Some(path) = cache_path(PAGE_STATE_FILE) else {
        return Ok(());
    };
    write_page_snapshot(&path, &PageSnapshot::capture(state))
}

/// Restores the page snapshot into `state` when one exists and is fresh.
pub fn load_page_state(state: &mut AppState) -> bool {
    let Some(path) = cache_path(PAGE_STATE_FILE) else {
        return false;
    };
    match read_page_snapshot(&path, FREE_AGENTS_TTL, now_secs()) {
        Some(snapshot) => {
            snapshot.restore(state);
            true
        }
        None => false,
    }
}

pub fn write_page_snapshot(path: &Path, snapshot: &PageSnapshot) -> Result<()> {
    write_json(path, snapshot)
}

/// Returns the snapshot while `now - captured_at <= ttl`. An expired slot is
/// deleted; malformed JSON or a version mismatch reads as absent.
pub fn read_page_snapshot(path: &Path, ttl: Duration, now_secs: u64) -> Option<PageSnapshot> {
    let raw = fs::read_to_string(path).ok()?;
    let snapshot = serde_json::from_str::<PageSnapshot>(&raw).ok()?;
    if snapshot.version != CACHE_VERSION {
        return None;
    }
    if now_secs.saturating_sub(snapshot.captured_at) > ttl.as_secs() {
        let _ = fs::remove_file(path);
        return None;
    }
    Some(snapshot)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SimulationFile {
    version: u32,
    moves: Vec<SimulatedMove>,
}

// The simulated-move log lives in its own TTL-less slot: it survives
// restarts until explicitly reset.

pub fn save_simulation(moves: &[SimulatedMove]) -> Result<()> {
    let Some(path) = cache_path(SIMULATION_FILE) else {
        return Ok(());
    };
    write_simulation(&path, moves)
}

pub fn load_simulation() -> Vec<SimulatedMove> {
    let Some(path) = cache_path(SIMULATION_FILE) else {
        return Vec::new();
    };
    read_simulation(&path)
}

pub fn clear_simulation() {
    if let Some(path) = cache_path(SIMULATION_FILE) {
        let _ = fs::remove_file(path);
    }
}

pub fn write_simulation(path: &Path, moves: &[SimulatedMove]) -> Result<()> {
    write_json(
        path,
        &SimulationFile {
            version: CACHE_VERSION,
            moves: moves.to_vec(),
        },
    )
}

pub fn read_simulation(path: &Path) -> Vec<SimulatedMove> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    let Ok(file) = serde_json::from_str::<SimulationFile>(&raw) else {
        return Vec::new();
    };
    if file.version != CACHE_VERSION {
        return Vec::new();
    }
    file.moves
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value).context("serialize cache slot")?;
    fs::write(&tmp, json).context("write cache slot")?;
    fs::rename(&tmp, path).context("swap cache slot")?;
    Ok(())
}

fn cache_path(file: &str) -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(file));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(file))
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
