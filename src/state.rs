use std::collections::{HashMap, VecDeque};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::{self, Filters, SortConfig, FREE_AGENT_ROW_CAP, SORT_KEY_NAME, SORT_KEY_OVERALL};
use crate::simulator::{DropCandidate, DropTarget, Simulator};

pub const POSITION_CODES: [&str; 5] = ["C", "LW", "RW", "D", "G"];
pub const DAY_CODES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// A skater or goalie as served by the backend. Identity is the canonical
/// string id; everything else is immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub cat_ranks: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub overall_rank: Option<f64>,
    #[serde(default)]
    pub games_this_week: Vec<String>,
    #[serde(default)]
    pub games_next_week: Vec<String>,
}

impl Player {
    /// Rank under a sort/heatmap key. Zero and non-finite values count as
    /// "no rank", matching the backend's dash placeholder.
    pub fn rank_for(&self, key: &str) -> Option<f64> {
        let value = if key == SORT_KEY_OVERALL {
            self.overall_rank
        } else {
            self.cat_ranks.get(key).copied().flatten()
        };
        value.filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// Per-day, per-position open roster spots. An integer is a firm count; a
/// string is the backend's "projected open spot" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpotValue {
    Count(u32),
    Projected(String),
}

impl SpotValue {
    pub fn label(&self) -> String {
        match self {
            SpotValue::Count(n) => n.to_string(),
            SpotValue::Projected(s) => s.clone(),
        }
    }
}

pub type UnusedRosterSpots = HashMap<String, HashMap<String, SpotValue>>;

/// Payload of `POST /api/free_agent_data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreeAgentData {
    pub waiver_players: Vec<Player>,
    pub free_agents: Vec<Player>,
    pub scoring_categories: Vec<String>,
    pub ranked_categories: Vec<String>,
    pub checked_categories: Vec<String>,
    pub unused_roster_spots: UnusedRosterSpots,
    pub team_roster: Vec<Player>,
    pub week_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DbStatus {
    #[serde(default)]
    pub db_exists: bool,
    #[serde(default)]
    pub league_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Players,
    Roster,
    Moves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerTab {
    Waivers,
    FreeAgents,
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Players => "Players",
        Screen::Roster => "Roster",
        Screen::Moves => "Moves",
    }
}

pub fn tab_label(tab: PlayerTab) -> &'static str {
    match tab {
        PlayerTab::Waivers => "Waivers",
        PlayerTab::FreeAgents => "Free Agents",
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub tab: PlayerTab,
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
    pub search_active: bool,
    pub waiver_sort: SortConfig,
    pub free_agent_sort: SortConfig,
    pub simulator: Simulator,
    /// Player id currently checked for an add, if any.
    pub pending_add: Option<String>,
    pub selected: usize,
    pub roster_selected: usize,
    pub drop_selected: usize,
    pub date_selected: usize,
    pub loading: bool,
    pub available_players_at: Option<String>,
    pub db_status: Option<DbStatus>,
    pub db_updating: bool,
    /// Blocking alert for simulator validation failures.
    pub notice: Option<String>,
    /// Inline message for network/cache failures; prior content stays drawn.
    pub last_error: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Players,
            tab: PlayerTab::Waivers,
            waiver_players: Vec::new(),
            free_agents: Vec::new(),
            team_roster: Vec::new(),
            unused_roster_spots: UnusedRosterSpots::new(),
            scoring_categories: Vec::new(),
            ranked_categories: Vec::new(),
            checked_categories: Vec::new(),
            week_dates: Vec::new(),
            selected_team: None,
            filters: Filters::default(),
            search_active: false,
            waiver_sort: SortConfig::default(),
            free_agent_sort: SortConfig::default(),
            simulator: Simulator::default(),
            pending_add: None,
            selected: 0,
            roster_selected: 0,
            drop_selected: 0,
            date_selected: 0,
            loading: false,
            available_players_at: None,
            db_status: None,
            db_updating: false,
            notice: None,
            last_error: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn active_pool(&self) -> &[Player] {
        match self.tab {
            PlayerTab::Waivers => &self.waiver_players,
            PlayerTab::FreeAgents => &self.free_agents,
        }
    }

    pub fn active_sort(&self) -> &SortConfig {
        match self.tab {
            PlayerTab::Waivers => &self.waiver_sort,
            PlayerTab::FreeAgents => &self.free_agent_sort,
        }
    }

    pub fn active_sort_mut(&mut self) -> &mut SortConfig {
        match self.tab {
            PlayerTab::Waivers => &mut self.waiver_sort,
            PlayerTab::FreeAgents => &mut self.free_agent_sort,
        }
    }

    /// The rows currently on screen for the player list: filtered, sorted,
    /// and capped for the free-agent tab.
    pub fn visible_players(&self) -> Vec<Player> {
        let cap = match self.tab {
            PlayerTab::Waivers => None,
            PlayerTab::FreeAgents => Some(FREE_AGENT_ROW_CAP),
        };
        filter::filter_and_sort(self.active_pool(), &self.filters, self.active_sort(), cap)
    }

    pub fn selected_player(&self) -> Option<Player> {
        self.visible_players().get(self.selected).cloned()
    }

    pub fn sort_keys(&self) -> Vec<String> {
        let mut keys = vec![SORT_KEY_NAME.to_string(), SORT_KEY_OVERALL.to_string()];
        keys.extend(self.checked_categories.iter().cloned());
        keys
    }

    pub fn cycle_sort_key(&mut self) {
        let keys = self.sort_keys();
        if keys.is_empty() {
            return;
        }
        let current = self.active_sort().key.clone();
        let next = keys
            .iter()
            .position(|k| *k == current)
            .map(|i| keys[(i + 1) % keys.len()].clone())
            .unwrap_or_else(|| keys[0].clone());
        self.active_sort_mut().select(&next);
        self.selected = 0;
    }

    /// The header-reclick path: toggles direction on the active key.
    pub fn reselect_sort_key(&mut self) {
        let current = self.active_sort().key.clone();
        self.active_sort_mut().select(&current);
        self.selected = 0;
    }

    pub fn cycle_tab(&mut self) {
        self.tab = match self.tab {
            PlayerTab::Waivers => PlayerTab::FreeAgents,
            PlayerTab::FreeAgents => PlayerTab::Waivers,
        };
        self.selected = 0;
    }

    pub fn toggle_position(&mut self, code: &str) {
        self.filters.toggle_position(code);
        self.selected = 0;
    }

    pub fn toggle_day(&mut self, code: &str) {
        self.filters.toggle_day(code);
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let total = self.selection_total();
        let slot = self.selection_slot_mut();
        if total == 0 {
            *slot = 0;
            return;
        }
        *slot = (*slot + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.selection_total();
        let slot = self.selection_slot_mut();
        if total == 0 {
            *slot = 0;
            return;
        }
        if *slot == 0 {
            *slot = total - 1;
        } else {
            *slot -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.selection_total();
        let slot = self.selection_slot_mut();
        if total == 0 {
            *slot = 0;
        } else if *slot >= total {
            *slot = total - 1;
        }
    }

    fn selection_total(&self) -> usize {
        match self.screen {
            Screen::Players => self.visible_players().len(),
            Screen::Roster => self.team_roster.len(),
            Screen::Moves => self.drop_candidates().len(),
        }
    }

    fn selection_slot_mut(&mut self) -> &mut usize {
        match self.screen {
            Screen::Players => &mut self.selected,
            Screen::Roster => &mut self.roster_selected,
            Screen::Moves => &mut self.drop_selected,
        }
    }

    /// Checks or unchecks the highlighted player for an add. Players already
    /// consumed by a simulated move raise a notice instead.
    pub fn toggle_pending_add(&mut self) {
        let Some(player) = self.selected_player() else {
            return;
        };
        if self.simulator.is_added(&player.id) {
            self.notice = Some(format!(
                "{} was already added by a simulated move",
                player.name
            ));
            return;
        }
        if self.pending_add.as_deref() == Some(player.id.as_str()) {
            self.pending_add = None;
        } else {
            self.pending_add = Some(player.id);
        }
    }

    pub fn drop_candidates(&self) -> Vec<DropCandidate> {
        self.simulator.drop_candidates(&self.team_roster)
    }

    pub fn selected_drop_target(&self) -> Option<DropTarget> {
        let candidates = self.drop_candidates();
        candidates.get(self.drop_selected).map(|c| {
            if c.added_on.is_some() {
                DropTarget::Simulated(c.player.id.clone())
            } else {
                DropTarget::Roster(c.player.id.clone())
            }
        })
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.week_dates.get(self.date_selected).copied()
    }

    pub fn date_next(&mut self) {
        if self.week_dates.is_empty() {
            self.date_selected = 0;
            return;
        }
        self.date_selected = (self.date_selected + 1) % self.week_dates.len();
    }

    pub fn date_prev(&mut self) {
        if self.week_dates.is_empty() {
            self.date_selected = 0;
            return;
        }
        if self.date_selected == 0 {
            self.date_selected = self.week_dates.len() - 1;
        } else {
            self.date_selected -= 1;
        }
    }

    /// Replaces all fetched lists wholesale. Filter and sort selections are
    /// kept unless the new category set no longer carries the sort key.
    pub fn apply_free_agent_data(&mut self, data: FreeAgentData) {
        self.waiver_players = data.waiver_players;
        self.free_agents = data.free_agents;
        self.scoring_categories = data.scoring_categories;
        self.ranked_categories = data.ranked_categories;
        self.checked_categories = data.checked_categories;
        self.unused_roster_spots = data.unused_roster_spots;
        self.team_roster = data.team_roster;
        self.week_dates = data.week_dates;

        let keys = self.sort_keys();
        if !keys.contains(&self.waiver_sort.key) {
            self.waiver_sort = SortConfig::default();
        }
        if !keys.contains(&self.free_agent_sort.key) {
            self.free_agent_sort = SortConfig::default();
        }

        self.pending_add = None;
        if self.date_selected >= self.week_dates.len() {
            self.date_selected = 0;
        }
        self.loading = false;
        self.last_error = None;
        self.clamp_selection();
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetFreeAgentData(FreeAgentData),
    SetAvailableTimestamp(String),
    SetDbStatus(DbStatus),
    DbUpdateStarted,
    DbUpdateFinished { success: bool, message: String },
    InlineError(String),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchFreeAgentData {
        team_name: Option<String>,
        categories: Vec<String>,
    },
    FetchAvailableTimestamp,
    FetchDbStatus,
    StartDbUpdate {
        capture_lineups: bool,
    },
    CancelDbUpdate,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetFreeAgentData(data) => {
            state.apply_free_agent_data(data);
            state.push_log("[INFO] Free agent data refreshed");
        }
        Delta::SetAvailableTimestamp(ts) => {
            state.available_players_at = Some(ts);
        }
        Delta::SetDbStatus(status) => {
            state.db_status = Some(status);
        }
        Delta::DbUpdateStarted => {
            state.db_updating = true;
            state.push_log("[INFO] League database update started");
        }
        Delta::DbUpdateFinished { success, message } => {
            state.db_updating = false;
            if success {
                state.push_log(format!("[INFO] {message}"));
            } else {
                state.last_error = Some(message.clone());
                state.push_log(format!("[WARN] {message}"));
            }
        }
        Delta::InlineError(message) => {
            state.loading = false;
            state.last_error = Some(message);
        }
        Delta::Log(message) => state.push_log(message),
    }
}
