use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::state::Player;

pub const SORT_KEY_NAME: &str = "name";
pub const SORT_KEY_OVERALL: &str = "overall";

/// Free agents are a deep pool; only the top slice is worth rendering.
/// Waivers are small and stay uncapped.
pub const FREE_AGENT_ROW_CAP: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub search: String,
    pub positions: BTreeSet<String>,
    pub days: BTreeSet<String>,
}

impl Filters {
    pub fn matches(&self, player: &Player) -> bool {
        self.matches_search(player) && self.matches_positions(player) && self.matches_days(player)
    }

    pub fn matches_search(&self, player: &Player) -> bool {
        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        player.name.to_lowercase().contains(&query)
    }

    /// OR-semantics: any eligible position in the selected set passes.
    pub fn matches_positions(&self, player: &Player) -> bool {
        if self.positions.is_empty() {
            return true;
        }
        player
            .positions
            .iter()
            .any(|pos| self.positions.contains(pos))
    }

    /// AND-semantics: the player must have a game on every selected day.
    pub fn matches_days(&self, player: &Player) -> bool {
        if self.days.is_empty() {
            return true;
        }
        self.days
            .iter()
            .all(|day| player.games_this_week.iter().any(|game| game == day))
    }

    pub fn toggle_position(&mut self, code: &str) {
        if !self.positions.remove(code) {
            self.positions.insert(code.to_string());
        }
    }

    pub fn toggle_day(&mut self, code: &str) {
        if !self.days.remove(code) {
            self.days.insert(code.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.positions.is_empty() && self.days.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SORT_KEY_OVERALL.to_string(),
            direction: SortDirection::Ascending,
        }
    }
}

impl SortConfig {
    /// Header-click semantics: re-selecting the active key flips direction,
    /// selecting a new key resets to ascending.
    pub fn select(&mut self, key: &str) {
        if self.key == key {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.key = key.to_string();
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Applies the search/position/day predicates and the configured sort,
/// returning a new vector. `cap` bounds the output length when set.
pub fn filter_and_sort(
    players: &[Player],
    filters: &Filters,
    sort: &SortConfig,
    cap: Option<usize>,
) -> Vec<Player> {
    let mut out: Vec<Player> = players
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect();
    sort_players(&mut out, sort);
    if let Some(cap) = cap {
        out.truncate(cap);
    }
    out
}

pub fn sort_players(players: &mut [Player], sort: &SortConfig) {
    if sort.key == SORT_KEY_NAME {
        players.sort_by(|a, b| {
            let ord = a.name.to_lowercase().cmp(&b.name.to_lowercase());
            apply_direction(ord, sort.direction)
        });
    } else {
        let key = sort.key.as_str();
        players.sort_by(|a, b| compare_ranks(a.rank_for(key), b.rank_for(key), sort.direction));
    }
}

/// Missing ranks (null, zero, placeholder) sort strictly after present ones
/// in both directions, so "no rank" players always land at the bottom.
fn compare_ranks(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            apply_direction(ord, direction)
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn apply_direction(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}
