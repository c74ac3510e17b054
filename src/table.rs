use crate::filter::{SortConfig, SortDirection, SORT_KEY_NAME, SORT_KEY_OVERALL};
use crate::simulator::Simulator;
use crate::state::Player;

pub const ADD_KEY: &str = "add";
const TEAM_KEY: &str = "team";
const POS_KEY: &str = "pos";
const GAMES_KEY: &str = "games";

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub width: u16,
}

impl Column {
    fn new(key: &str, label: &str, width: u16) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            width,
        }
    }
}

/// One rendered cell. `rank` carries the numeric rank behind a rank cell so
/// the renderer can apply the heatmap color.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCell {
    pub text: String,
    pub rank: Option<f64>,
}

impl RowCell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rank: None,
        }
    }
}

/// Fixed columns plus one rank column per checked scoring category.
pub fn player_columns(checked_categories: &[String]) -> Vec<Column> {
    let mut columns = vec![
        Column::new(ADD_KEY, "Add", 5),
        Column::new(SORT_KEY_NAME, "Player", 22),
        Column::new(TEAM_KEY, "Team", 5),
        Column::new(POS_KEY, "Pos", 9),
        Column::new(GAMES_KEY, "Games", 16),
        Column::new(SORT_KEY_OVERALL, "ROS", 6),
    ];
    for cat in checked_categories {
        columns.push(Column::new(cat, cat, 6));
    }
    columns
}

pub fn header_labels(columns: &[Column], sort: &SortConfig) -> Vec<String> {
    columns
        .iter()
        .map(|col| format!("{}{}", col.label, sort_indicator(&col.key, sort)))
        .collect()
}

pub fn sort_indicator(key: &str, sort: &SortConfig) -> &'static str {
    if sort.key != key {
        return "";
    }
    match sort.direction {
        SortDirection::Ascending => " ^",
        SortDirection::Descending => " v",
    }
}

pub fn player_rows(
    players: &[Player],
    columns: &[Column],
    simulator: &Simulator,
    pending_add: Option<&str>,
) -> Vec<Vec<RowCell>> {
    players
        .iter()
        .map(|player| player_row(player, columns, simulator, pending_add))
        .collect()
}

fn player_row(
    player: &Player,
    columns: &[Column],
    simulator: &Simulator,
    pending_add: Option<&str>,
) -> Vec<RowCell> {
    columns
        .iter()
        .map(|col| match col.key.as_str() {
            ADD_KEY => RowCell::plain(add_marker(player, simulator, pending_add)),
            SORT_KEY_NAME => RowCell::plain(player.name.clone()),
            TEAM_KEY => RowCell::plain(player.team.clone()),
            POS_KEY => RowCell::plain(player.positions.join(",")),
            GAMES_KEY => RowCell::plain(player.games_this_week.join(" ")),
            key => {
                let rank = player.rank_for(key);
                RowCell {
                    text: rank_text(rank),
                    rank,
                }
            }
        })
        .collect()
}

/// A player consumed by a simulated add cannot be checked again until the
/// simulator is reset.
fn add_marker(player: &Player, simulator: &Simulator, pending_add: Option<&str>) -> String {
    if simulator.is_added(&player.id) {
        "used".to_string()
    } else if pending_add == Some(player.id.as_str()) {
        "[x]".to_string()
    } else {
        "[ ]".to_string()
    }
}

fn rank_text(rank: Option<f64>) -> String {
    match rank {
        Some(r) if r.fract() == 0.0 => format!("{}", r as i64),
        Some(r) => format!("{r:.1}"),
        None => "-".to_string(),
    }
}
