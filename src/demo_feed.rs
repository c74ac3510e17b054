use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::state::{
    DbStatus, Delta, FreeAgentData, Player, ProviderCommand, SpotValue, UnusedRosterSpots,
    DAY_CODES, POSITION_CODES,
};

/// Offline provider used when no backend base URL is configured: answers
/// the same commands as the real one with generated league data.
pub fn spawn_demo_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let _ = tx.send(Delta::Log("[INFO] Demo provider active (FHL_API_BASE unset)".to_string()));
        loop {
            match cmd_rx.recv_timeout(Duration::from_millis(200)) {
                Ok(cmd) => handle_command(cmd, &tx, &mut rng),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}

fn handle_command(cmd: ProviderCommand, tx: &Sender<Delta>, rng: &mut ThreadRng) {
    match cmd {
        ProviderCommand::FetchFreeAgentData { .. } => {
            let _ = tx.send(Delta::SetFreeAgentData(sample_free_agent_data(rng)));
        }
        ProviderCommand::FetchAvailableTimestamp => {
            let ts = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
            let _ = tx.send(Delta::SetAvailableTimestamp(ts));
        }
        ProviderCommand::FetchDbStatus => {
            let _ = tx.send(Delta::SetDbStatus(DbStatus {
                db_exists: true,
                league_name: Some("Demo League".to_string()),
                timestamp: Some(Utc::now().timestamp()),
            }));
        }
        ProviderCommand::StartDbUpdate { .. } => {
            let _ = tx.send(Delta::DbUpdateStarted);
            thread::sleep(Duration::from_millis(600));
            let _ = tx.send(Delta::DbUpdateFinished {
                success: true,
                message: "Demo database refreshed".to_string(),
            });
        }
        ProviderCommand::CancelDbUpdate => {}
    }
}

const WAIVER_NAMES: [&str; 8] = [
    "Miro Lehtinen",
    "Cole Brandt",
    "Anton Saari",
    "Jake Morrissey",
    "Pavel Brychta",
    "Liam Doyle",
    "Erik Lindqvist",
    "Noah Tremblay",
];

const FREE_AGENT_NAMES: [&str; 12] = [
    "Danny Kovar",
    "Matteo Rossi",
    "Will Hartman",
    "Teddy Volkov",
    "Jonas Bergstrom",
    "Sam Whitfield",
    "Tomas Hudec",
    "Marcus Lindell",
    "Casey Donahue",
    "Ilya Smirnov",
    "Ben Carver",
    "Owen Gallant",
];

const ROSTER_NAMES: [&str; 6] = [
    "John Smith",
    "Victor Malm",
    "Aleksi Rantanen",
    "Brady Coleman",
    "Nikolai Fyodorov",
    "Dylan Marsh",
];

const TEAMS: [&str; 8] = ["BOS", "TOR", "COL", "EDM", "NYR", "DAL", "VAN", "TBL"];
const CATEGORIES: [&str; 6] = ["G", "A", "PPP", "SOG", "HIT", "BLK"];

fn sample_free_agent_data(rng: &mut ThreadRng) -> FreeAgentData {
    let today = Utc::now().date_naive();
    let week_dates = (0..7)
        .map(|offset| today + ChronoDuration::days(offset))
        .collect();

    let waiver_players = WAIVER_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| sample_player(rng, 1000 + i as u32, name))
        .collect();
    let free_agents = FREE_AGENT_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| sample_player(rng, 2000 + i as u32, name))
        .collect();
    let team_roster = ROSTER_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| sample_player(rng, 3000 + i as u32, name))
        .collect();

    FreeAgentData {
        waiver_players,
        free_agents,
        scoring_categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
        ranked_categories: CATEGORIES.iter().map(|c| c.to_string()).collect(),
        checked_categories: CATEGORIES[..4].iter().map(|c| c.to_string()).collect(),
        unused_roster_spots: sample_unused_spots(rng),
        team_roster,
        week_dates,
    }
}

fn sample_player(rng: &mut ThreadRng, id: u32, name: &str) -> Player {
    let positions = sample_positions(rng);
    let mut cat_ranks = HashMap::new();
    for cat in CATEGORIES {
        // Roughly one in seven category ranks is missing, like shallow pools.
        let rank = if rng.gen_bool(0.85) {
            Some(rng.gen_range(1..=25) as f64)
        } else {
            None
        };
        cat_ranks.insert(cat.to_string(), rank);
    }
    let game_count = rng.gen_range(2..=4);
    let mut days: Vec<&str> = DAY_CODES.to_vec();
    days.shuffle(rng);
    let mut games_this_week: Vec<String> = days[..game_count]
        .iter()
        .map(|d| d.to_string())
        .collect();
    games_this_week.sort_by_key(|d| DAY_CODES.iter().position(|c| *c == d.as_str()));
    days.shuffle(rng);
    let mut games_next_week: Vec<String> = days[..game_count]
        .iter()
        .map(|d| d.to_string())
        .collect();
    games_next_week.sort_by_key(|d| DAY_CODES.iter().position(|c| *c == d.as_str()));

    Player {
        id: id.to_string(),
        name: name.to_string(),
        team: TEAMS[rng.gen_range(0..TEAMS.len())].to_string(),
        positions,
        cat_ranks,
        overall_rank: Some(rng.gen_range(1..=30) as f64),
        games_this_week,
        games_next_week,
    }
}

fn sample_positions(rng: &mut ThreadRng) -> Vec<String> {
    if rng.gen_bool(0.1) {
        return vec!["G".to_string()];
    }
    let skater = ["C", "LW", "RW", "D"];
    let primary = skater[rng.gen_range(0..skater.len())];
    let mut positions = vec![primary.to_string()];
    if primary != "D" && rng.gen_bool(0.4) {
        let second = skater[rng.gen_range(0..3)];
        if second != primary {
            positions.push(second.to_string());
        }
    }
    positions
}

fn sample_unused_spots(rng: &mut ThreadRng) -> UnusedRosterSpots {
    let mut spots = UnusedRosterSpots::new();
    for day in DAY_CODES {
        let mut by_pos = HashMap::new();
        for pos in POSITION_CODES {
            let value = if rng.gen_bool(0.1) {
                SpotValue::Projected("1*".to_string())
            } else {
                SpotValue::Count(rng.gen_range(0..=2))
            };
            by_pos.insert(pos.to_string(), value);
        }
        spots.insert(day.to_string(), by_pos);
    }
    spots
}
