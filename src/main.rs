use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use fhl_terminal::filter::{SORT_KEY_NAME, SORT_KEY_OVERALL};
use fhl_terminal::simulator::Simulator;
use fhl_terminal::state::{
    apply_delta, screen_label, tab_label, AppState, Delta, ProviderCommand, Screen, DAY_CODES,
    POSITION_CODES,
};
use fhl_terminal::{api, cache, demo_feed, feed, heatmap, table};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    timestamp_refresh: Duration,
    last_timestamp_refresh: Instant,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let timestamp_refresh = std::env::var("FHL_TIMESTAMP_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(60)
            .max(10);
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            timestamp_refresh: Duration::from_secs(timestamp_refresh),
            last_timestamp_refresh: Instant::now(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.notice.take().is_some() {
            return;
        }
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('p') => self.state.screen = Screen::Players,
            KeyCode::Char('r') => self.state.screen = Screen::Roster,
            KeyCode::Char('m') => {
                self.state.screen = Screen::Moves;
                self.state.clamp_selection();
            }
            KeyCode::Esc => self.state.screen = Screen::Players,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('f') => self.request_fetch(true),
            KeyCode::Char('u') => self.request_db_update(),
            KeyCode::Char('U') => self.cancel_db_update(),
            KeyCode::Char('x') => self.reset_simulation(),
            _ => match self.state.screen {
                Screen::Players => self.on_players_key(key),
                Screen::Roster => {}
                Screen::Moves => self.on_moves_key(key),
            },
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.state.filters.search.push(c);
                self.state.selected = 0;
            }
            KeyCode::Backspace => {
                self.state.filters.search.pop();
                self.state.selected = 0;
            }
            KeyCode::Esc => {
                self.state.filters.search.clear();
                self.state.search_active = false;
                self.state.selected = 0;
            }
            KeyCode::Enter => self.state.search_active = false,
            _ => {}
        }
    }

    fn on_players_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Tab => self.state.cycle_tab(),
            KeyCode::Char('s') => self.state.cycle_sort_key(),
            KeyCode::Char('d') => self.state.reselect_sort_key(),
            KeyCode::Char('a') | KeyCode::Char(' ') => self.state.toggle_pending_add(),
            KeyCode::Char('C') => self.state.toggle_position("C"),
            KeyCode::Char('L') => self.state.toggle_position("LW"),
            KeyCode::Char('R') => self.state.toggle_position("RW"),
            KeyCode::Char('D') => self.state.toggle_position("D"),
            KeyCode::Char('G') => self.state.toggle_position("G"),
            KeyCode::Char(c @ '1'..='7') => {
                let idx = (c as usize) - ('1' as usize);
                let day = DAY_CODES[idx];
                self.state.toggle_day(day);
            }
            KeyCode::Enter => {
                self.state.screen = Screen::Moves;
                self.state.clamp_selection();
            }
            _ => {}
        }
    }

    fn on_moves_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.state.date_prev(),
            KeyCode::Char('l') | KeyCode::Right => self.state.date_next(),
            KeyCode::Enter => self.commit_move(),
            _ => {}
        }
    }

    /// Validates the pending add/drop/date selection and, when it holds up,
    /// appends the move and persists the updated log.
    fn commit_move(&mut self) {
        let added_id = self.state.pending_add.clone();
        let target = self.state.selected_drop_target();
        let date = self.state.selected_date();

        let st = &mut self.state;
        let result = st.simulator.simulate_move(
            &st.waiver_players,
            &st.free_agents,
            &st.team_roster,
            added_id.as_deref(),
            target.as_ref(),
            date,
        );

        match result {
            Ok(mv) => {
                self.state.push_log(format!(
                    "[INFO] Simulated {}: add {}, drop {}",
                    mv.date, mv.added.name, mv.dropped.name
                ));
                self.state.pending_add = None;
                if let Err(err) = cache::save_simulation(self.state.simulator.moves()) {
                    self.state
                        .push_log(format!("[WARN] Simulation save failed: {err}"));
                }
                self.state.clamp_selection();
            }
            Err(err) => self.state.notice = Some(err.to_string()),
        }
    }

    fn reset_simulation(&mut self) {
        if self.state.simulator.is_empty() {
            return;
        }
        self.state.simulator.reset();
        self.state.pending_add = None;
        cache::clear_simulation();
        self.state.push_log("[INFO] Simulated moves cleared");
        self.state.clamp_selection();
        self.request_fetch(false);
    }

    fn request_fetch(&mut self, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        let cmd = ProviderCommand::FetchFreeAgentData {
            team_name: self.state.selected_team.clone(),
            categories: self.state.checked_categories.clone(),
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Free agent request failed");
            return;
        }
        self.state.loading = true;
        if announce {
            self.state.push_log("[INFO] Free agent refresh requested");
        }
    }

    fn request_db_status(&mut self) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(ProviderCommand::FetchDbStatus);
        }
    }

    fn request_db_update(&mut self) {
        if self.state.db_updating {
            self.state.push_log("[INFO] Database update already running");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        if tx
            .send(ProviderCommand::StartDbUpdate {
                capture_lineups: false,
            })
            .is_err()
        {
            self.state.push_log("[WARN] Database update request failed");
        }
    }

    fn cancel_db_update(&mut self) {
        if !self.state.db_updating {
            return;
        }
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(ProviderCommand::CancelDbUpdate);
        }
    }

    fn maybe_refresh_timestamp(&mut self) {
        if self.last_timestamp_refresh.elapsed() < self.timestamp_refresh {
            return;
        }
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(ProviderCommand::FetchAvailableTimestamp);
        }
        self.last_timestamp_refresh = Instant::now();
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    if api::backend_configured() {
        feed::spawn_provider(tx, cmd_rx);
    } else {
        demo_feed::spawn_demo_provider(tx, cmd_rx);
    }

    let mut app = App::new(Some(cmd_tx));
    app.state.simulator = Simulator::from_moves(cache::load_simulation());
    if cache::load_page_state(&mut app.state) {
        app.state.push_log("[INFO] Restored cached page state");
    } else {
        app.request_fetch(false);
    }
    app.request_db_status();
    app.maybe_refresh_timestamp();

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = cache::save_page_state(&app.state) {
        eprintln!("cache save failed: {err}");
    }
    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            let fresh_data = matches!(delta, Delta::SetFreeAgentData(_));
            apply_delta(&mut app.state, delta);
            if fresh_data {
                // A fresh fetch replaces the roster snapshot the simulated
                // moves were layered on; reload the log from its slot so the
                // two stay consistent.
                app.state.simulator = Simulator::from_moves(cache::load_simulation());
                app.state.clamp_selection();
                if let Err(err) = cache::save_page_state(&app.state) {
                    app.state.push_log(format!("[WARN] Cache save failed: {err}"));
                }
            }
        }

        app.maybe_refresh_timestamp();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Players => render_players(frame, chunks[1], &app.state),
        Screen::Roster => render_roster(frame, chunks[1], &app.state),
        Screen::Moves => render_moves(frame, chunks[1], &app.state),
    }

    let status = Paragraph::new(status_text(&app.state)).style(status_style(&app.state));
    frame.render_widget(status, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if let Some(notice) = &app.state.notice {
        render_notice_overlay(frame, frame.size(), notice);
    }
}

fn header_text(state: &AppState) -> String {
    let sort = state.active_sort();
    let mut title = format!("FHL TERMINAL | {}", screen_label(state.screen));
    if state.screen == Screen::Players {
        title.push_str(&format!(
            " [{}] | Sort: {}{}",
            tab_label(state.tab),
            sort_key_label(&sort.key),
            table::sort_indicator(&sort.key, sort)
        ));
    }
    if state.loading {
        title.push_str(" | loading...");
    }

    let db = match &state.db_status {
        Some(status) if status.db_exists => {
            let league = status.league_name.as_deref().unwrap_or("league");
            if state.db_updating {
                format!("DB: {league} (updating...)")
            } else {
                format!("DB: {league}")
            }
        }
        Some(_) => "DB: not built".to_string(),
        None => "DB: unknown".to_string(),
    };
    let available = state
        .available_players_at
        .as_deref()
        .map(|ts| format!("Players as of {ts}"))
        .unwrap_or_else(|| "Players as of -".to_string());

    format!("{title}\n{db} | {available} | {} simulated moves", state.simulator.len())
}

fn sort_key_label(key: &str) -> &str {
    match key {
        SORT_KEY_NAME => "Player",
        SORT_KEY_OVERALL => "ROS",
        other => other,
    }
}

fn status_text(state: &AppState) -> String {
    if state.search_active {
        return format!("/{}_", state.filters.search);
    }
    if let Some(err) = &state.last_error {
        return format!("error: {err}");
    }
    state.logs.back().cloned().unwrap_or_default()
}

fn status_style(state: &AppState) -> Style {
    if state.search_active {
        Style::default().fg(Color::Yellow)
    } else if state.last_error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Players => {
            "p/r/m Screens | Tab Pool | / Search | C L R D G Pos | 1-7 Day | s/d Sort | a Add | Enter Moves | f Refresh | u Update DB | ? Help | q Quit"
                .to_string()
        }
        Screen::Roster => "p/r/m Screens | j/k Move | f Refresh | ? Help | q Quit".to_string(),
        Screen::Moves => {
            "p/r/m Screens | j/k Drop | h/l Date | Enter Simulate | x Reset | ? Help | q Quit"
                .to_string()
        }
    }
}

fn filter_summary(state: &AppState) -> String {
    let mut parts = Vec::new();
    if !state.filters.search.trim().is_empty() {
        parts.push(format!("search \"{}\"", state.filters.search.trim()));
    }
    if !state.filters.positions.is_empty() {
        let positions: Vec<&str> = state.filters.positions.iter().map(String::as_str).collect();
        parts.push(format!("pos {}", positions.join("/")));
    }
    if !state.filters.days.is_empty() {
        let days: Vec<&str> = state.filters.days.iter().map(String::as_str).collect();
        parts.push(format!("days {}", days.join("+")));
    }
    if parts.is_empty() {
        "Filters: none".to_string()
    } else {
        format!("Filters: {}", parts.join(" | "))
    }
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let summary = Paragraph::new(filter_summary(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(summary, sections[0]);

    let columns = table::player_columns(&state.checked_categories);
    let widths: Vec<Constraint> = columns
        .iter()
        .map(|col| Constraint::Length(col.width))
        .collect();

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.clone())
        .split(sections[1]);
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    for (label, cell_area) in table::header_labels(&columns, state.active_sort())
        .iter()
        .zip(header_cols.iter())
    {
        frame.render_widget(Paragraph::new(label.as_str()).style(header_style), *cell_area);
    }

    let list_area = sections[2];
    let players = state.visible_players();
    if players.is_empty() {
        let message = if state.loading {
            "Loading players..."
        } else {
            "No players match the current filters"
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let rows = table::player_rows(
        &players,
        &columns,
        &state.simulator,
        state.pending_add.as_deref(),
    );
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.clone())
            .split(row_area);

        for (cell, cell_area) in rows[idx].iter().zip(cols.iter()) {
            let mut style = row_style;
            if let Some(color) = heatmap::color_for(cell.rank) {
                style = style.fg(color);
            }
            frame.render_widget(Paragraph::new(cell.text.as_str()).style(style), *cell_area);
        }
    }
}

fn render_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(40)])
        .split(area);

    let roster = Paragraph::new(roster_text(state))
        .block(Block::default().title("My Roster").borders(Borders::ALL));
    frame.render_widget(roster, columns[0]);

    let spots = Paragraph::new(unused_spots_text(state))
        .block(Block::default().title("Open Spots").borders(Borders::ALL));
    frame.render_widget(spots, columns[1]);
}

fn roster_text(state: &AppState) -> String {
    if state.team_roster.is_empty() {
        return "No roster loaded".to_string();
    }
    let mut lines = Vec::new();
    for (idx, player) in state.team_roster.iter().enumerate() {
        let prefix = if idx == state.roster_selected { "> " } else { "  " };
        lines.push(format!(
            "{prefix}{:<22} {:<4} {:<8} {}",
            player.name,
            player.team,
            player.positions.join(","),
            player.games_this_week.join(" ")
        ));
    }
    lines.join("\n")
}

/// Days across, positions down; "-" where the backend reported nothing.
fn unused_spots_text(state: &AppState) -> String {
    if state.unused_roster_spots.is_empty() {
        return "No spot data".to_string();
    }
    let mut lines = Vec::new();
    let header: Vec<String> = DAY_CODES.iter().map(|d| format!("{d:>4}")).collect();
    lines.push(format!("{:<4}{}", "", header.join("")));
    for pos in POSITION_CODES {
        let cells: Vec<String> = DAY_CODES
            .iter()
            .map(|day| {
                let label = state
                    .unused_roster_spots
                    .get(*day)
                    .and_then(|by_pos| by_pos.get(pos))
                    .map(|v| v.label())
                    .unwrap_or_else(|| "-".to_string());
                format!("{label:>4}")
            })
            .collect();
        lines.push(format!("{pos:<4}{}", cells.join("")));
    }
    lines.join("\n")
}

fn render_moves(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(46)])
        .split(area);

    let drops = Paragraph::new(drop_candidates_text(state))
        .block(Block::default().title("Drop Candidates").borders(Borders::ALL));
    frame.render_widget(drops, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(columns[1]);

    let setup = Paragraph::new(move_setup_text(state))
        .block(Block::default().title("Next Move").borders(Borders::ALL));
    frame.render_widget(setup, right[0]);

    let log = Paragraph::new(moves_log_text(state))
        .block(Block::default().title("Simulated Moves").borders(Borders::ALL));
    frame.render_widget(log, right[1]);
}

fn drop_candidates_text(state: &AppState) -> String {
    let candidates = state.drop_candidates();
    if candidates.is_empty() {
        return "No drop candidates".to_string();
    }
    let mut lines = Vec::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        let prefix = if idx == state.drop_selected { "> " } else { "  " };
        let origin = match candidate.added_on {
            Some(date) => format!(" (added {date})"),
            None => String::new(),
        };
        lines.push(format!(
            "{prefix}{:<22} {:<4} {}{origin}",
            candidate.player.name,
            candidate.player.team,
            candidate.player.positions.join(",")
        ));
    }
    lines.join("\n")
}

fn move_setup_text(state: &AppState) -> String {
    let add = state
        .pending_add
        .as_deref()
        .and_then(|id| {
            state
                .waiver_players
                .iter()
                .chain(state.free_agents.iter())
                .find(|p| p.id == id)
        })
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "none (check one on Players)".to_string());
    let date = state
        .selected_date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("Add:  {add}\nDate: < {date} >\nEnter to simulate")
}

fn moves_log_text(state: &AppState) -> String {
    if state.simulator.is_empty() {
        return "No simulated moves yet".to_string();
    }
    state
        .simulator
        .moves_by_date()
        .iter()
        .map(|mv| format!("{}  + {}  - {}", mv.date, mv.added.name, mv.dropped.name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "FHL Terminal - Help",
        "",
        "Global:",
        "  p / r / m    Players / Roster / Moves",
        "  j/k or ↑/↓   Move selection",
        "  f            Refresh free agent data",
        "  u / U        Start / cancel database update",
        "  x            Reset simulated moves",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Players:",
        "  Tab          Waivers / Free Agents",
        "  /            Search by name",
        "  C L R D G    Toggle position filters",
        "  1-7          Toggle day filters (Mon-Sun)",
        "  s            Cycle sort column",
        "  d            Flip sort direction",
        "  a / Space    Check player to add",
        "  Enter        Go to Moves",
        "",
        "Moves:",
        "  h/l or ←/→   Pick move date",
        "  Enter        Simulate add/drop",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn render_notice_overlay(frame: &mut Frame, area: Rect, notice: &str) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let text = format!("{notice}\n\npress any key");
    let popup = Paragraph::new(text)
        .block(Block::default().title("Notice").borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(popup, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
