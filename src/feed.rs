use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::api;
use crate::poll::{self, PollHandle, PollOutcome, PollStep};
use crate::state::{Delta, ProviderCommand};

/// Backend provider: runs on its own thread, executes commands against the
/// league API, and streams `Delta`s back to the UI. Fetch failures become
/// log lines plus an inline error; the previously rendered data stays put.
///
/// Known gap carried over from the page scripts: there is no sequencing
/// token, so a response that arrives after a newer request still overwrites
/// state.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut update_poll: Option<PollHandle> = None;
        loop {
            match cmd_rx.recv_timeout(Duration::from_millis(200)) {
                Ok(cmd) => handle_command(cmd, &tx, &mut update_poll),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        // UI is gone; stop any in-flight status poll.
        if let Some(handle) = update_poll {
            handle.cancel();
        }
    });
}

fn handle_command(
    cmd: ProviderCommand,
    tx: &Sender<Delta>,
    update_poll: &mut Option<PollHandle>,
) {
    match cmd {
        ProviderCommand::FetchFreeAgentData {
            team_name,
            categories,
        } => match api::fetch_free_agent_data(team_name.as_deref(), &categories) {
            Ok(data) => {
                let _ = tx.send(Delta::SetFreeAgentData(data));
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Free agent fetch error: {err}")));
                let _ = tx.send(Delta::InlineError(format!("free agent fetch failed: {err}")));
            }
        },
        ProviderCommand::FetchAvailableTimestamp => {
            match api::fetch_available_players_timestamp() {
                Ok(Some(ts)) => {
                    let _ = tx.send(Delta::SetAvailableTimestamp(ts));
                }
                Ok(None) => {}
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Timestamp fetch error: {err}")));
                }
            }
        }
        ProviderCommand::FetchDbStatus => match api::fetch_db_status() {
            Ok(status) => {
                let _ = tx.send(Delta::SetDbStatus(status));
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Db status fetch error: {err}")));
            }
        },
        ProviderCommand::StartDbUpdate { capture_lineups } => {
            if update_poll.as_ref().is_some_and(|h| !h.is_cancelled()) {
                let _ = tx.send(Delta::Log("[INFO] Database update already running".to_string()));
                return;
            }
            let handle = PollHandle::new();
            *update_poll = Some(handle.clone());
            let tx = tx.clone();
            thread::spawn(move || run_db_update(capture_lineups, &handle, &tx));
        }
        ProviderCommand::CancelDbUpdate => {
            if let Some(handle) = update_poll.take() {
                handle.cancel();
                let _ = tx.send(Delta::Log("[INFO] Database update poll cancelled".to_string()));
            }
        }
    }
}

/// Issues the update request, then watches `/api/db_status` until the build
/// timestamp moves past its pre-update value or the attempt cap is hit.
fn run_db_update(capture_lineups: bool, handle: &PollHandle, tx: &Sender<Delta>) {
    let _ = tx.send(Delta::DbUpdateStarted);
    let before = api::fetch_db_status().ok().and_then(|s| s.timestamp);

    if let Err(err) = api::start_db_update(capture_lineups) {
        let _ = tx.send(Delta::DbUpdateFinished {
            success: false,
            message: format!("update request failed: {err}"),
        });
        return;
    }

    let outcome = poll::run_poll(
        poll::DB_STATUS_POLL_INTERVAL,
        poll::DB_STATUS_POLL_ATTEMPTS,
        handle,
        |_attempt| match api::fetch_db_status() {
            Ok(status) if status.db_exists && status.timestamp > before => PollStep::Done(status),
            Ok(_) | Err(_) => PollStep::Retry,
        },
    );

    match outcome {
        PollOutcome::Completed(status) => {
            let league = status
                .league_name
                .clone()
                .unwrap_or_else(|| "league".to_string());
            let _ = tx.send(Delta::SetDbStatus(status));
            let _ = tx.send(Delta::DbUpdateFinished {
                success: true,
                message: format!("Database updated for {league}"),
            });
        }
        PollOutcome::Cancelled => {
            let _ = tx.send(Delta::DbUpdateFinished {
                success: false,
                message: "database update poll cancelled".to_string(),
            });
        }
        PollOutcome::TimedOut => {
            let _ = tx.send(Delta::DbUpdateFinished {
                success: false,
                message: format!(
                    "database update still running after {} checks, try again later",
                    poll::DB_STATUS_POLL_ATTEMPTS
                ),
            });
        }
    }
    // Release the slot so the next update request is accepted.
    handle.cancel();
}
