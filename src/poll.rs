use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DB_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DB_STATUS_POLL_ATTEMPTS: usize = 60;

/// Shared cancel flag for a polling task; cloning hands out another handle
/// to the same flag.
#[derive(Debug, Clone, Default)]
pub struct PollHandle {
    cancelled: Arc<AtomicBool>,
}

impl PollHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub enum PollStep<T> {
    Done(T),
    Retry,
}

#[derive(Debug, PartialEq)]
pub enum PollOutcome<T> {
    Completed(T),
    Cancelled,
    TimedOut,
}

/// Runs `check` up to `max_attempts` times with `interval` between attempts.
/// Cancellation is honored between attempts and mid-sleep, so a task stops
/// promptly when its owner goes away.
pub fn run_poll<T>(
    interval: Duration,
    max_attempts: usize,
    handle: &PollHandle,
    mut check: impl FnMut(usize) -> PollStep<T>,
) -> PollOutcome<T> {
    for attempt in 0..max_attempts {
        if handle.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        if let PollStep::Done(value) = check(attempt) {
            return PollOutcome::Completed(value);
        }
        if attempt + 1 < max_attempts && !sleep_unless_cancelled(interval, handle) {
            return PollOutcome::Cancelled;
        }
    }
    if handle.is_cancelled() {
        PollOutcome::Cancelled
    } else {
        PollOutcome::TimedOut
    }
}

fn sleep_unless_cancelled(total: Duration, handle: &PollHandle) -> bool {
    const SLICE: Duration = Duration::from_millis(100);
    let mut remaining = total;
    while remaining > Duration::ZERO {
        if handle.is_cancelled() {
            return false;
        }
        let nap = remaining.min(SLICE);
        thread::sleep(nap);
        remaining = remaining.saturating_sub(nap);
    }
    !handle.is_cancelled()
}
