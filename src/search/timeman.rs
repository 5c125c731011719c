//! Background timer thread. Communicates with the searching thread through
//! exactly two atomics: `stopped` (timer → search) and `cancel_timer`
//! (search → timer). The search observes `stopped` at the top of every
//! recursive call and between moves; the timer polls `cancel_timer` in
//! short (≤100ms) sleeps so a forced-mate finish can end it early.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// `AVG` in the move-budget formula `t_us / (AVG - move_number) + i_us`,
/// approximating a full game's move count.
const AVG_GAME_MOVES: i64 = 45;

/// Move budget from `go wtime/btime [winc/binc]`, clamped to at most a
/// tenth of the remaining clock so a single move can never flag the side.
pub fn budget_from_clock(time_left_ms: i64, increment_ms: i64, move_number: i64) -> Duration {
    let denom = (AVG_GAME_MOVES - move_number).max(1);
    let raw = time_left_ms / denom + increment_ms;
    let capped = raw.min(time_left_ms / 10).max(1);
    Duration::from_millis(capped as u64)
}

pub struct TimeManager {
    stopped: Arc<AtomicBool>,
    cancel_timer: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TimeManager {
    /// Spawns the timer thread, which sets `stopped` once `budget` elapses.
    pub fn start(budget: Duration) -> Self {
        let stopped = Arc::new(AtomicBool::new(false));
        let cancel_timer = Arc::new(AtomicBool::new(false));

        let thread_stopped = Arc::clone(&stopped);
        let thread_cancel = Arc::clone(&cancel_timer);
        let handle = thread::spawn(move || {
            let deadline = Instant::now() + budget;
            loop {
                if thread_cancel.load(Ordering::Relaxed) {
                    return;
                }
                if Instant::now() >= deadline {
                    thread_stopped.store(true, Ordering::Relaxed);
                    return;
                }
                thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
            }
        });

        Self {
            stopped,
            cancel_timer,
            handle: Some(handle),
        }
    }

    /// A cloned handle to the `stopped` flag for the search to poll.
    pub fn stopped_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }

    /// Signals the timer thread to exit early (e.g. a forced mate was
    /// found) and joins it.
    pub fn cancel_and_join(mut self) {
        self.cancel_timer.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TimeManager {
    fn drop(&mut self) {
        self.cancel_timer.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_after_budget_elapses() {
        let timer = TimeManager::start(Duration::from_millis(30));
        let stopped = timer.stopped_flag();
        assert!(!stopped.load(Ordering::Relaxed));
        thread::sleep(Duration::from_millis(120));
        assert!(stopped.load(Ordering::Relaxed));
        timer.cancel_and_join();
    }

    #[test]
    fn cancel_stops_timer_before_budget_elapses() {
        let timer = TimeManager::start(Duration::from_secs(10));
        let stopped = timer.stopped_flag();
        timer.cancel_and_join();
        assert!(!stopped.load(Ordering::Relaxed));
    }

    #[test]
    fn budget_is_capped_at_one_tenth_of_clock() {
        let b = budget_from_clock(100_000, 0, 0);
        assert!(b <= Duration::from_millis(10_000));
    }
}
