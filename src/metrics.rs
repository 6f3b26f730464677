//! Lock-free run counters and the periodic status line.
//!
//! Workers record outcomes through atomic increments; the status task
//! snapshots the counters once per second and rewrites a single console
//! line. A snapshot is eventually consistent across the four counters (no
//! barrier between them) but each individual counter is never torn.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::types::Outcome;

/// Interval between status-line refreshes.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Cumulative counters for a run.
///
/// `checked` increments exactly once per probed candidate regardless of
/// outcome, so `valid + taken + censored <= checked` holds at all times;
/// the difference is the number of Error outcomes.
#[derive(Debug, Default)]
pub struct Metrics {
    checked: AtomicU64,
    valid: AtomicU64,
    taken: AtomicU64,
    censored: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_checked(&self) {
        self.checked.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the outcome-specific counter. Error outcomes have no
    /// dedicated counter and are a no-op here.
    pub fn record_outcome(&self, outcome: Outcome) {
        match outcome {
            Outcome::Available => {
                self.valid.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Taken => {
                self.taken.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Censored => {
                self.censored.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Error => {}
        }
    }

    /// Takes an eventually-consistent snapshot of all four counters.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            checked: self.checked.load(Ordering::Relaxed),
            valid: self.valid.load(Ordering::Relaxed),
            taken: self.taken.load(Ordering::Relaxed),
            censored: self.censored.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of the four counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub checked: u64,
    pub valid: u64,
    pub taken: u64,
    pub censored: u64,
}

impl Snapshot {
    /// Renders the single status line shown once per second.
    pub fn render(&self) -> String {
        format!(
            "checked: {} | valid: {} | taken: {} | censored: {}",
            self.checked, self.valid, self.taken, self.censored
        )
    }
}

/// Runs the status-line task until cancelled.
///
/// Read-only: snapshots the counters on a fixed interval and rewrites one
/// console line in place. Never mutates run state.
pub async fn status_line_loop(metrics: Arc<Metrics>, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(STATUS_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let line = metrics.snapshot().render();
                let mut out = io::stdout().lock();
                let _ = write!(out, "\r{line}");
                let _ = out.flush();
            }
        }
    }
    // Leave the final counters on their own line.
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "\r{}", metrics.snapshot().render());
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_counts_every_outcome() {
        let metrics = Metrics::new();
        for outcome in [
            Outcome::Available,
            Outcome::Taken,
            Outcome::Censored,
            Outcome::Error,
        ] {
            metrics.record_checked();
            metrics.record_outcome(outcome);
        }

        let snap = metrics.snapshot();
        assert_eq!(snap.checked, 4);
        assert_eq!(snap.valid, 1);
        assert_eq!(snap.taken, 1);
        assert_eq!(snap.censored, 1);
    }

    #[test]
    fn error_has_no_dedicated_counter() {
        let metrics = Metrics::new();
        metrics.record_checked();
        metrics.record_outcome(Outcome::Error);

        let snap = metrics.snapshot();
        assert_eq!(snap.checked, 1);
        assert_eq!(snap.valid + snap.taken + snap.censored, 0);
    }

    #[test]
    fn classified_outcomes_never_exceed_checked() {
        let metrics = Metrics::new();
        let outcomes = [
            Outcome::Available,
            Outcome::Error,
            Outcome::Taken,
            Outcome::Taken,
            Outcome::Censored,
            Outcome::Error,
        ];
        for outcome in outcomes {
            metrics.record_checked();
            metrics.record_outcome(outcome);
            let snap = metrics.snapshot();
            assert!(snap.valid + snap.taken + snap.censored <= snap.checked);
        }

        let snap = metrics.snapshot();
        assert_eq!(snap.checked, 6);
        // Difference is exactly the Error count.
        assert_eq!(snap.checked - (snap.valid + snap.taken + snap.censored), 2);
    }

    #[test]
    fn render_contains_all_counters() {
        let snap = Snapshot {
            checked: 10,
            valid: 1,
            taken: 7,
            censored: 2,
        };
        let line = snap.render();
        assert_eq!(line, "checked: 10 | valid: 1 | taken: 7 | censored: 2");
    }
}
