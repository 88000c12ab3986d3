//! Per-worker sliding-window admission control.
//!
//! Each worker gets its own window of admission timestamps over the trailing
//! `window` duration, a true sliding window rather than a calendar bucket.
//! Entries older than the window are purged lazily on each check. Rejection
//! mutates nothing and queues nothing; the caller owns retry/failover policy.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tracing::debug;

use crate::util::serde::WorkerId;

/// Sliding window of admission instants for one worker.
#[derive(Debug, Default)]
struct RateWindow {
    /// Admission timestamps in ascending order, all within the window.
    timestamps: VecDeque<u128>,
}

impl RateWindow {
    /// Drop timestamps at or before the trailing window edge. The window is
    /// the half-open interval `(now - window, now]`: an admission recorded
    /// exactly one window ago no longer counts.
    fn purge(&mut self, now_ms: u128, window_ms: u128) {
        let edge = now_ms.saturating_sub(window_ms);
        while self.timestamps.front().is_some_and(|&ts| ts <= edge) {
            self.timestamps.pop_front();
        }
    }
}

/// Per-worker sliding-window request counter; decides admit/reject.
///
/// Windows are keyed by worker id at construction from the static topology,
/// each behind its own mutex so admission checks on different workers never
/// contend.
pub struct RateLimiter {
    windows: HashMap<WorkerId, Mutex<RateWindow>>,
    rate_limit: usize,
    window_ms: u128,
}

impl RateLimiter {
    /// Build a limiter for a fixed set of workers.
    pub fn new(worker_ids: impl IntoIterator<Item = WorkerId>, rate_limit: usize, window_ms: u128) -> Self {
        let windows = worker_ids
            .into_iter()
            .map(|id| (id, Mutex::new(RateWindow::default())))
            .collect();
        Self {
            windows,
            rate_limit,
            window_ms,
        }
    }

    /// Try to admit one request for `id` at `now_ms`.
    ///
    /// Purges aged-out entries, then admits and records `now_ms` iff the
    /// remaining count is below the limit. Returns false without mutating
    /// state when the window is full, or when the id is outside the topology.
    pub fn try_admit(&self, id: &WorkerId, now_ms: u128) -> bool {
        let Some(window) = self.windows.get(id) else {
            debug!(worker = %id, "rate check for unknown worker");
            return false;
        };
        let mut w = window.lock();
        w.purge(now_ms, self.window_ms);
        if w.timestamps.len() < self.rate_limit {
            w.timestamps.push_back(now_ms);
            true
        } else {
            debug!(worker = %id, "admission window full");
            false
        }
    }

    /// Admissions currently counted in `id`'s trailing window.
    ///
    /// Read-only view for reporting and tests; does not purge.
    #[must_use]
    pub fn admitted_in_window(&self, id: &WorkerId, now_ms: u128) -> usize {
        self.windows.get(id).map_or(0, |window| {
            let edge = now_ms.saturating_sub(self.window_ms);
            window.lock().timestamps.iter().filter(|&&ts| ts > edge).count()
        })
    }

    /// The configured per-window admission cap.
    #[must_use]
    pub const fn rate_limit(&self) -> usize {
        self.rate_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: usize, window_ms: u128) -> RateLimiter {
        RateLimiter::new([WorkerId::new("app1"), WorkerId::new("app2")], limit, window_ms)
    }

    fn id(s: &str) -> WorkerId {
        WorkerId::new(s)
    }

    #[test]
    fn test_admits_up_to_limit() {
        let rl = limiter(3, 60_000);
        assert!(rl.try_admit(&id("app1"), 1_000));
        assert!(rl.try_admit(&id("app1"), 1_001));
        assert!(rl.try_admit(&id("app1"), 1_002));
        assert!(!rl.try_admit(&id("app1"), 1_003));
        assert_eq!(rl.admitted_in_window(&id("app1"), 1_003), 3);
    }

    #[test]
    fn test_rejection_does_not_mutate() {
        let rl = limiter(1, 60_000);
        assert!(rl.try_admit(&id("app1"), 1_000));
        assert!(!rl.try_admit(&id("app1"), 1_001));
        assert!(!rl.try_admit(&id("app1"), 1_002));
        // The single recorded admission ages out one window after t=1000,
        // regardless of how many rejections happened since.
        assert!(rl.try_admit(&id("app1"), 61_001));
    }

    #[test]
    fn test_windows_are_independent_per_worker() {
        let rl = limiter(1, 60_000);
        assert!(rl.try_admit(&id("app1"), 1_000));
        assert!(rl.try_admit(&id("app2"), 1_000));
        assert!(!rl.try_admit(&id("app1"), 1_001));
    }

    #[test]
    fn test_boundary_is_half_open() {
        let rl = limiter(1, 60_000);
        assert!(rl.try_admit(&id("app1"), 1_000));
        // At exactly window distance the old admission is purged.
        assert!(rl.try_admit(&id("app1"), 61_000));
        // Just before the edge it still counts.
        let rl = limiter(1, 60_000);
        assert!(rl.try_admit(&id("app1"), 1_000));
        assert!(!rl.try_admit(&id("app1"), 60_999));
    }

    #[test]
    fn test_sliding_not_bucketed() {
        let rl = limiter(2, 10_000);
        assert!(rl.try_admit(&id("app1"), 1_000));
        assert!(rl.try_admit(&id("app1"), 9_000));
        assert!(!rl.try_admit(&id("app1"), 10_000));
        // t=11000: the t=1000 entry aged out, the t=9000 entry remains.
        assert!(rl.try_admit(&id("app1"), 11_000));
        assert!(!rl.try_admit(&id("app1"), 11_001));
    }

    #[test]
    fn test_unknown_worker_rejected() {
        let rl = limiter(5, 60_000);
        assert!(!rl.try_admit(&id("ghost"), 1_000));
        assert_eq!(rl.admitted_in_window(&id("ghost"), 1_000), 0);
    }
}
