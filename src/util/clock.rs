//! Wall-clock helpers.
//!
//! All time-sensitive operations in this crate take an explicit `now_ms`
//! argument instead of reading the clock internally, which keeps the rate
//! window, health transitions, and revival logic deterministic under test.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
        // Sanity: we are past 2020-01-01 in epoch milliseconds.
        assert!(a > 1_577_836_800_000);
    }
}
