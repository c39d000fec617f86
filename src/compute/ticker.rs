//! Fixed-interval tick scheduling for the timer-driven frame loop.

use std::time::Duration;

/// Fires once per `interval` of elapsed time.
///
/// Ticks that are overdue by more than one interval are coalesced into a
/// single tick; callbacks never overlap and never queue up.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_deadline: Duration,
}

impl Ticker {
    /// Create a ticker whose first tick is due one interval from zero.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: interval,
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Elapsed time at which the next tick is due.
    #[inline]
    pub fn next_deadline(&self) -> Duration {
        self.next_deadline
    }

    /// Whether a tick is due at `elapsed`, without consuming it.
    #[inline]
    pub fn is_due(&self, elapsed: Duration) -> bool {
        elapsed >= self.next_deadline
    }

    /// Consume the tick due at `elapsed`, if any.
    pub fn poll(&mut self, elapsed: Duration) -> bool {
        if !self.is_due(elapsed) {
            return false;
        }
        self.next_deadline += self.interval;
        if self.next_deadline <= elapsed {
            self.next_deadline = elapsed + self.interval;
        }
        true
    }
}
