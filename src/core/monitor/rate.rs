//! Rates from cumulative counters.
//!
//! Network and disk throughput come from monotonically increasing OS counters
//! (bytes sent, sectors read, milliseconds busy). A rate needs two readings and
//! the time between them, so every counter carries a small state.

use std::time::{Duration, Instant};

/// Readings closer together than this reuse the previous rate.
pub const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Last reading of one cumulative counter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CounterState {
    last: Option<(u64, Instant)>,
    last_rate: f64,
}

impl CounterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a baseline reading has been stored yet.
    pub fn is_seeded(&self) -> bool {
        self.last.is_some()
    }

    pub fn last_rate(&self) -> f64 {
        self.last_rate
    }

    /// Per-second rate between the stored reading and `value` taken at `at`.
    ///
    /// - first call: stores the baseline, rate is 0
    /// - clock did not advance: previous rate, state untouched
    /// - counter went backwards (reset/overflow): rate is 0, new baseline stored
    pub fn rate(&self, value: u64, at: Instant) -> (f64, CounterState) {
        let Some((prev_value, prev_at)) = self.last else {
            return (
                0.0,
                CounterState {
                    last: Some((value, at)),
                    last_rate: 0.0,
                },
            );
        };

        let elapsed = at.saturating_duration_since(prev_at);
        if elapsed < MIN_ELAPSED {
            return (self.last_rate, *self);
        }

        let rate = if value >= prev_value {
            (value - prev_value) as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        (
            rate,
            CounterState {
                last: Some((value, at)),
                last_rate: rate,
            },
        )
    }

    /// In-place variant of [`CounterState::rate`].
    pub fn advance(&mut self, value: u64, at: Instant) -> f64 {
        let (rate, next) = self.rate(value, at);
        *self = next;
        rate
    }
}

/// Bytes per second to kilobits per second.
pub fn bytes_to_kbps(bytes_per_sec: f64) -> f64 {
    bytes_per_sec * 8.0 / 1000.0
}
