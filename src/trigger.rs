//! Trigger evaluation.
//!
//! A tick fires when all five conditions hold at once:
//! smoothed latency under the threshold, confidence over the threshold,
//! the latest raw sample strictly below the previous one, the jump between
//! them bounded by the spike tolerance, and the wall-clock second odd.
//! The odd-second gate halves the firing window; it is part of the
//! contract, not a tunable.

use crate::config::ThresholdConfig;
use crate::history::LatencyHistory;
use std::fmt;

/// Display-only classification of a tick. Never feeds back into `fire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Fire,
    Warn,
    Quiet,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Fire => "FIRE",
            Signal::Warn => "WARN",
            Signal::Quiet => "QUIET",
        };
        f.write_str(s)
    }
}

pub struct TriggerEngine {
    thresholds: ThresholdConfig,
}

impl TriggerEngine {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        TriggerEngine { thresholds }
    }

    /// Evaluate the trigger for one tick. `confidence` must be the single
    /// per-tick score; this function never re-draws it. Cheap checks
    /// (history length, second parity) run before the threshold comparisons.
    pub fn fire(
        &self,
        history: &LatencyHistory,
        smooth_latency: f64,
        confidence: f64,
        now_second: u32,
    ) -> bool {
        let Some((prev, last)) = history.last_two() else {
            return false;
        };
        if now_second % 2 != 1 {
            return false;
        }

        let dropping = last < prev;
        let spike_bounded = last <= prev + self.thresholds.max_spike_secs;

        smooth_latency <= self.thresholds.latency_secs
            && confidence >= self.thresholds.confidence
            && dropping
            && spike_bounded
    }

    pub fn signal(&self, fired: bool, smooth_latency: f64, confidence: f64) -> Signal {
        if fired {
            Signal::Fire
        } else if smooth_latency > self.thresholds.latency_secs
            || confidence < self.thresholds.confidence
        {
            Signal::Warn
        } else {
            Signal::Quiet
        }
    }
}
