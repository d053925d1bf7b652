//! Latency smoothing and the confidence heuristic.
//!
//! Confidence is not a statistical measure. It is a randomized score with
//! two disjoint ranges, gated on whether the recent window stayed under a
//! spike-tolerant ceiling:
//! - fewer than `samples_required` samples: exactly 0
//! - all recent samples <= latency_secs + max_spike_secs: uniform [50, 100)
//! - otherwise: uniform [0, 20)
//!
//! The ranges and the gate are fixed contract; downstream only compares the
//! score against the confidence threshold.

use crate::config::MonitorConfig;
use crate::history::LatencyHistory;
use rand::Rng;

/// Arithmetic mean of the last `samples_required` samples.
/// `None` only on an empty history, in which case no record may be built.
pub fn smooth_latency(history: &LatencyHistory, samples_required: usize) -> Option<f64> {
    let recent = history.tail(samples_required);
    if recent.is_empty() {
        return None;
    }
    Some(recent.iter().sum::<f64>() / recent.len() as f64)
}

pub struct ConfidenceEstimator<R: Rng> {
    rng: R,
    samples_required: usize,
    stable_ceiling: f64,
}

impl<R: Rng> ConfidenceEstimator<R> {
    pub fn new(config: &MonitorConfig, rng: R) -> Self {
        ConfidenceEstimator {
            rng,
            samples_required: config.sampling.samples_required,
            stable_ceiling: config.thresholds.latency_secs + config.thresholds.max_spike_secs,
        }
    }

    /// Score the current window. Must be called at most once per tick:
    /// every call draws fresh randomness.
    pub fn score(&mut self, history: &LatencyHistory) -> f64 {
        let recent = history.tail(self.samples_required);
        if recent.len() < self.samples_required {
            return 0.0;
        }

        let stable = recent.iter().all(|&l| l <= self.stable_ceiling);
        if stable {
            self.rng.random_range(50.0..100.0)
        } else {
            self.rng.random_range(0.0..20.0)
        }
    }
}
