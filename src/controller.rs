//! Monitor controller - one sampling/scoring/trigger cycle per tick.
//!
//! Each tick: probe the endpoint, push the raw sample into the rolling
//! history, compute the smoothed latency and the confidence score (drawn
//! once), evaluate the trigger, then emit a single record to the CSV sink,
//! the WebSocket hub and the shared latest-record slot.
//!
//! A failed probe skips the tick entirely: no history mutation, no record,
//! no output. The next scheduled tick is the retry. Nothing in here is
//! fatal; only the driver decides when the loop stops.

use crate::config::MonitorConfig;
use crate::history::LatencyHistory;
use crate::record::Record;
use crate::scoring::{smooth_latency, ConfidenceEstimator};
use crate::traits::{LatencyProbe, RecordPublisher, RecordSink, TimeSource};
use crate::trigger::{Signal, TriggerEngine};
use chrono::Timelike;
use log::{debug, error, info, warn};
use rand::Rng;
use std::sync::{Arc, RwLock};

pub struct MonitorController<P, S, B, T, R>
where
    P: LatencyProbe,
    S: RecordSink,
    B: RecordPublisher,
    T: TimeSource,
    R: Rng,
{
    probe: P,
    sink: S,
    publisher: B,
    clock: T,

    config: MonitorConfig,
    history: LatencyHistory,
    estimator: ConfidenceEstimator<R>,
    trigger: TriggerEngine,

    // Shared with the HTTP query endpoint
    latest: Arc<RwLock<Option<Record>>>,

    // Metrics for the periodic status line
    ticks_completed: u64,
    ticks_skipped: u64,
    last_signal: Option<Signal>,
}

impl<P, S, B, T, R> MonitorController<P, S, B, T, R>
where
    P: LatencyProbe,
    S: RecordSink,
    B: RecordPublisher,
    T: TimeSource,
    R: Rng,
{
    pub fn new(
        probe: P,
        sink: S,
        publisher: B,
        clock: T,
        latest: Arc<RwLock<Option<Record>>>,
        config: MonitorConfig,
        rng: R,
    ) -> Self {
        let estimator = ConfidenceEstimator::new(&config, rng);
        let trigger = TriggerEngine::new(config.thresholds.clone());
        let history = LatencyHistory::new(config.sampling.history_capacity);

        MonitorController {
            probe,
            sink,
            publisher,
            clock,
            config,
            history,
            estimator,
            trigger,
            latest,
            ticks_completed: 0,
            ticks_skipped: 0,
            last_signal: None,
        }
    }

    /// Run one full cycle. Ticks are strictly sequential; the caller owns
    /// the pacing.
    pub fn run_tick(&mut self) {
        let latency = match self.probe.measure() {
            Ok(latency) => latency,
            Err(e) => {
                self.ticks_skipped += 1;
                let now = self.clock.now_utc();
                warn!("[{}] probe failed: {}", now.format("%H:%M:%S"), e);
                return;
            }
        };

        self.history.push(latency);
        debug!(
            "sample {:.3}s ({} in window)",
            latency,
            self.history.len()
        );

        // Never empty right after a push; a record can still never be
        // built without a latency.
        let Some(smooth) =
            smooth_latency(&self.history, self.config.sampling.samples_required)
        else {
            return;
        };
        // Randomized - drawn exactly once per tick
        let confidence = self.estimator.score(&self.history);

        let now = self.clock.now_utc();
        let fired = self
            .trigger
            .fire(&self.history, smooth, confidence, now.second());
        let signal = self.trigger.signal(fired, smooth, confidence);

        let record = Record::new(now.format("%H:%M:%S").to_string(), smooth, confidence, fired);

        if let Err(e) = self.sink.append(&record) {
            error!("[{}] log append failed: {}", record.time, e);
        }
        self.publisher.publish(&record);

        info!(
            "[{}] {} | Latency: {:.3}s | Confidence: {:.1}",
            record.time, signal, smooth, confidence
        );

        if let Ok(mut latest) = self.latest.write() {
            *latest = Some(record);
        }

        self.ticks_completed += 1;
        self.last_signal = Some(signal);
    }

    /// Periodic one-line summary, driven by the main loop.
    pub fn log_status(&self) {
        let last = self
            .last_signal
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        info!(
            "[STATUS] ticks={} skipped={} window={} last={}",
            self.ticks_completed,
            self.ticks_skipped,
            self.history.len(),
            last
        );
    }

    pub fn latest_handle(&self) -> Arc<RwLock<Option<Record>>> {
        self.latest.clone()
    }

    pub fn history(&self) -> &LatencyHistory {
        &self.history
    }

    pub fn ticks_completed(&self) -> u64 {
        self.ticks_completed
    }

    pub fn ticks_skipped(&self) -> u64 {
        self.ticks_skipped
    }
}

// ============================================================================
// TESTS
// ============================================================================
