use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};
use latwatch::config::MonitorConfig;
use latwatch::controller::MonitorController;
use latwatch::csvlog::CsvSink;
use latwatch::record::Record;
use latwatch::traits::{LatencyProbe, RecordPublisher, RecordSink, TimeSource};
use rand::RngCore;
use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

// --- Scripted collaborators ---

struct ScriptedProbe {
    script: VecDeque<Result<f64>>,
}

impl LatencyProbe for ScriptedProbe {
    fn measure(&mut self) -> Result<f64> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("script exhausted")))
    }
}

#[derive(Clone)]
struct SharedSink(Arc<Mutex<Vec<Record>>>);

impl RecordSink for SharedSink {
    fn append(&mut self, record: &Record) -> Result<()> {
        self.0.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Clone)]
struct SharedPublisher(Arc<Mutex<Vec<Record>>>);

impl RecordPublisher for SharedPublisher {
    fn publish(&self, record: &Record) {
        self.0.lock().unwrap().push(record.clone());
    }
}

/// Every tick lands on a distinct odd second.
struct OddSecondClock {
    calls: Cell<u32>,
}

impl OddSecondClock {
    fn new() -> Self {
        OddSecondClock { calls: Cell::new(0) }
    }
}

impl TimeSource for OddSecondClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, (2 * n + 1) % 60).unwrap()
    }
}

/// RNG pinned to the top of every requested range, so a stable window
/// always scores well above the confidence threshold.
struct MaxRng;

impl RngCore for MaxRng {
    fn next_u32(&mut self) -> u32 {
        u32::MAX
    }
    fn next_u64(&mut self) -> u64 {
        u64::MAX
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0xFF);
    }
}

fn scripted_controller(
    script: Vec<Result<f64>>,
    rows: Arc<Mutex<Vec<Record>>>,
    frames: Arc<Mutex<Vec<Record>>>,
) -> MonitorController<ScriptedProbe, SharedSink, SharedPublisher, OddSecondClock, MaxRng> {
    MonitorController::new(
        ScriptedProbe {
            script: VecDeque::from(script),
        },
        SharedSink(rows),
        SharedPublisher(frames),
        OddSecondClock::new(),
        Arc::new(RwLock::new(None)),
        MonitorConfig::default(),
        MaxRng,
    )
}

// --- The tests ---

#[test]
fn test_trigger_fires_only_on_third_tick() {
    let rows = Arc::new(Mutex::new(Vec::new()));
    let frames = Arc::new(Mutex::new(Vec::new()));
    let mut controller =
        scripted_controller(vec![Ok(0.5), Ok(0.4), Ok(0.1)], rows.clone(), frames.clone());

    for _ in 0..3 {
        controller.run_tick();
    }

    let rows = rows.lock().unwrap();
    let frames = frames.lock().unwrap();

    // One persisted row and one broadcast frame per successful tick
    assert_eq!(rows.len(), 3);
    assert_eq!(frames.len(), 3);
    for (row, frame) in rows.iter().zip(frames.iter()) {
        assert_eq!(row.time, frame.time);
        assert_eq!(row.trigger, frame.trigger);
    }

    // Tick 1 has too little history, tick 2 smooths to 0.45 (over the
    // threshold); only tick 3 fires.
    let triggers: Vec<bool> = rows.iter().map(|r| r.trigger).collect();
    assert_eq!(triggers, vec![false, false, true]);

    assert_eq!(rows[2].latency, Some(0.25));
    assert!(rows[2].confidence.unwrap() >= 60.0);

    let latest = controller.latest_handle();
    assert_eq!(latest.read().unwrap().as_ref().unwrap().trigger, true);
}

#[test]
fn test_probe_failure_emits_nothing_and_preserves_history() {
    let rows = Arc::new(Mutex::new(Vec::new()));
    let frames = Arc::new(Mutex::new(Vec::new()));
    let mut controller = scripted_controller(
        vec![Ok(0.3), Err(anyhow!("connect timeout")), Ok(0.2)],
        rows.clone(),
        frames.clone(),
    );

    controller.run_tick();
    assert_eq!(controller.history().tail(50), vec![0.3]);

    controller.run_tick();
    assert_eq!(rows.lock().unwrap().len(), 1);
    assert_eq!(frames.lock().unwrap().len(), 1);
    assert_eq!(controller.history().tail(50), vec![0.3]);
    assert_eq!(controller.ticks_skipped(), 1);

    controller.run_tick();
    assert_eq!(rows.lock().unwrap().len(), 2);
    assert_eq!(controller.history().tail(50), vec![0.3, 0.2]);
    assert_eq!(controller.ticks_completed(), 2);
}

#[test]
fn test_ticks_append_formatted_csv_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor_log.csv");
    let frames = Arc::new(Mutex::new(Vec::new()));

    let mut controller = MonitorController::new(
        ScriptedProbe {
            script: VecDeque::from(vec![Ok(0.2), Ok(0.4)]),
        },
        CsvSink::new(&path),
        SharedPublisher(frames),
        OddSecondClock::new(),
        Arc::new(RwLock::new(None)),
        MonitorConfig::default(),
        MaxRng,
    );

    controller.run_tick();
    controller.run_tick();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "time,latency,confidence,trigger");
    // First tick: single sample, confidence floor of 0
    assert_eq!(lines[1], "10:00:01,0.200,0.0,false");
    // Second tick: smoothed 0.3, rising latency never fires
    assert!(lines[2].starts_with("10:00:03,0.300,"));
    assert!(lines[2].ends_with(",false"));
}
