use serde::{Deserialize, Serialize};

/// One monitoring result, produced once per successful tick.
///
/// The same record feeds every output path: the CSV log, the WebSocket
/// fan-out and the HTTP query endpoint. Latency is the smoothed value
/// rounded to 3 decimals, confidence to 1 decimal; both are `None` only
/// for the pre-first-sample placeholder on the query path.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Record {
    /// Wall-clock time of the tick, UTC, `HH:MM:SS`
    pub time: String,

    /// Smoothed latency in seconds
    pub latency: Option<f64>,

    /// Stability score in [0, 100)
    pub confidence: Option<f64>,

    /// True when all trigger conditions held this tick
    pub trigger: bool,
}

pub const CSV_HEADER: &str = "time,latency,confidence,trigger";

impl Record {
    pub fn new(time: String, latency: f64, confidence: f64, trigger: bool) -> Self {
        Record {
            time,
            latency: Some(round_to(latency, 3)),
            confidence: Some(round_to(confidence, 1)),
            trigger,
        }
    }

    /// Render as one CSV row (no trailing newline), matching CSV_HEADER.
    pub fn csv_row(&self) -> String {
        let latency = self
            .latency
            .map(|v| format!("{:.3}", v))
            .unwrap_or_default();
        let confidence = self
            .confidence
            .map(|v| format!("{:.1}", v))
            .unwrap_or_default();
        format!("{},{},{},{}", self.time, latency, confidence, self.trigger)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
