use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub thresholds: ThresholdConfig,
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub latency_secs: f64,   // smoothed latency ceiling for a trigger
    pub confidence: f64,     // minimum confidence score for a trigger
    pub max_spike_secs: f64, // largest tolerated jump between consecutive samples
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub samples_required: usize, // window for smoothing and the confidence check
    pub history_capacity: usize,
    pub interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            thresholds: ThresholdConfig {
                latency_secs: 0.35,
                confidence: 60.0,
                max_spike_secs: 0.5,
            },
            sampling: SamplingConfig {
                samples_required: 2,
                history_capacity: 50,
                interval_ms: 1000,
            },
        }
    }
}
