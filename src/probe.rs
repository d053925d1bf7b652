use crate::traits::LatencyProbe;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

// A stalled endpoint must not wedge the serial tick loop.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Measures endpoint responsiveness as the elapsed time around a HEAD
/// request. Any HTTP response counts as a sample; only transport-level
/// failures (DNS, connect, timeout) skip the tick.
pub struct HttpProbe {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(HttpProbe {
            client,
            url: url.to_string(),
        })
    }
}

impl LatencyProbe for HttpProbe {
    fn measure(&mut self) -> Result<f64> {
        let start = Instant::now();
        self.client
            .head(&self.url)
            .send()
            .with_context(|| format!("HEAD {} failed", self.url))?;
        Ok(start.elapsed().as_secs_f64())
    }
}
