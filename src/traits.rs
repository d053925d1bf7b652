use crate::record::Record;
use anyhow::Result;
use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
pub trait LatencyProbe {
    /// Measure one round trip against the target endpoint.
    /// Returns elapsed wall-clock seconds, or an error to skip the tick.
    fn measure(&mut self) -> Result<f64>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RecordSink {
    /// Append one record to durable storage. Errors are surfaced to the
    /// caller but must not stop the tick loop.
    fn append(&mut self, record: &Record) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RecordPublisher {
    /// Fan a record out to current subscribers. Best-effort, no delivery
    /// guarantee; a failing subscriber must not affect the others.
    fn publish(&self, record: &Record);
}

#[cfg_attr(test, mockall::automock)]
pub trait TimeSource {
    fn now_utc(&self) -> DateTime<Utc>;
}
