use crate::record::{Record, CSV_HEADER};
use crate::traits::RecordSink;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Append-only CSV log. The header is written once, when the file does not
/// exist yet; rows are appended one per record. Not crash-safe.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSink { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &Record) -> Result<()> {
        let exists = self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        if !exists {
            writeln!(file, "{}", CSV_HEADER)?;
        }
        writeln!(file, "{}", record.csv_row())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: &str, trigger: bool) -> Record {
        Record::new(time.to_string(), 0.25, 80.0, trigger)
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor_log.csv");
        let mut sink = CsvSink::new(&path);

        sink.append(&record("10:00:01", false)).unwrap();
        sink.append(&record("10:00:02", true)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "time,latency,confidence,trigger",
                "10:00:01,0.250,80.0,false",
                "10:00:02,0.250,80.0,true",
            ]
        );
    }

    #[test]
    fn test_existing_file_gets_no_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor_log.csv");
        std::fs::write(&path, "time,latency,confidence,trigger\n").unwrap();

        let mut sink = CsvSink::new(&path);
        sink.append(&record("10:00:03", false)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("time,latency").count(), 1);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file makes open() fail
        let path = dir.path().join("log_dir");
        std::fs::create_dir(&path).unwrap();

        let mut sink = CsvSink::new(&path);
        assert!(sink.append(&record("10:00:04", false)).is_err());
    }
}
