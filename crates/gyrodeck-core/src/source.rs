//! Telemetry source adapters.
//!
//! Each adapter wraps one backing store and answers a single question: what
//! is the most recent raw record right now? Adapters never cache — the store
//! is overwritten externally on every sample tick — and never fail: a
//! missing file, missing table, or empty table is the `None` sentinel, which
//! decodes to an all-empty snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use crate::record::{RawRecord, TelemetryRow};

/// A backing store that can produce the single most recent telemetry record.
pub trait TelemetrySource: Send + Sync {
    /// The most recent raw record, or `None` when the store has nothing.
    fn latest(&self) -> Option<RawRecord>;
}

/// Flat-file store: a single line overwritten externally each sample tick.
pub struct LineFileSource {
    path: PathBuf,
}

impl LineFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TelemetrySource for LineFileSource {
    fn latest(&self) -> Option<RawRecord> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let line = contents.lines().next()?.trim();
        if line.is_empty() {
            None
        } else {
            Some(RawRecord::Line(line.to_string()))
        }
    }
}

/// Table store: a header row naming the columns, one row per sample, with a
/// `timestamp` column. The most recent row is the one with the greatest
/// timestamp, so out-of-order appends do not matter.
pub struct TableSource {
    path: PathBuf,
}

impl TableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TelemetrySource for TableSource {
    fn latest(&self) -> Option<RawRecord> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let mut lines = contents.lines().filter(|l| !l.trim().is_empty());

        let header: Vec<&str> = lines.next()?.split(',').map(str::trim).collect();
        let ts_index = header.iter().position(|c| *c == "timestamp");

        let mut best: Option<(f64, TelemetryRow)> = None;
        for line in lines {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            let row = TelemetryRow::new(
                header
                    .iter()
                    .zip(values.iter())
                    .map(|(c, v)| (c.to_string(), v.to_string()))
                    .collect(),
            );
            let ts = ts_index
                .and_then(|i| values.get(i))
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(f64::NEG_INFINITY);
            // Replace on equal scores too: in an append-only store the last
            // row is the better "most recent" when timestamps are missing.
            match &best {
                Some((best_ts, _)) if *best_ts > ts => {}
                _ => best = Some((ts, row)),
            }
        }

        best.map(|(_, row)| RawRecord::Row(row))
    }
}

/// Source precedence: the row store is authoritative, the line log is a
/// fallback used only when the row store yields nothing.
pub struct SourceStack {
    sources: Vec<Box<dyn TelemetrySource>>,
}

impl SourceStack {
    pub fn new(sources: Vec<Box<dyn TelemetrySource>>) -> Self {
        Self { sources }
    }

    /// The usual arrangement: table first, flat file as fallback.
    pub fn with_table_and_file(table: impl Into<PathBuf>, file: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(TableSource::new(table)),
            Box::new(LineFileSource::new(file)),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl TelemetrySource for SourceStack {
    fn latest(&self) -> Option<RawRecord> {
        self.sources.iter().find_map(|s| s.latest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_none() {
        let src = LineFileSource::new("/nonexistent/sensor_data.txt");
        assert_eq!(src.latest(), None);
    }

    #[test]
    fn line_file_reads_first_line() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "IMU1, Forward/backwards Tilt, 1.0").unwrap();
        writeln!(f, "stale second line").unwrap();
        let src = LineFileSource::new(f.path());
        assert_eq!(
            src.latest(),
            Some(RawRecord::Line(
                "IMU1, Forward/backwards Tilt, 1.0".to_string()
            ))
        );
    }

    #[test]
    fn empty_file_is_none() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let src = LineFileSource::new(f.path());
        assert_eq!(src.latest(), None);
    }

    #[test]
    fn table_picks_greatest_timestamp() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "timestamp, imu1_vx").unwrap();
        writeln!(f, "100.5, 0.1").unwrap();
        writeln!(f, "102.5, 0.3").unwrap();
        writeln!(f, "101.5, 0.2").unwrap();
        let src = TableSource::new(f.path());
        match src.latest() {
            Some(RawRecord::Row(row)) => {
                assert_eq!(row.get("imu1_vx"), Some("0.3"));
            }
            other => panic!("expected a row, got {other:?}"),
        }
    }

    #[test]
    fn table_without_timestamps_picks_last_row() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "imu1_vx").unwrap();
        writeln!(f, "0.1").unwrap();
        writeln!(f, "0.2").unwrap();
        writeln!(f, "0.3").unwrap();
        let src = TableSource::new(f.path());
        match src.latest() {
            Some(RawRecord::Row(row)) => {
                assert_eq!(row.get("imu1_vx"), Some("0.3"));
            }
            other => panic!("expected a row, got {other:?}"),
        }
    }

    #[test]
    fn header_only_table_is_none() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "timestamp, imu1_vx").unwrap();
        let src = TableSource::new(f.path());
        assert_eq!(src.latest(), None);
    }

    #[test]
    fn stack_falls_back_to_line_log() {
        let table = tempfile::NamedTempFile::new().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IMU1, Yaw, 3.0").unwrap();

        // Table is empty: the line log answers.
        let stack = SourceStack::with_table_and_file(table.path(), file.path());
        assert_eq!(
            stack.latest(),
            Some(RawRecord::Line("IMU1, Yaw, 3.0".to_string()))
        );
    }

    #[test]
    fn stack_prefers_row_store() {
        let mut table = tempfile::NamedTempFile::new().unwrap();
        writeln!(table, "timestamp, imu1_vx").unwrap();
        writeln!(table, "5.0, 0.9").unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IMU1, Yaw, 3.0").unwrap();

        let stack = SourceStack::with_table_and_file(table.path(), file.path());
        assert!(matches!(stack.latest(), Some(RawRecord::Row(_))));
    }

    #[test]
    fn empty_stack_is_none() {
        let stack = SourceStack::new(Vec::new());
        assert_eq!(stack.latest(), None);
    }
}
