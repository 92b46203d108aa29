//! Append-only event log shared by the supervisor and the request handlers.
//!
//! One record per line, `<timestamp> | <TAG> | <message>`, millisecond
//! precision. Consumers read it for audit and debugging only — nothing in
//! the control path depends on it, so write failures are logged and
//! swallowed rather than surfaced to callers.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Tag for supervisor lifecycle events.
pub const TAG_SYSTEM: &str = "SYSTEM";
/// Tag for throttled joystick samples.
pub const TAG_JOYSTICK: &str = "JOYSTICK";
/// Tag for one-shot operator actions.
pub const TAG_ACTION: &str = "ACTION";

/// Append-only text event log.
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event record. Failures never reach the caller.
    pub fn append(&self, tag: &str, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let record = format!("{timestamp} | {tag} | {message}\n");
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(record.as_bytes()));
        if let Err(e) = result {
            log::warn!("event log append to {} failed: {e}", self.path.display());
        }
    }

    /// Wipe the log. Used to isolate a motor-test run's events.
    pub fn truncate(&self) {
        if let Err(e) = std::fs::write(&self.path, b"") {
            log::warn!("event log truncate of {} failed: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_writes_tagged_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.txt");
        let elog = EventLog::new(&path);

        elog.append(TAG_SYSTEM, "IMU process started");
        elog.append(TAG_JOYSTICK, "Joystick x=0.10, y=-0.20");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" | SYSTEM | IMU process started"));
        assert!(lines[1].contains(" | JOYSTICK | "));
        // Timestamp field comes first and carries milliseconds.
        let stamp = lines[0].split(" | ").next().unwrap();
        assert!(stamp.contains('.'));
    }

    #[test]
    fn truncate_clears_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.txt");
        let elog = EventLog::new(&path);

        elog.append(TAG_ACTION, "Remove Row pressed");
        elog.truncate();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn unwritable_path_does_not_panic() {
        let elog = EventLog::new("/nonexistent/dir/numbers.txt");
        elog.append(TAG_SYSTEM, "dropped on the floor");
        elog.truncate();
    }
}
