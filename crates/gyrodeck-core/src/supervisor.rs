//! Lifecycle supervision for companion processes.
//!
//! The robot's acquisition, motor-test, inference, and navigation programs
//! run as OS child processes owned by one [`ProcessSupervisor`]. Each logical
//! name maps to at most one live process at any time. Children are spawned
//! into their own process group so a stop terminates the whole unit,
//! including anything they forked.
//!
//! State machine per name: `Stopped --start(ok)--> Running --stop--> Stopped`,
//! with a failed start staying Stopped. A child that exits on its own is not
//! reconciled until the next `is_running`/`start`/`stop` observes it.

use std::collections::BTreeMap;
use std::io;
use std::process::{Child, Command};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::eventlog::{EventLog, TAG_SYSTEM};

/// Logical name of the sensor acquisition process.
pub const PROC_IMU: &str = "imu";
/// Logical name of the motor test process.
pub const PROC_MOTOR_TEST: &str = "motortest";
/// Logical name of the ML inference process.
pub const PROC_ML: &str = "ml";
/// Logical name of the autonomous navigation process.
pub const PROC_AUTONAV: &str = "autonav";

/// What to spawn for a logical process name.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Companion script launched through the system interpreter.
    pub fn script(path: &str) -> Self {
        Self::new("python3", &[path])
    }
}

/// Failures a caller can act on. Signal-delivery failures are not here:
/// they are logged and swallowed, and the process is considered stopped.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("unknown process name: {0}")]
    UnknownProcess(String),
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Result of a successful `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of the paired ML/autonav toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Stopped,
}

/// A child process spawned into its own process group, terminated as a unit.
///
/// Higher layers never see platform details: `terminate` signals the whole
/// group on POSIX and falls back to killing the direct child elsewhere.
struct ScopedChild {
    child: Child,
}

impl ScopedChild {
    fn spawn(spec: &ProcessSpec) -> io::Result<Self> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // New group with pgid == child pid, so killpg reaches any
            // grandchildren the script forks.
            command.process_group(0);
        }
        Ok(Self {
            child: command.spawn()?,
        })
    }

    /// True while the child has not exited. Observing an exit reaps it.
    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Best-effort group termination. Delivery failure (process already
    /// gone, permissions) is logged and swallowed.
    fn terminate(&mut self) {
        #[cfg(unix)]
        {
            let pgid = self.child.id() as libc::pid_t;
            // SAFETY: killpg with SIGTERM on our own child's group; the pgid
            // came from a child handle we still own.
            let rc = unsafe { libc::killpg(pgid, libc::SIGTERM) };
            if rc != 0 {
                log::warn!(
                    "SIGTERM to process group {pgid} failed: {}",
                    io::Error::last_os_error()
                );
            }
            // Reap the direct child if it already died.
            let _ = self.child.try_wait();
        }
        #[cfg(not(unix))]
        {
            if let Err(e) = self.child.kill() {
                log::warn!("kill of child {} failed: {e}", self.child.id());
            }
            let _ = self.child.wait();
        }
    }
}

/// Owns the mapping from logical process name to OS process handle.
///
/// All state sits behind one mutex; `start`/`stop`/`is_running` on the same
/// name from concurrent requests serialize here. Spawning and signalling are
/// blocking OS calls, so callers on an async path should hop to a blocking
/// context first.
pub struct ProcessSupervisor {
    catalog: BTreeMap<String, ProcessSpec>,
    running: Mutex<BTreeMap<String, ScopedChild>>,
    events: Arc<EventLog>,
}

impl ProcessSupervisor {
    /// Supervisor over an explicit catalog.
    pub fn new(catalog: BTreeMap<String, ProcessSpec>, events: Arc<EventLog>) -> Self {
        Self {
            catalog,
            running: Mutex::new(BTreeMap::new()),
            events,
        }
    }

    /// The stock robot catalog: acquisition, motor test, inference, autonav.
    pub fn with_default_catalog(events: Arc<EventLog>) -> Self {
        let mut catalog = BTreeMap::new();
        catalog.insert(PROC_IMU.to_string(), ProcessSpec::script("imuencoderv4.py"));
        catalog.insert(
            PROC_MOTOR_TEST.to_string(),
            ProcessSpec::script("motortest.py"),
        );
        catalog.insert(PROC_ML.to_string(), ProcessSpec::script("ml.py"));
        catalog.insert(PROC_AUTONAV.to_string(), ProcessSpec::script("autonav.py"));
        Self::new(catalog, events)
    }

    /// Catalog names in stable order.
    pub fn names(&self) -> Vec<String> {
        self.catalog.keys().cloned().collect()
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.catalog.contains_key(name)
    }

    /// True iff a handle exists for `name` and the process has not exited.
    pub fn is_running(&self, name: &str) -> bool {
        let mut running = self.running.lock().unwrap();
        match running.get_mut(name) {
            Some(child) => child.is_alive(),
            None => false,
        }
    }

    /// Start `name` if it is not already running. Idempotent: a second start
    /// with no intervening stop is a no-op reporting `AlreadyRunning`.
    ///
    /// Starting the motor test additionally truncates the shared event log
    /// first, isolating that run's events. This is specific to
    /// [`PROC_MOTOR_TEST`], not generic behavior.
    pub fn start(&self, name: &str) -> Result<StartOutcome, SupervisorError> {
        let spec = self
            .catalog
            .get(name)
            .ok_or_else(|| SupervisorError::UnknownProcess(name.to_string()))?;

        let mut running = self.running.lock().unwrap();
        if let Some(child) = running.get_mut(name) {
            if child.is_alive() {
                return Ok(StartOutcome::AlreadyRunning);
            }
            // Stale handle from a self-exited child; replace it below.
            running.remove(name);
        }

        if name == PROC_MOTOR_TEST {
            self.events.truncate();
            self.events.append(TAG_SYSTEM, "event log cleared");
        }

        let child = ScopedChild::spawn(spec).map_err(|source| {
            log::warn!("spawn of {name} ({}) failed: {source}", spec.program);
            SupervisorError::Spawn {
                name: name.to_string(),
                source,
            }
        })?;
        running.insert(name.to_string(), child);
        self.events
            .append(TAG_SYSTEM, &format!("{name} process started"));
        Ok(StartOutcome::Started)
    }

    /// Stop `name`. No-op when not running; otherwise the whole process
    /// group gets SIGTERM. The handle is cleared regardless of whether the
    /// signal could be delivered.
    pub fn stop(&self, name: &str) {
        let mut running = self.running.lock().unwrap();
        if let Some(mut child) = running.remove(name) {
            if child.is_alive() {
                child.terminate();
                self.events
                    .append(TAG_SYSTEM, &format!("{name} process stopped"));
            }
        }
    }

    /// Toggle ML inference and autonomous navigation as one logical group:
    /// if either is stopped, start both; if both run, stop both. The two
    /// remain independent start/stop calls underneath.
    pub fn toggle_ml(&self) -> ToggleOutcome {
        if !self.is_running(PROC_ML) || !self.is_running(PROC_AUTONAV) {
            if let Err(e) = self.start(PROC_ML) {
                log::warn!("ml toggle: {e}");
            }
            if let Err(e) = self.start(PROC_AUTONAV) {
                log::warn!("ml toggle: {e}");
            }
            ToggleOutcome::Started
        } else {
            self.stop(PROC_ML);
            self.stop(PROC_AUTONAV);
            ToggleOutcome::Stopped
        }
    }
}
