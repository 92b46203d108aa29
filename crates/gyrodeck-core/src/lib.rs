//! # gyrodeck-core
//!
//! Core library for the gyrodeck control surface: supervise the robot's
//! companion processes and decode its most recent multi-sensor reading into
//! a stable, partially-fillable snapshot.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gyrodeck_core::{
//!     EventLog, NumericPolicy, ProcessSupervisor, SourceStack, TelemetrySource, decode,
//! };
//!
//! let events = Arc::new(EventLog::new("numbers.txt"));
//! let supervisor = ProcessSupervisor::with_default_catalog(events);
//! supervisor.start("imu").ok();
//!
//! let sources = SourceStack::with_table_and_file("sensor_data.csv", "sensor_data.txt");
//! let snapshot = decode(sources.latest().as_ref(), NumericPolicy::default());
//! println!("{}", serde_json::to_string_pretty(&snapshot).unwrap());
//! ```
//!
//! ## Architecture
//!
//! Source adapters → decoder → snapshot, and a process supervisor beside
//! them. Everything degrades instead of failing: an unavailable store or a
//! malformed record produces empty snapshot fields, a dead child produces a
//! Stopped state, and nothing in this crate may take down a serving loop.

pub mod decode;
pub mod eventlog;
pub mod format;
pub mod record;
pub mod snapshot;
pub mod source;
pub mod supervisor;
pub mod throttle;

pub use decode::{NO_RANGE_READING, decode};
pub use eventlog::{EventLog, TAG_ACTION, TAG_JOYSTICK, TAG_SYSTEM};
pub use format::NumericPolicy;
pub use record::{RawRecord, TelemetryRow};
pub use snapshot::{AuxSection, EncoderSection, ImuSection, LinearSection, SensorSnapshot};
pub use source::{LineFileSource, SourceStack, TableSource, TelemetrySource};
pub use supervisor::{
    PROC_AUTONAV, PROC_IMU, PROC_ML, PROC_MOTOR_TEST, ProcessSpec, ProcessSupervisor,
    StartOutcome, SupervisorError, ToggleOutcome,
};
pub use throttle::{CommandThrottle, JOYSTICK_INTERVAL};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
