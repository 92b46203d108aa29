//! The structured telemetry reading served to the operator panel.
//!
//! A [`SensorSnapshot`] is a pure value with a fixed shape: every section and
//! every leaf field is always present in the serialized output. Fields the
//! source record did not provide stay at the empty string — the panel renders
//! a blank cell instead of losing the column. Snapshots carry no identity and
//! are rebuilt from scratch on every poll.

use serde::Serialize;

/// Attitude/rate section for one IMU. Only the primary IMU carries a time
/// field; it is skipped entirely for the secondary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImuSection {
    #[serde(rename = "Time", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "Forward/backwards Tilt")]
    pub tilt_forward: String,
    #[serde(rename = "Side-to-Side Tilt")]
    pub tilt_side: String,
    #[serde(rename = "Yaw")]
    pub yaw: String,
    #[serde(rename = "Pitch Rate")]
    pub pitch_rate: String,
    #[serde(rename = "Roll Rate")]
    pub roll_rate: String,
    #[serde(rename = "Rotational Velocity")]
    pub rotational_velocity: String,
}

/// Linear velocity estimates derived from the primary IMU.
///
/// `x_velocity` and `y_velocity` are independent fields even though some
/// producers feed both from the same forward-velocity estimate; which column
/// feeds which field is the adapter's decision, not the snapshot's.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearSection {
    #[serde(rename = "Linear Velocity")]
    pub linear_velocity: String,
    #[serde(rename = "X velocity")]
    pub x_velocity: String,
    #[serde(rename = "Y velocity")]
    pub y_velocity: String,
}

/// One wheel encoder: signed speed plus a direction word.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncoderSection {
    #[serde(rename = "Speed")]
    pub speed: String,
    #[serde(rename = "Direction")]
    pub direction: String,
}

/// Auxiliary channels: ultrasonic ranger and reaction-pendulum state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuxSection {
    #[serde(rename = "Ultrasonic Range")]
    pub ultrasonic_range: String,
    #[serde(rename = "Pendulum")]
    pub pendulum: String,
}

/// One fully-shaped, partially-fillable telemetry reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    #[serde(rename = "IMU1")]
    pub imu1: ImuSection,
    #[serde(rename = "IMU2")]
    pub imu2: ImuSection,
    #[serde(rename = "IMU1Linear")]
    pub linear: LinearSection,
    #[serde(rename = "EncoderL")]
    pub encoder_left: EncoderSection,
    #[serde(rename = "EncoderR")]
    pub encoder_right: EncoderSection,
    #[serde(rename = "Aux")]
    pub aux: AuxSection,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            imu1: ImuSection {
                // The primary IMU always serializes a Time cell, empty or not.
                time: Some(String::new()),
                ..ImuSection::default()
            },
            imu2: ImuSection::default(),
            linear: LinearSection::default(),
            encoder_left: EncoderSection::default(),
            encoder_right: EncoderSection::default(),
            aux: AuxSection::default(),
        }
    }
}

impl SensorSnapshot {
    /// True when no field holds a value.
    pub fn is_empty(&self) -> bool {
        *self == SensorSnapshot::default()
    }
}
