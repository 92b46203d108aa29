//! Tolerant decoding of raw telemetry records into [`SensorSnapshot`]s.
//!
//! `decode` is a total function: whatever the producer wrote, the result is a
//! fully-shaped snapshot and every failure mode degrades to an empty field.
//! Log producers get restarted mid-line, drop field groups, and occasionally
//! reorder them — a malformed group must never corrupt the groups after it.
//!
//! The line grammar is `label, value, label, value, …` with top-level group
//! markers, plus an optional pipe-delimited auxiliary section. Matching is
//! forward-only with no backtracking: a group marker is sought from the
//! current cursor position, and inside a group each expected label writes its
//! value only on an exact match at the cursor. The first mismatch abandons
//! the rest of that group; later groups are still attempted.

use crate::format::NumericPolicy;
use crate::record::{RawRecord, TelemetryRow};
use crate::snapshot::SensorSnapshot;

/// Sentinel the ranger firmware reports when it got no echo.
pub const NO_RANGE_READING: f64 = -1.0;

/// Labelled fields shared by both IMU groups, in wire order.
const IMU_LABELS: [&str; 6] = [
    "Forward/backwards Tilt",
    "Side-to-Side Tilt",
    "Yaw",
    "Pitch Rate",
    "Roll Rate",
    "Rotational Velocity",
];

/// Decode the most recent raw record, if any, into a snapshot.
///
/// `None` (no backing store, empty store) yields the all-empty snapshot.
pub fn decode(record: Option<&RawRecord>, policy: NumericPolicy) -> SensorSnapshot {
    match record {
        Some(RawRecord::Line(line)) => decode_line(line, policy),
        Some(RawRecord::Row(row)) => decode_row(row, policy),
        None => SensorSnapshot::default(),
    }
}

/// Forward-only token cursor. Never moves backwards.
struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        let tokens = if text.trim().is_empty() {
            Vec::new()
        } else {
            text.split(',').map(str::trim).collect()
        };
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    /// Scan forward for a group marker. On a hit the cursor lands just past
    /// the marker; on a miss it stays put so later groups get the same view.
    fn seek_marker(&mut self, marker: &str) -> bool {
        match self.tokens[self.pos..].iter().position(|t| *t == marker) {
            Some(offset) => {
                self.pos += offset + 1;
                true
            }
            None => false,
        }
    }

    /// Consume `label, value` iff the token at the cursor is exactly `label`.
    fn take_labelled(&mut self, label: &str) -> Option<&'a str> {
        if self.peek() == Some(label) {
            let value = self.tokens.get(self.pos + 1).copied();
            if value.is_some() {
                self.pos += 2;
            }
            value
        } else {
            None
        }
    }

    /// Consume the next token as a bare positional value.
    fn take_value(&mut self) -> Option<&'a str> {
        let value = self.peek();
        if value.is_some() {
            self.pos += 1;
        }
        value
    }
}

/// Match an ordered run of `label, value` pairs. The first label mismatch
/// leaves the remaining fields empty and stops the group.
fn take_labelled_run(
    cursor: &mut Cursor<'_>,
    labels: &[&str],
    outputs: &mut [&mut String],
    policy: NumericPolicy,
) {
    debug_assert_eq!(labels.len(), outputs.len());
    for (label, out) in labels.iter().zip(outputs.iter_mut()) {
        match cursor.take_labelled(label) {
            Some(value) => **out = policy.format_token(value),
            None => break,
        }
    }
}

/// One marker followed by a single positional value.
fn take_marked_value(cursor: &mut Cursor<'_>, marker: &str, out: &mut String, policy: NumericPolicy) {
    if cursor.seek_marker(marker) {
        if let Some(value) = cursor.take_value() {
            *out = policy.format_token(value);
        }
    }
}

fn decode_line(line: &str, policy: NumericPolicy) -> SensorSnapshot {
    let mut snap = SensorSnapshot::default();

    let (main, aux) = match line.split_once('|') {
        Some((main, aux)) => (main, Some(aux)),
        None => (line, None),
    };

    let mut cursor = Cursor::new(main);

    // A leading clock token belongs to the primary IMU.
    if let Some(first) = cursor.peek() {
        if first.contains(':') {
            snap.imu1.time = Some(first.to_string());
            cursor.take_value();
        }
    }

    if cursor.seek_marker("IMU1") {
        take_labelled_run(
            &mut cursor,
            &IMU_LABELS,
            &mut [
                &mut snap.imu1.tilt_forward,
                &mut snap.imu1.tilt_side,
                &mut snap.imu1.yaw,
                &mut snap.imu1.pitch_rate,
                &mut snap.imu1.roll_rate,
                &mut snap.imu1.rotational_velocity,
            ],
            policy,
        );
    }

    if cursor.seek_marker("IMU2") {
        take_labelled_run(
            &mut cursor,
            &IMU_LABELS,
            &mut [
                &mut snap.imu2.tilt_forward,
                &mut snap.imu2.tilt_side,
                &mut snap.imu2.yaw,
                &mut snap.imu2.pitch_rate,
                &mut snap.imu2.roll_rate,
                &mut snap.imu2.rotational_velocity,
            ],
            policy,
        );
    }

    take_marked_value(
        &mut cursor,
        "IMU1 Linear Velocity",
        &mut snap.linear.linear_velocity,
        policy,
    );
    take_marked_value(
        &mut cursor,
        "IMU1's X-Velocity",
        &mut snap.linear.x_velocity,
        policy,
    );
    take_marked_value(
        &mut cursor,
        "IMU1's Y-Velocity",
        &mut snap.linear.y_velocity,
        policy,
    );

    if cursor.seek_marker("EncoderL") {
        if let Some(speed) = cursor.take_value() {
            snap.encoder_left.speed = policy.format_token(speed);
        }
        if let Some(direction) = cursor.take_value() {
            snap.encoder_left.direction = direction.to_string();
        }
    }

    if cursor.seek_marker("EncoderR") {
        if let Some(speed) = cursor.take_value() {
            snap.encoder_right.speed = policy.format_token(speed);
        }
        if let Some(direction) = cursor.take_value() {
            snap.encoder_right.direction = direction.to_string();
        }
    }

    if let Some(aux) = aux {
        decode_aux(aux, &mut snap, policy);
    }

    snap
}

/// Auxiliary section: comma-separated clauses, each introduced by a marker
/// word. The ultrasonic clause reads up to the `cm` unit suffix and maps the
/// no-echo sentinel to an empty field.
fn decode_aux(aux: &str, snap: &mut SensorSnapshot, policy: NumericPolicy) {
    for clause in aux.split(',') {
        if let Some(idx) = clause.find("Ultrasonic") {
            let rest = &clause[idx + "Ultrasonic".len()..];
            let reading = rest.split("cm").next().unwrap_or("").trim();
            if let Ok(value) = reading.parse::<f64>() {
                if value != NO_RANGE_READING {
                    snap.aux.ultrasonic_range = policy.format(value);
                }
            }
        } else if let Some(idx) = clause.find("Pendulum") {
            let state = clause[idx + "Pendulum".len()..].trim();
            if !state.is_empty() {
                snap.aux.pendulum = state.to_string();
            }
        }
    }
}

/// Seconds-since-epoch (fractional) to a local time-of-day string with
/// millisecond precision.
fn format_time_of_day(timestamp: f64) -> Option<String> {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    let utc = chrono::DateTime::from_timestamp(secs as i64, nanos)?;
    let local = utc.with_timezone(&chrono::Local);
    Some(local.format("%H:%M:%S%.3f").to_string())
}

/// Row variant: named columns from the most recent table row. Columns absent
/// from a given schema revision leave their mapped field empty.
fn decode_row(row: &TelemetryRow, policy: NumericPolicy) -> SensorSnapshot {
    let mut snap = SensorSnapshot::default();

    if let Some(ts) = row.get_f64("timestamp") {
        if let Some(time) = format_time_of_day(ts) {
            snap.imu1.time = Some(time);
        }
    }

    let fill = |column: &str, out: &mut String| {
        if let Some(value) = row.get_f64(column) {
            *out = policy.format(value);
        }
    };

    // Primary IMU (body frame).
    fill("imu1_body_pitch", &mut snap.imu1.tilt_forward);
    fill("imu1_body_roll", &mut snap.imu1.tilt_side);
    fill("imu1_yaw_rate", &mut snap.imu1.yaw);
    fill("imu1_pitch_rate", &mut snap.imu1.pitch_rate);
    fill("imu1_roll_rate", &mut snap.imu1.roll_rate);
    fill("imu1_vx", &mut snap.imu1.rotational_velocity);

    // Secondary IMU rides the reaction pendulum; only two columns exist.
    fill("imu2_pendulum_angle", &mut snap.imu2.tilt_forward);
    fill("imu2_pendulum_ang_vel", &mut snap.imu2.tilt_side);

    // X and Y velocity are filled independently; which source column feeds
    // each is the schema's decision, not ours.
    fill("imu1_vx", &mut snap.linear.linear_velocity);
    fill("imu1_vx", &mut snap.linear.x_velocity);
    fill("imu1_vy", &mut snap.linear.y_velocity);

    fill("encoder_left_rad_s", &mut snap.encoder_left.speed);
    fill("encoder_right_rad_s", &mut snap.encoder_right.speed);

    if let Some(range) = row.get_f64("range_cm") {
        if range != NO_RANGE_READING {
            snap.aux.ultrasonic_range = policy.format(range);
        }
    }
    if let Some(state) = row.get("pendulum_state") {
        if !state.trim().is_empty() {
            snap.aux.pendulum = state.trim().to_string();
        }
    }

    snap
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: NumericPolicy = NumericPolicy::FixedDecimals(4);

    fn full_line() -> String {
        [
            "12:01:05.123",
            "IMU1",
            "Forward/backwards Tilt, 1.23456",
            "Side-to-Side Tilt, -0.5",
            "Yaw, 10",
            "Pitch Rate, 0.1",
            "Roll Rate, 0.2",
            "Rotational Velocity, 0.3",
            "IMU2",
            "Forward/backwards Tilt, 2.5",
            "Side-to-Side Tilt, 0.25",
            "Yaw, 1",
            "Pitch Rate, 0.01",
            "Roll Rate, 0.02",
            "Rotational Velocity, 0.03",
            "IMU1 Linear Velocity, 0.42",
            "IMU1's X-Velocity, 0.42",
            "IMU1's Y-Velocity, 0.01",
            "EncoderL, 1.5, Forward",
            "EncoderR, 1.4, Reverse",
        ]
        .join(", ")
    }

    #[test]
    fn empty_input_law() {
        assert!(decode(None, POLICY).is_empty());
        let blank = RawRecord::Line(String::new());
        assert!(decode(Some(&blank), POLICY).is_empty());
    }

    #[test]
    fn full_line_decodes_every_group() {
        let record = RawRecord::Line(full_line());
        let snap = decode(Some(&record), POLICY);

        assert_eq!(snap.imu1.time.as_deref(), Some("12:01:05.123"));
        assert_eq!(snap.imu1.tilt_forward, "1.2346");
        assert_eq!(snap.imu1.rotational_velocity, "0.3000");
        assert_eq!(snap.imu2.tilt_forward, "2.5000");
        assert_eq!(snap.linear.linear_velocity, "0.4200");
        assert_eq!(snap.linear.x_velocity, "0.4200");
        assert_eq!(snap.linear.y_velocity, "0.0100");
        assert_eq!(snap.encoder_left.speed, "1.5000");
        assert_eq!(snap.encoder_left.direction, "Forward");
        assert_eq!(snap.encoder_right.direction, "Reverse");
    }

    #[test]
    fn missing_group_leaves_later_groups_intact() {
        // Whole IMU2 group absent: its fields stay empty, everything after
        // still decodes.
        let line = "IMU1, Forward/backwards Tilt, 1.0, Side-to-Side Tilt, 2.0, \
                    IMU1 Linear Velocity, 0.5, EncoderL, 1.5, Forward";
        let record = RawRecord::Line(line.to_string());
        let snap = decode(Some(&record), POLICY);

        assert_eq!(snap.imu1.tilt_forward, "1.0000");
        assert_eq!(snap.imu2.tilt_forward, "");
        assert_eq!(snap.linear.linear_velocity, "0.5000");
        assert_eq!(snap.encoder_left.direction, "Forward");
    }

    #[test]
    fn label_mismatch_abandons_rest_of_group_only() {
        // "Yaw" missing mid-group: fields before the mismatch keep their
        // values, fields after stay empty, later groups are unaffected.
        let line = "IMU1, Forward/backwards Tilt, 1.0, Side-to-Side Tilt, 2.0, \
                    Pitch Rate, 0.1, EncoderR, 3.0, Forward";
        let record = RawRecord::Line(line.to_string());
        let snap = decode(Some(&record), POLICY);

        assert_eq!(snap.imu1.tilt_forward, "1.0000");
        assert_eq!(snap.imu1.tilt_side, "2.0000");
        assert_eq!(snap.imu1.yaw, "");
        assert_eq!(snap.imu1.pitch_rate, "");
        assert_eq!(snap.encoder_right.speed, "3.0000");
    }

    #[test]
    fn unparseable_value_passes_through() {
        let line = "IMU1, Forward/backwards Tilt, NaN?, Side-to-Side Tilt, 2.0";
        let record = RawRecord::Line(line.to_string());
        let snap = decode(Some(&record), POLICY);
        assert_eq!(snap.imu1.tilt_forward, "NaN?");
        assert_eq!(snap.imu1.tilt_side, "2.0000");
    }

    #[test]
    fn aux_section_range_and_pendulum() {
        let line = "IMU1, Forward/backwards Tilt, 1.0 | Ultrasonic 34.52 cm, Pendulum Locked";
        let record = RawRecord::Line(line.to_string());
        let snap = decode(Some(&record), POLICY);
        assert_eq!(snap.aux.ultrasonic_range, "34.5200");
        assert_eq!(snap.aux.pendulum, "Locked");
    }

    #[test]
    fn aux_no_echo_sentinel_stays_empty() {
        let record = RawRecord::Line("IMU1 | Ultrasonic -1 cm".to_string());
        let snap = decode(Some(&record), POLICY);
        assert_eq!(snap.aux.ultrasonic_range, "");
    }

    #[test]
    fn row_maps_named_columns() {
        let row = TelemetryRow::new(vec![
            ("timestamp".into(), "1700000000.25".into()),
            ("imu1_body_pitch".into(), "0.123456".into()),
            ("imu1_vx".into(), "0.42".into()),
            ("imu1_vy".into(), "0.01".into()),
            ("encoder_left_rad_s".into(), "1.5".into()),
        ]);
        let record = RawRecord::Row(row);
        let snap = decode(Some(&record), POLICY);

        assert_eq!(snap.imu1.tilt_forward, "0.1235");
        // The forward-velocity column also feeds the rotational velocity
        // cell, as the producing schema has always done.
        assert_eq!(snap.imu1.rotational_velocity, "0.4200");
        assert_eq!(snap.linear.linear_velocity, "0.4200");
        assert_eq!(snap.linear.x_velocity, "0.4200");
        assert_eq!(snap.linear.y_velocity, "0.0100");
        assert_eq!(snap.encoder_left.speed, "1.5000");
        // Columns this schema lacks stay empty.
        assert_eq!(snap.encoder_right.speed, "");
        assert_eq!(snap.imu1.yaw, "");
        // Timestamp renders as a time of day.
        let time = snap.imu1.time.unwrap();
        assert_eq!(time.matches(':').count(), 2);
        assert!(time.ends_with(|c: char| c.is_ascii_digit()));
    }

    #[test]
    fn row_range_sentinel() {
        let row = TelemetryRow::new(vec![("range_cm".into(), "-1".into())]);
        let snap = decode(Some(&RawRecord::Row(row)), POLICY);
        assert_eq!(snap.aux.ultrasonic_range, "");

        let row = TelemetryRow::new(vec![("range_cm".into(), "55.5".into())]);
        let snap = decode(Some(&RawRecord::Row(row)), POLICY);
        assert_eq!(snap.aux.ultrasonic_range, "55.5000");
    }

    #[test]
    fn sig_figs_policy_applies() {
        let line = "IMU1, Forward/backwards Tilt, 1.23456, Side-to-Side Tilt, 0.01234";
        let record = RawRecord::Line(line.to_string());
        let snap = decode(Some(&record), NumericPolicy::SigFigs(2));
        assert_eq!(snap.imu1.tilt_forward, "1.2");
        assert_eq!(snap.imu1.tilt_side, "0.012");
    }
}
