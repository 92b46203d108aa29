//! Raw telemetry records as retrieved from a backing store.
//!
//! A record is transient: the adapter fetches the single most recent one and
//! the decoder consumes it immediately. Absence of a record (`None` from the
//! adapter) is the empty sentinel and decodes to an all-empty snapshot.

/// One undecoded telemetry sample.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// One line of `label, value, label, value, …` tokens with an optional
    /// pipe-delimited auxiliary section.
    Line(String),
    /// One row of a timestamp-ordered table.
    Row(TelemetryRow),
}

/// A single table row: ordered (column, raw value) pairs.
///
/// Column sets differ between schema revisions; lookups are by name and a
/// missing column is simply `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryRow {
    columns: Vec<(String, String)>,
}

impl TelemetryRow {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    /// Raw value of a column, if the schema carries it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, v)| v.as_str())
    }

    /// Column parsed as a float. `None` if absent or not numeric.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name)?.trim().parse().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lookup_by_name() {
        let row = TelemetryRow::new(vec![
            ("timestamp".into(), "1700000000.5".into()),
            ("imu1_vx".into(), "0.42".into()),
        ]);
        assert_eq!(row.get("imu1_vx"), Some("0.42"));
        assert_eq!(row.get_f64("timestamp"), Some(1700000000.5));
        assert_eq!(row.get("encoder_left_rad_s"), None);
    }
}
