use gyrodeck_core::{NumericPolicy, SourceStack, TelemetrySource};

pub fn run(sensor_file: &str, sensor_table: &str, policy: NumericPolicy) {
    let sources = SourceStack::with_table_and_file(sensor_table, sensor_file);
    let record = sources.latest();
    if record.is_none() {
        log::info!("no telemetry record available; printing the empty snapshot");
    }
    let snapshot = gyrodeck_core::decode(record.as_ref(), policy);
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize snapshot: {e}"),
    }
}
