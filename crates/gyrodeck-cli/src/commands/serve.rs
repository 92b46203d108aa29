use std::sync::Arc;

use gyrodeck_core::{EventLog, NumericPolicy, ProcessSupervisor, SourceStack};
use gyrodeck_server::AppState;

pub fn run(
    host: &str,
    port: u16,
    sensor_file: &str,
    sensor_table: &str,
    event_log: &str,
    policy: NumericPolicy,
) {
    let events = Arc::new(EventLog::new(event_log));
    let supervisor = Arc::new(ProcessSupervisor::with_default_catalog(Arc::clone(&events)));
    let sources = SourceStack::with_table_and_file(sensor_table, sensor_file);

    let base = format!("http://{host}:{port}");
    let names = supervisor.names();

    println!("🤖 Gyrodeck Server v{}", gyrodeck_core::VERSION);
    println!("   {base}");
    println!("   managed processes: {}", names.join(", "));
    println!("   telemetry: table {sensor_table} (authoritative), file {sensor_file} (fallback)");
    println!("   event log: {event_log}");
    println!();
    println!("   Endpoints:");
    println!("     GET  /                 API index (try: curl {base})");
    println!("     GET  /sensor_feed      Latest decoded sensor snapshot");
    println!("     POST /sensor_on        Start sensor acquisition");
    println!("     POST /sensor_off       Stop sensor acquisition");
    println!("     POST /start_motor_test Clear event log, start motor test");
    println!("     POST /stop_motor_test  Stop motor test");
    println!("     POST /ml_toggle        Start/stop ML + autonav as a pair");
    println!("     POST /direction_ajax   Joystick command {{x, y}}");
    println!("     GET  /health           Per-process state");
    println!();
    println!("   Examples:");
    println!("     curl {base}/sensor_feed");
    println!("     curl -X POST {base}/sensor_on");
    println!("     curl -X POST {base}/direction_ajax -H 'Content-Type: application/json' -d '{{\"x\":0.3,\"y\":-0.1}}'");
    println!();

    let state = Arc::new(AppState::new(supervisor, sources, events, policy));
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(gyrodeck_server::run_server(state, host, port)) {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}
