use std::sync::Arc;

use gyrodeck_core::{EventLog, ProcessSupervisor};

/// Print the stock process catalog. Running state only exists inside a
/// server process, so this lists what `serve` would supervise.
pub fn run() {
    let events = Arc::new(EventLog::new("numbers.txt"));
    let supervisor = ProcessSupervisor::with_default_catalog(events);

    println!("Managed processes:");
    for name in supervisor.names() {
        println!("  {name}");
    }
    println!();
    println!("Control them through a running server:");
    println!("  POST /sensor_on | /sensor_off        ({})", gyrodeck_core::PROC_IMU);
    println!(
        "  POST /start_motor_test | /stop_motor_test ({})",
        gyrodeck_core::PROC_MOTOR_TEST
    );
    println!(
        "  POST /ml_toggle                      ({} + {})",
        gyrodeck_core::PROC_ML,
        gyrodeck_core::PROC_AUTONAV
    );
}
