//! CLI for gyrodeck — serve the robot control surface or inspect telemetry.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gyrodeck")]
#[command(about = "gyrodeck — control surface for a self-balancing robot")]
#[command(version = gyrodeck_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP control server
    Serve {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Bind port
        #[arg(long, default_value = "5000")]
        port: u16,

        /// Flat-file telemetry line, overwritten externally each sample tick
        #[arg(long, default_value = "sensor_data.txt")]
        sensor_file: String,

        /// Telemetry row table (CSV with header); authoritative when non-empty
        #[arg(long, default_value = "sensor_data.csv")]
        sensor_table: String,

        /// Append-only event log
        #[arg(long, default_value = "numbers.txt")]
        event_log: String,

        /// Decimal places for displayed numeric values
        #[arg(long, default_value = "4")]
        decimals: usize,

        /// Round to N significant figures instead of fixed decimals
        #[arg(long)]
        sig_figs: Option<usize>,
    },

    /// Decode and print the latest sensor snapshot as JSON
    Snapshot {
        /// Flat-file telemetry line
        #[arg(long, default_value = "sensor_data.txt")]
        sensor_file: String,

        /// Telemetry row table (CSV with header)
        #[arg(long, default_value = "sensor_data.csv")]
        sensor_table: String,

        /// Decimal places for displayed numeric values
        #[arg(long, default_value = "4")]
        decimals: usize,

        /// Round to N significant figures instead of fixed decimals
        #[arg(long)]
        sig_figs: Option<usize>,
    },

    /// List the managed process catalog
    Procs,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            sensor_file,
            sensor_table,
            event_log,
            decimals,
            sig_figs,
        } => commands::serve::run(
            &host,
            port,
            &sensor_file,
            &sensor_table,
            &event_log,
            commands::make_policy(decimals, sig_figs),
        ),
        Commands::Snapshot {
            sensor_file,
            sensor_table,
            decimals,
            sig_figs,
        } => commands::snapshot::run(
            &sensor_file,
            &sensor_table,
            commands::make_policy(decimals, sig_figs),
        ),
        Commands::Procs => commands::procs::run(),
    }
}
