//! HTTP control surface for the robot.
//!
//! Thin axum layer over `gyrodeck-core`: control routes start/stop companion
//! processes, the telemetry route decodes and returns the latest snapshot,
//! and the joystick route throttles durable logging of a high-frequency
//! stream. Route names match what the original control panel polls.
//!
//! Nothing in a handler may panic the serving loop: supervisor failures map
//! to status strings, and an unavailable telemetry store serves the
//! all-empty snapshot.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use gyrodeck_core::{
    CommandThrottle, EventLog, NumericPolicy, PROC_IMU, PROC_MOTOR_TEST, ProcessSupervisor,
    SensorSnapshot, SourceStack, StartOutcome, TAG_ACTION, TAG_JOYSTICK, TelemetrySource,
    ToggleOutcome,
};

/// Shared server state.
pub struct AppState {
    pub supervisor: Arc<ProcessSupervisor>,
    pub sources: SourceStack,
    pub events: Arc<EventLog>,
    pub policy: NumericPolicy,
    throttle: Mutex<CommandThrottle>,
}

impl AppState {
    pub fn new(
        supervisor: Arc<ProcessSupervisor>,
        sources: SourceStack,
        events: Arc<EventLog>,
        policy: NumericPolicy,
    ) -> Self {
        Self {
            supervisor,
            sources,
            events,
            policy,
            throttle: Mutex::new(CommandThrottle::default()),
        }
    }
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct JoystickCommand {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    processes: serde_json::Value,
    telemetry_available: bool,
}

/// Run a supervisor call on the blocking pool; spawn/signal are blocking OS
/// calls and must not share the telemetry poll path.
async fn on_supervisor<T, F>(supervisor: &Arc<ProcessSupervisor>, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&ProcessSupervisor) -> T + Send + 'static,
{
    let supervisor = Arc::clone(supervisor);
    match tokio::task::spawn_blocking(move || f(&supervisor)).await {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("supervisor task panicked: {e}");
            None
        }
    }
}

async fn handle_sensor_feed(State(state): State<Arc<AppState>>) -> Json<SensorSnapshot> {
    let record = state.sources.latest();
    Json(gyrodeck_core::decode(record.as_ref(), state.policy))
}

async fn handle_sensor_on(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let started = on_supervisor(&state.supervisor, |s| s.start(PROC_IMU).is_ok())
        .await
        .unwrap_or(false);
    Json(StatusResponse {
        status: if started { "ON" } else { "ERROR" },
    })
}

async fn handle_sensor_off(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    on_supervisor(&state.supervisor, |s| s.stop(PROC_IMU)).await;
    Json(StatusResponse { status: "OFF" })
}

async fn handle_start_motor_test(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let outcome = on_supervisor(&state.supervisor, |s| s.start(PROC_MOTOR_TEST)).await;
    let status = match outcome {
        Some(Ok(StartOutcome::Started)) | Some(Ok(StartOutcome::AlreadyRunning)) => "started",
        _ => "failed",
    };
    Json(StatusResponse { status })
}

async fn handle_stop_motor_test(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    on_supervisor(&state.supervisor, |s| s.stop(PROC_MOTOR_TEST)).await;
    Json(StatusResponse { status: "stopped" })
}

async fn handle_ml_toggle(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let outcome = on_supervisor(&state.supervisor, |s| s.toggle_ml()).await;
    let status = match outcome {
        Some(ToggleOutcome::Started) => "started",
        _ => "stopped",
    };
    Json(StatusResponse { status })
}

/// Joystick input. The reply message is always computed and returned; the
/// throttle decides only whether this sample is durably logged.
async fn handle_direction(
    State(state): State<Arc<AppState>>,
    Json(cmd): Json<JoystickCommand>,
) -> Json<MessageResponse> {
    // Forward axis allows extra headroom on purpose.
    let x = cmd.x.clamp(-1.0, 1.2);
    let y = cmd.y.clamp(-1.0, 1.0);
    let message = format!("Joystick x={x:.2}, y={y:.2}");

    let mut throttle = state.throttle.lock().await;
    if throttle.should_emit(Instant::now()) {
        state.events.append(TAG_JOYSTICK, &message);
    }
    drop(throttle);

    Json(MessageResponse { message })
}

async fn handle_top_row(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.events.append(TAG_ACTION, "Remove Row pressed");
    Json(MessageResponse {
        message: "Removed top row!".to_string(),
    })
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let processes = on_supervisor(&state.supervisor, |s| {
        let mut map = serde_json::Map::new();
        for name in s.names() {
            let running = s.is_running(&name);
            map.insert(
                name,
                serde_json::Value::String(
                    if running { "running" } else { "stopped" }.to_string(),
                ),
            );
        }
        serde_json::Value::Object(map)
    })
    .await
    .unwrap_or(serde_json::Value::Null);

    Json(HealthResponse {
        status: "ok",
        processes,
        telemetry_available: state.sources.latest().is_some(),
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let names = state.supervisor.names();
    Json(serde_json::json!({
        "name": "Gyrodeck Server",
        "version": gyrodeck_core::VERSION,
        "processes": names,
        "endpoints": {
            "/": "This API index",
            "/sensor_feed": "GET — latest decoded sensor snapshot",
            "/sensor_on": "POST — start sensor acquisition",
            "/sensor_off": "POST — stop sensor acquisition",
            "/start_motor_test": "POST — clear event log, start motor test",
            "/stop_motor_test": "POST — stop motor test",
            "/ml_toggle": "POST — start/stop ML inference + autonav as a pair",
            "/direction_ajax": "POST {x, y} — joystick command",
            "/get_top_row": "POST — log a remove-row action",
            "/health": "GET — per-process state and telemetry availability",
        },
    }))
}

/// Build the axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/sensor_feed", get(handle_sensor_feed))
        .route("/sensor_on", post(handle_sensor_on))
        .route("/sensor_off", post(handle_sensor_off))
        .route("/start_motor_test", post(handle_start_motor_test))
        .route("/stop_motor_test", post(handle_stop_motor_test))
        .route("/ml_toggle", post(handle_ml_toggle))
        .route("/direction_ajax", post(handle_direction))
        .route("/get_top_row", post(handle_top_row))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP control server.
pub async fn run_server(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}
