use api::{app, state::AppState, ws::attendance::dispatch::spawn_live_update_dispatcher};
use services::{AttendanceService, ClassroomSettings, LiveUpdateBus};
use std::net::SocketAddr;
use tracing_appender::rolling;
use util::{config, ws::WebSocketManager};

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open the account database");
            std::process::exit(1);
        }
    };

    let ws = WebSocketManager::new();
    let (bus, updates) = LiveUpdateBus::channel();
    spawn_live_update_dispatcher(ws.clone(), updates);

    let attendance = match AttendanceService::load(db.clone(), bus, ClassroomSettings::from_config()).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load classroom state");
            std::process::exit(1);
        }
    };

    let app = app(AppState::new(db, ws, attendance));

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .expect("Invalid HOST/PORT");

    tracing::info!(
        "Starting {} ({}) on http://{addr}",
        config::project_name(),
        config::env()
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server crashed");
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    std::fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config::log_to_stdout().then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
    });

    let env_filter = EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| EnvFilter::new("api=info,services=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}
