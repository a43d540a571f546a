use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

mod api;
mod auth;
mod config;
mod error;
mod files;
mod handler;
mod http;
mod logger;
mod routing;
mod server;
mod store;
mod students;

/// Configuration file used when no path is given (extension resolved by `config`)
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;
    cfg.prepare_storage()?;

    if cfg.admin.uses_default_password() {
        logger::log_warning(
            "Admin account is using the default password; set admin.password or PORTAL_ADMIN__PASSWORD",
        );
    }

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    logger::log_server_start(&addr, &cfg);

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local.run_until(run_server(listener, state, shutdown)).await;
    Ok(())
}

async fn run_server(listener: TcpListener, state: Arc<config::AppState>, shutdown: Arc<Notify>) {
    let performance = &state.config.performance;
    let grace = Duration::from_secs(performance.read_timeout.max(performance.write_timeout));
    let active_connections = Arc::new(AtomicUsize::new(0));

    server::start_server_loop(
        listener,
        Arc::clone(&state),
        Arc::clone(&active_connections),
        shutdown,
    )
    .await;

    // Dropping the LocalSet would cancel connections still being served
    server::drain_connections(&active_connections, grace).await;
}
