use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod auth;
mod bikes;
mod config;
mod handler;
mod http;
mod logger;
mod model;
mod routing;
mod server;
mod store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::Config::load_from(&path)?,
        None => config::Config::load()?,
    };

    logger::init(&cfg)?;

    // Build the Tokio runtime, sized by `server.workers` when set
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

    let state = Arc::new(config::AppState::new(&cfg));
    if cfg.database.create_schema {
        state.store.bootstrap()?;
    } else if let Err(e) = state.store.run(|session| session.ping()).await {
        // Not fatal: /readyz reports it until the database appears
        logger::log_warning(&format!("Store not reachable at startup: {e}"));
    }

    let listener = server::create_reusable_listener(addr)?;
    server::start_signal_handler(Arc::clone(&state.shutdown))?;
    logger::log_server_start(&addr, &cfg);

    let active_connections = Arc::new(AtomicUsize::new(0));
    server::start_server_loop(listener, state, active_connections).await
}
