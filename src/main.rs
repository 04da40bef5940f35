use std::sync::Arc;

use site_server::config::{AppState, Config};
use site_server::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Bind failure (port already in use) is fatal, no retry
    let listener = server::create_listener(addr)?;

    // Panics on a malformed asset route prefix before any request is served
    let state = Arc::new(AppState::new(&cfg));

    logger::log_server_start(&addr, &cfg);

    server::serve(listener, state).await
}
