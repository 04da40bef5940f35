// Server module entry point
// Listener construction and the accept loop

pub mod connection;
pub mod listener;

pub use listener::create_listener;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Accept connections until the process is terminated
///
/// A failed accept is logged and the loop continues; there is no shutdown
/// sequence, process exit releases everything.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                connection::accept_connection(stream, peer_addr, &state, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
